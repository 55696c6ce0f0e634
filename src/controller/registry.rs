//! Worker registry: cluster name to the notifier of its worker.
//!
//! Owned by the reconciliation loop alone, so it needs no locking.

use std::collections::HashMap;

use super::notifier::{self, Delivery, Notifications, Notifier};

pub struct Registry {
    capacity: usize,
    entries: HashMap<String, Notifier>,
}

impl Registry {
    /// Creates an empty registry whose channels buffer `capacity` wake-ups.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Registers a fresh channel for `name` and returns the worker's half.
    /// Returns `None` if `name` is already registered: there is never more
    /// than one live channel per cluster.
    pub fn register(&mut self, name: &str) -> Option<Notifications> {
        if self.entries.contains_key(name) {
            return None;
        }
        let (tx, rx) = notifier::channel(self.capacity);
        self.entries.insert(name.to_string(), tx);
        Some(rx)
    }

    /// Wakes the worker of `name`, if registered.
    pub fn notify(&self, name: &str) -> Option<Delivery> {
        self.entries.get(name).map(Notifier::notify)
    }

    /// Wakes every registered worker.
    pub fn notify_all(&self) -> Vec<(String, Delivery)> {
        self.entries
            .iter()
            .map(|(name, tx)| (name.clone(), tx.notify()))
            .collect()
    }

    /// Closes the channel of `name` and forgets it. Returns false if it was not registered.
    pub fn terminate(&mut self, name: &str) -> bool {
        match self.entries.remove(name) {
            Some(tx) => {
                tx.close();
                true
            }
            None => false,
        }
    }

    /// Terminates every entry for which `keep` returns false and returns their names.
    pub fn terminate_unless<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let gone: Vec<String> = self
            .entries
            .keys()
            .filter(|name| !keep(name))
            .cloned()
            .collect();
        for name in &gone {
            self.terminate(name);
        }
        gone
    }

    /// Closes every channel and empties the registry. Returns how many were closed.
    pub fn close_all(&mut self) -> usize {
        let n = self.entries.len();
        for (_, tx) in self.entries.drain() {
            tx.close();
        }
        n
    }
}
