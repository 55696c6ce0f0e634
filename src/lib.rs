#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod app;
pub mod config;
pub mod controller;
pub mod metrics;
pub mod model;
pub mod shutdown;
pub mod store;
pub mod workers;
