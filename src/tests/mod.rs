//! Integration tests for the multi-cluster controller.
//!
//! End-to-end cases drive the fully wired application through its store and
//! observe the assets each cluster controller leaves on disk.


pub mod support;
