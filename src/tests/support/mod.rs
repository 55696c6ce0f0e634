// Shared test support code for the controller tests.
// Fakes for every capability the reconciliation loop gets injected, plus a
// harness wiring them together.

pub mod common;
pub mod executors;
pub mod harness;
pub mod store;
pub mod worker;

pub use common::*;
pub use executors::{FailingExecutorCreator, RecordingExecutorCreator, SelectiveExecutorCreator};
pub use harness::Harness;
pub use store::FlakyStore;
pub use worker::RecordingWorker;
