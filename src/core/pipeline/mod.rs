//! Pipeline orchestration
//!
//! - [`coordinator`] - runs a batch of references with bounded concurrency
//! - [`unit`] - the per-reference stage machine
//! - [`summary`] - batch outcome and reporting

pub mod coordinator;
pub mod summary;
pub mod unit;

pub use coordinator::PipelineCoordinator;
pub use summary::BatchSummary;
pub use unit::{Stage, UnitOutcome, UnitRunner, UnitStatus};
