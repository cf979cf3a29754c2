//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output for operators
//! - optional JSON lines in a rolling local file
//! - one span per unit of work carrying the invocation id, bucket and key
//!
//! # Example
//!
//! ```no_run
//! use courier::config::LoggingConfig;
//! use courier::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a unit of work
///
/// # Example
///
/// ```no_run
/// use courier::log_unit_start;
/// use courier::domain::ObjectReference;
///
/// let reference = ObjectReference::new("policies", "unprocessed/1234567890.pdf");
/// log_unit_start!(&reference);
/// ```
#[macro_export]
macro_rules! log_unit_start {
    ($reference:expr) => {
        tracing::info!(
            bucket = %$reference.bucket(),
            key = %$reference.key(),
            "Starting unit"
        );
    };
}

/// Log a unit that reached `Done`
#[macro_export]
macro_rules! log_unit_complete {
    ($reference:expr, $moved:expr, $duration:expr) => {
        tracing::info!(
            key = %$reference.key(),
            moved = $moved,
            duration_ms = $duration.as_millis() as u64,
            "Unit completed"
        );
    };
}

/// Log a unit that ended in `Failed(stage, error)`
///
/// # Example
///
/// ```no_run
/// use courier::log_stage_failure;
/// use courier::domain::CourierError;
///
/// let error = CourierError::Decode("missing field `policyNumber`".to_string());
/// log_stage_failure!("fetching-metadata", &error);
/// ```
#[macro_export]
macro_rules! log_stage_failure {
    ($stage:expr, $error:expr) => {
        tracing::error!(
            stage = %$stage,
            error_kind = ?$error.kind(),
            error = %$error,
            "Unit failed"
        );
    };
}
