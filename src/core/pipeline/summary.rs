//! Batch summary and reporting

use crate::core::pipeline::unit::UnitOutcome;
use crate::domain::{CourierError, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one invocation over a batch of references
#[derive(Debug)]
pub struct BatchSummary {
    /// Identifier shared by every unit span of the invocation
    pub invocation_id: Uuid,

    pub started_at: DateTime<Utc>,

    pub duration: Duration,

    /// One entry per reference, in batch order
    pub outcomes: Vec<UnitOutcome>,
}

impl BatchSummary {
    pub fn new(invocation_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            invocation_id,
            started_at,
            duration: Duration::from_secs(0),
            outcomes: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_done()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// No unit failed
    pub fn is_successful(&self) -> bool {
        self.failed() == 0
    }

    /// First failed unit in batch order
    pub fn first_failure(&self) -> Option<&UnitOutcome> {
        self.outcomes.iter().find(|o| o.is_failed())
    }

    /// Status string on success, [`CourierError::BatchFailed`] otherwise
    ///
    /// # Errors
    ///
    /// Fails when any unit failed; the error names the first failing unit's
    /// stage and cause with the failed and total counts.
    pub fn into_result(self) -> Result<String> {
        if let Some(first) = self.first_failure().and_then(UnitOutcome::describe_failure) {
            return Err(CourierError::BatchFailed {
                failed: self.failed(),
                total: self.total(),
                first,
            });
        }

        Ok(match (self.completed(), self.skipped()) {
            (0, 0) => "no objects in event".to_string(),
            (1, 0) => "object processed".to_string(),
            (completed, 0) => format!("{completed} objects processed"),
            (completed, skipped) => {
                format!("{completed} object(s) processed, {skipped} skipped")
            }
        })
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            invocation_id = %self.invocation_id,
            started_at = %self.started_at.to_rfc3339(),
            total = self.total(),
            completed = self.completed(),
            skipped = self.skipped(),
            failed = self.failed(),
            duration_ms = self.duration.as_millis() as u64,
            "Batch completed"
        );

        if !self.is_successful() {
            tracing::warn!(failed = self.failed(), "Batch completed with failures");
            for outcome in &self.outcomes {
                if let Some((stage, error)) = outcome.failure() {
                    tracing::warn!(
                        key = %outcome.reference.key(),
                        stage = %stage,
                        error_kind = ?error.kind(),
                        error = %error,
                        "Unit failure"
                    );
                }
            }
        }
    }
}
