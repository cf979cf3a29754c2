//! Pipeline coordinator - runs every unit of a trigger event
//!
//! Units are independent: one failing never stops its siblings. Up to
//! `pipeline.max_concurrent_units` units run at once; the stages inside a
//! unit always run one after another.

use crate::adapters::mail::MailTransport;
use crate::adapters::storage::ObjectStore;
use crate::adapters::{create_mail_transport, create_object_store};
use crate::config::CourierConfig;
use crate::core::pipeline::summary::BatchSummary;
use crate::core::pipeline::unit::{UnitOutcome, UnitRunner};
use crate::domain::{ObjectReference, Result, TriggerEvent};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Pipeline coordinator
pub struct PipelineCoordinator {
    runner: UnitRunner,
    max_concurrent_units: usize,
}

impl PipelineCoordinator {
    /// Create a coordinator over the given collaborators
    pub fn new(
        config: &CourierConfig,
        store: Arc<dyn ObjectStore>,
        transport: Arc<dyn MailTransport>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            runner: UnitRunner::new(config, store, transport, shutdown_signal),
            max_concurrent_units: config.pipeline.max_concurrent_units.max(1),
        }
    }

    /// Create a coordinator with the collaborators named by configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the mail transport cannot be built.
    pub fn from_config(config: &CourierConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        let store = create_object_store(config);
        let transport = create_mail_transport(config)?;
        Ok(Self::new(config, store, transport, shutdown_signal))
    }

    /// Invocation entry point
    ///
    /// Returns a short status string when every unit completed or was
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::BatchFailed`](crate::domain::CourierError::BatchFailed)
    /// naming the first failing unit.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use courier::config::load_config;
    /// use courier::core::pipeline::PipelineCoordinator;
    /// use courier::domain::TriggerEvent;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config("courier.toml")?;
    /// let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    /// let coordinator = PipelineCoordinator::from_config(&config, shutdown_rx)?;
    ///
    /// let event = TriggerEvent::from_json_slice(&std::fs::read("event.json")?)?;
    /// let status = coordinator.handle_event(&event).await?;
    /// println!("{status}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn handle_event(&self, event: &TriggerEvent) -> Result<String> {
        let summary = self.process_batch(event.references()).await;
        summary.log_summary();
        summary.into_result()
    }

    /// Run every reference to a terminal status
    pub async fn process_batch(&self, references: Vec<ObjectReference>) -> BatchSummary {
        let invocation_id = Uuid::new_v4();
        let started = Instant::now();
        let mut summary = BatchSummary::new(invocation_id, Utc::now());

        tracing::info!(
            invocation_id = %invocation_id,
            units = references.len(),
            max_concurrent_units = self.max_concurrent_units,
            "Processing batch"
        );

        let mut indexed: Vec<(usize, UnitOutcome)> = stream::iter(references.into_iter().enumerate())
            .map(|(index, reference)| {
                let span = tracing::info_span!(
                    "unit",
                    invocation_id = %invocation_id,
                    bucket = %reference.bucket(),
                    key = %reference.key()
                );
                async move { (index, self.runner.run(reference).await) }.instrument(span)
            })
            .buffer_unordered(self.max_concurrent_units)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        summary.outcomes = indexed.into_iter().map(|(_, outcome)| outcome).collect();

        summary.with_duration(started.elapsed())
    }

    /// Run a single reference
    pub async fn process_reference(&self, reference: ObjectReference) -> UnitOutcome {
        self.runner.run(reference).await
    }
}
