//! One unit of work: a single triggering object reference
//!
//! A unit walks `FetchingArtifact -> FetchingMetadata -> Notifying ->
//! Relocating -> Done`. Each state carries what the next stage needs, so a
//! stage cannot run without its predecessor's output. Any failure moves the
//! unit to `Failed(stage, error)` and nothing further runs.

use crate::adapters::mail::{MailTransport, RecordingTransport};
use crate::adapters::storage::ObjectStore;
use crate::config::CourierConfig;
use crate::core::fetch::{ArtifactBytes, ArtifactFetcher, MetadataFetcher};
use crate::core::keys::{KeyLayout, ParsedKey};
use crate::core::notify::{MessageTemplate, Notifier};
use crate::core::relocate::{RelocationReport, Relocator};
use crate::domain::{CorrelationId, CourierError, FulfillmentMetadata, ObjectReference, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    FetchingArtifact,
    FetchingMetadata,
    Notifying,
    Relocating,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FetchingArtifact => "fetching-artifact",
            Stage::FetchingMetadata => "fetching-metadata",
            Stage::Notifying => "notifying",
            Stage::Relocating => "relocating",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

enum UnitState {
    FetchingArtifact,
    FetchingMetadata {
        artifact: ArtifactBytes,
    },
    Notifying {
        artifact: ArtifactBytes,
        metadata: FulfillmentMetadata,
    },
    Relocating,
    Done(RelocationReport),
    Failed {
        stage: Stage,
        error: CourierError,
    },
}

impl UnitState {
    fn stage(&self) -> Option<Stage> {
        match self {
            UnitState::FetchingArtifact => Some(Stage::FetchingArtifact),
            UnitState::FetchingMetadata { .. } => Some(Stage::FetchingMetadata),
            UnitState::Notifying { .. } => Some(Stage::Notifying),
            UnitState::Relocating => Some(Stage::Relocating),
            UnitState::Done(_) | UnitState::Failed { .. } => None,
        }
    }
}

/// Terminal status of a unit
#[derive(Debug)]
pub enum UnitStatus {
    Done(RelocationReport),
    /// Not a trigger for this pipeline; nothing was read or written
    Skipped(String),
    Failed {
        stage: Stage,
        error: CourierError,
    },
}

/// Result of running one unit
#[derive(Debug)]
pub struct UnitOutcome {
    pub reference: ObjectReference,

    /// Absent when the key could not be parsed
    pub correlation_id: Option<CorrelationId>,

    pub status: UnitStatus,

    /// Stages that finished successfully, in order
    pub completed_stages: Vec<Stage>,

    pub duration: Duration,
}

impl UnitOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self.status, UnitStatus::Done(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, UnitStatus::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, UnitStatus::Failed { .. })
    }

    /// Stage and error of a failed unit
    pub fn failure(&self) -> Option<(Stage, &CourierError)> {
        match &self.status {
            UnitStatus::Failed { stage, error } => Some((*stage, error)),
            _ => None,
        }
    }

    /// `"<bucket>/<key> failed while <stage>: <error>"`
    pub fn describe_failure(&self) -> Option<String> {
        self.failure()
            .map(|(stage, error)| format!("{} failed while {stage}: {error}", self.reference))
    }
}

/// Runs units through the stages
pub struct UnitRunner {
    artifacts: ArtifactFetcher,
    metadata: MetadataFetcher,
    notifier: Notifier,
    relocator: Relocator,
    layout: KeyLayout,
    trigger_extensions: Vec<String>,
    shutdown: watch::Receiver<bool>,
}

impl UnitRunner {
    /// Wire the stage components to the given collaborators
    ///
    /// With `application.dry_run` set, relocation only lists and a
    /// delivering transport is replaced by a [`RecordingTransport`].
    pub fn new(
        config: &CourierConfig,
        store: Arc<dyn ObjectStore>,
        transport: Arc<dyn MailTransport>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let layout = KeyLayout::from_config(&config.storage);
        let transport: Arc<dyn MailTransport> =
            if config.application.dry_run && transport.delivers() {
                tracing::info!(
                    transport = transport.transport_name(),
                    "Dry run: notifications are recorded, not delivered"
                );
                Arc::new(RecordingTransport::new())
            } else {
                transport
            };

        Self {
            artifacts: ArtifactFetcher::new(store.clone()),
            metadata: MetadataFetcher::new(store.clone(), layout.clone()),
            notifier: Notifier::new(transport, MessageTemplate::from_config(&config.mail)),
            relocator: Relocator::new(store, layout.clone())
                .with_dry_run(config.application.dry_run),
            layout,
            trigger_extensions: config
                .pipeline
                .trigger_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            shutdown,
        }
    }

    /// Run one unit to a terminal status
    pub async fn run(&self, reference: ObjectReference) -> UnitOutcome {
        let started = Instant::now();
        crate::log_unit_start!(&reference);

        let parsed = match ParsedKey::parse(reference.key()) {
            Ok(parsed) => parsed,
            Err(error) => {
                crate::log_stage_failure!(Stage::FetchingArtifact, &error);
                return UnitOutcome {
                    reference,
                    correlation_id: None,
                    status: UnitStatus::Failed {
                        stage: Stage::FetchingArtifact,
                        error,
                    },
                    completed_stages: Vec::new(),
                    duration: started.elapsed(),
                };
            }
        };

        if let Some(reason) = self.skip_reason(&parsed) {
            tracing::info!(key = %reference.key(), reason = %reason, "Skipping object");
            return UnitOutcome {
                reference,
                correlation_id: Some(parsed.correlation_id),
                status: UnitStatus::Skipped(reason),
                completed_stages: Vec::new(),
                duration: started.elapsed(),
            };
        }

        let id = parsed.correlation_id;
        let mut completed_stages = Vec::new();
        let mut state = UnitState::FetchingArtifact;

        let status = loop {
            state = match state {
                UnitState::Done(report) => break UnitStatus::Done(report),
                UnitState::Failed { stage, error } => {
                    crate::log_stage_failure!(stage, &error);
                    break UnitStatus::Failed { stage, error };
                }
                active => {
                    let stage = active.stage();
                    let next = self.advance(active, &reference, &id).await;
                    if let (Some(stage), false) = (stage, matches!(next, UnitState::Failed { .. })) {
                        tracing::debug!(stage = %stage, "Stage completed");
                        completed_stages.push(stage);
                    }
                    next
                }
            };
        };

        let duration = started.elapsed();
        if let UnitStatus::Done(report) = &status {
            crate::log_unit_complete!(&reference, report.moved(), duration);
        }

        UnitOutcome {
            reference,
            correlation_id: Some(id),
            status,
            completed_stages,
            duration,
        }
    }

    fn skip_reason(&self, parsed: &ParsedKey) -> Option<String> {
        if parsed.area != self.layout.unprocessed_area() {
            return Some(format!(
                "outside the '{}' area",
                self.layout.unprocessed_area()
            ));
        }
        let extension = parsed.extension.to_lowercase();
        if !self.trigger_extensions.contains(&extension) {
            return Some(format!("'{}' is not a trigger extension", parsed.extension));
        }
        None
    }

    async fn advance(
        &self,
        state: UnitState,
        reference: &ObjectReference,
        id: &CorrelationId,
    ) -> UnitState {
        match state {
            UnitState::FetchingArtifact => {
                let stage = Stage::FetchingArtifact;
                match self
                    .guard(stage, self.artifacts.fetch_artifact(reference))
                    .await
                {
                    Ok(artifact) => UnitState::FetchingMetadata { artifact },
                    Err(error) => UnitState::Failed { stage, error },
                }
            }
            UnitState::FetchingMetadata { artifact } => {
                let stage = Stage::FetchingMetadata;
                match self
                    .guard(stage, self.metadata.fetch_metadata(reference.bucket(), id))
                    .await
                {
                    Ok(metadata) => UnitState::Notifying { artifact, metadata },
                    Err(error) => UnitState::Failed { stage, error },
                }
            }
            UnitState::Notifying { artifact, metadata } => {
                let stage = Stage::Notifying;
                match self
                    .guard(stage, self.notifier.notify(&metadata, artifact))
                    .await
                {
                    Ok(()) => UnitState::Relocating,
                    Err(error) => UnitState::Failed { stage, error },
                }
            }
            UnitState::Relocating => {
                let stage = Stage::Relocating;
                let relocation = async {
                    self.relocator
                        .relocate(reference.bucket(), id)
                        .await?
                        .into_result()
                };
                match self.guard(stage, relocation).await {
                    Ok(report) => UnitState::Done(report),
                    Err(error) => UnitState::Failed { stage, error },
                }
            }
            terminal => terminal,
        }
    }

    /// Race a stage against the shutdown signal
    async fn guard<T>(&self, stage: Stage, work: impl Future<Output = Result<T>>) -> Result<T> {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return Err(CourierError::Cancelled(stage.to_string()));
        }

        tokio::select! {
            result = work => result,
            () = wait_for_shutdown(&mut shutdown) => {
                tracing::warn!(stage = %stage, "Shutdown requested, abandoning unit");
                Err(CourierError::Cancelled(stage.to_string()))
            }
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            // Sender gone: no shutdown can arrive any more
            std::future::pending::<()>().await;
        }
    }
}
