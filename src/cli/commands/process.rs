//! Process command implementation
//!
//! Runs the pipeline once, either for every record of a trigger event
//! document or for a single `--bucket/--key` pair.

use crate::config::load_config;
use crate::core::pipeline::{PipelineCoordinator, UnitStatus};
use crate::domain::{ObjectReference, TriggerEvent};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Trigger event document (S3 event notification JSON)
    #[arg(long, conflicts_with_all = ["bucket", "key"], required_unless_present = "key")]
    pub event: Option<String>,

    /// Bucket of a single object to process
    #[arg(long, requires = "key")]
    pub bucket: Option<String>,

    /// Key of a single object to process
    #[arg(long, requires = "bucket")]
    pub key: Option<String>,

    /// Compose notifications and plan relocations without sending or moving anything
    #[arg(long)]
    pub dry_run: bool,
}

impl ProcessArgs {
    /// Execute the process command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting process command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let event = match self.trigger_event().await {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read trigger event");
                eprintln!("Failed to read trigger event: {e}");
                return Ok(2);
            }
        };

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - notifications are recorded, objects are not moved");
            println!();
        }

        let coordinator = match PipelineCoordinator::from_config(&config, shutdown_signal) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create pipeline coordinator");
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(5);
            }
        };

        let summary = coordinator.process_batch(event.references()).await;
        summary.log_summary();

        println!("📊 Summary (invocation {}):", summary.invocation_id);
        for outcome in &summary.outcomes {
            match &outcome.status {
                UnitStatus::Done(report) => println!(
                    "  ✅ {} - {} of {} object(s) relocated",
                    outcome.reference,
                    report.moved(),
                    report.attempted()
                ),
                UnitStatus::Skipped(reason) => {
                    println!("  ⏭️  {} - skipped: {reason}", outcome.reference)
                }
                UnitStatus::Failed { stage, error } => {
                    println!("  ❌ {} - failed while {stage}: {error}", outcome.reference)
                }
            }
        }
        println!(
            "  Total: {}, Completed: {}, Skipped: {}, Failed: {}, Duration: {:.2}s",
            summary.total(),
            summary.completed(),
            summary.skipped(),
            summary.failed(),
            summary.duration.as_secs_f64()
        );
        println!();

        match summary.into_result() {
            Ok(status) => {
                println!("✅ {status}");
                Ok(0)
            }
            Err(e) => {
                eprintln!("⚠️  {e}");
                Ok(1)
            }
        }
    }

    async fn trigger_event(&self) -> crate::domain::Result<TriggerEvent> {
        match (&self.event, &self.bucket, &self.key) {
            (Some(path), _, _) => {
                let bytes = tokio::fs::read(path).await?;
                TriggerEvent::from_json_slice(&bytes)
            }
            (None, Some(bucket), Some(key)) => Ok(TriggerEvent::from_references([
                ObjectReference::new(bucket, key),
            ])),
            _ => Err(crate::domain::CourierError::InvalidEvent(
                "either --event or --bucket with --key is required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(event: Option<&str>, bucket: Option<&str>, key: Option<&str>) -> ProcessArgs {
        ProcessArgs {
            event: event.map(String::from),
            bucket: bucket.map(String::from),
            key: key.map(String::from),
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn test_trigger_event_from_single_object() {
        let event = args(None, Some("policies"), Some("unprocessed/1.pdf"))
            .trigger_event()
            .await
            .unwrap();
        let references = event.references();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].key(), "unprocessed/1.pdf");
    }

    #[tokio::test]
    async fn test_trigger_event_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{"Records":[{"s3":{"bucket":{"name":"policies"},"object":{"key":"unprocessed/7.pdf"}}}]}"#,
        )
        .unwrap();

        let event = args(Some(path.to_str().unwrap()), None, None)
            .trigger_event()
            .await
            .unwrap();
        assert_eq!(event.references()[0].bucket(), "policies");
    }

    #[tokio::test]
    async fn test_trigger_event_missing_file() {
        let result = args(Some("/nonexistent/event.json"), None, None)
            .trigger_event()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_config_is_configuration_exit_code() {
        let (_tx, rx) = watch::channel(false);
        let code = args(None, Some("b"), Some("unprocessed/1.pdf"))
            .execute("/nonexistent/courier.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
