//! Status command implementation
//!
//! Lists the correlation sets still waiting in the unprocessed area of a
//! bucket, so stuck units can be spotted and re-triggered.

use crate::adapters::create_object_store;
use crate::config::load_config;
use crate::core::keys::{self, LIST_DELIMITER};
use crate::domain::CorrelationId;
use clap::Args;
use std::collections::BTreeMap;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Bucket to inspect
    #[arg(long)]
    pub bucket: String,
}

/// Unprocessed keys grouped by correlation id
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PendingSets {
    pub sets: BTreeMap<CorrelationId, Vec<String>>,

    /// Keys that do not carry a correlation id
    pub unrecognized: Vec<String>,
}

impl PendingSets {
    pub fn from_keys(listed: impl IntoIterator<Item = String>) -> Self {
        let mut pending = Self::default();
        for key in listed {
            match keys::correlation_id(&key) {
                Ok(id) => pending.sets.entry(id).or_default().push(key),
                Err(_) => pending.unrecognized.push(key),
            }
        }
        pending
    }
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(bucket = %self.bucket, "Checking pending objects");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let store = create_object_store(&config);
        let prefix = format!("{}/", config.storage.unprocessed_prefix);
        let listed = match store.list(&self.bucket, &prefix, Some(LIST_DELIMITER)).await {
            Ok(keys) => keys,
            Err(e) => {
                println!("❌ Failed to list {}/{prefix}", self.bucket);
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        let pending = PendingSets::from_keys(listed);

        println!("📊 Pending in {}/{prefix}", self.bucket);
        println!();

        if pending.sets.is_empty() && pending.unrecognized.is_empty() {
            println!("Nothing pending.");
            return Ok(0);
        }

        for (id, keys) in &pending.sets {
            let has_metadata = keys.iter().any(|k| k.ends_with(".json"));
            println!(
                "  {id}: {} object(s){}",
                keys.len(),
                if has_metadata { "" } else { " (no metadata)" }
            );
            for key in keys {
                println!("    - {key}");
            }
        }

        if !pending.unrecognized.is_empty() {
            println!();
            println!("  Unrecognized keys:");
            for key in &pending.unrecognized {
                println!("    - {key}");
            }
        }

        println!();
        println!("Total correlation ids: {}", pending.sets.len());
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_sets_groups_by_correlation_id() {
        let pending = PendingSets::from_keys(
            [
                "unprocessed/1.json",
                "unprocessed/1.pdf",
                "unprocessed/2.pdf",
                "unprocessed/README",
            ]
            .map(String::from),
        );

        assert_eq!(pending.sets.len(), 2);
        let one = CorrelationId::new("1").unwrap();
        assert_eq!(
            pending.sets[&one],
            vec!["unprocessed/1.json".to_string(), "unprocessed/1.pdf".to_string()]
        );
        assert_eq!(pending.unrecognized, vec!["unprocessed/README".to_string()]);
    }

    #[tokio::test]
    async fn test_status_lists_filesystem_bucket() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("buckets");
        std::fs::create_dir_all(root.join("policies/unprocessed")).unwrap();
        std::fs::write(root.join("policies/unprocessed/9.pdf"), b"%PDF").unwrap();

        let config_path = dir.path().join("courier.toml");
        std::fs::write(
            &config_path,
            format!(
                "[storage]\nroot = \"{}\"\n\n[mail]\ntransport = \"recording\"\n",
                root.display().to_string().replace('\\', "/")
            ),
        )
        .unwrap();

        let args = StatusArgs {
            bucket: "policies".to_string(),
        };
        let code = args.execute(config_path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_status_missing_config() {
        let args = StatusArgs {
            bucket: "policies".to_string(),
        };
        assert_eq!(args.execute("/nonexistent/courier.toml").await.unwrap(), 2);
    }
}
