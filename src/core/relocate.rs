//! Relocation of a processed correlation set
//!
//! Every object under `<unprocessed>/<id>` whose key carries exactly the same
//! correlation identifier is copied to `<processed>/<file_name>` and the
//! original deleted.
//!
//! Relocation is not transactional. Each object is attempted independently
//! and nothing is rolled back: a failed copy leaves the original in place, a
//! failed delete leaves the object in both areas. If the surrounding future
//! is dropped (for instance on cancellation) between a copy and its delete,
//! the object is likewise left in both areas. Re-running is safe since copies
//! overwrite.

use crate::adapters::storage::ObjectStore;
use crate::core::keys::{self, KeyLayout, LIST_DELIMITER};
use crate::domain::{CorrelationId, CourierError, Result};
use std::sync::Arc;

/// Result of one storage step of a relocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Failed(String),
    /// Not run: the copy failed first, or this is a dry run
    NotAttempted,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }

    fn from_result<T, E: std::fmt::Display>(result: &std::result::Result<T, E>) -> Self {
        match result {
            Ok(_) => StepOutcome::Succeeded,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }
}

/// Outcome for one object of the relocation set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRelocation {
    pub key: String,
    pub destination: String,
    pub copy: StepOutcome,
    pub delete: StepOutcome,
}

impl ObjectRelocation {
    /// Copied and deleted
    pub fn is_moved(&self) -> bool {
        self.copy.is_success() && self.delete.is_success()
    }

    /// First failing step, if any
    pub fn failure(&self) -> Option<&str> {
        match (&self.copy, &self.delete) {
            (StepOutcome::Failed(reason), _) => Some(reason),
            (_, StepOutcome::Failed(reason)) => Some(reason),
            _ => None,
        }
    }
}

/// Per-object record of one relocation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationReport {
    pub bucket: String,
    pub correlation_id: CorrelationId,
    pub objects: Vec<ObjectRelocation>,

    /// Listed keys left alone because their correlation id differs
    pub excluded: Vec<String>,

    /// Nothing was copied or deleted
    pub dry_run: bool,
}

impl RelocationReport {
    fn new(bucket: &str, correlation_id: &CorrelationId, dry_run: bool) -> Self {
        Self {
            bucket: bucket.to_string(),
            correlation_id: correlation_id.clone(),
            objects: Vec::new(),
            excluded: Vec::new(),
            dry_run,
        }
    }

    /// Objects attempted
    pub fn attempted(&self) -> usize {
        self.objects.len()
    }

    /// Objects fully moved
    pub fn moved(&self) -> usize {
        self.objects.iter().filter(|o| o.is_moved()).count()
    }

    /// Objects with a failed copy or delete
    pub fn failures(&self) -> Vec<&ObjectRelocation> {
        self.objects
            .iter()
            .filter(|o| o.failure().is_some())
            .collect()
    }

    /// No object failed
    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    /// Turn failures into [`CourierError::PartialRelocation`]
    ///
    /// # Errors
    ///
    /// Fails when at least one object was not moved.
    pub fn into_result(self) -> Result<Self> {
        let failures = self.failures();
        if failures.is_empty() {
            return Ok(self);
        }

        let keys = failures
            .iter()
            .map(|o| o.key.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(CourierError::PartialRelocation {
            failed: failures.len(),
            attempted: self.attempted(),
            keys,
        })
    }
}

/// Moves a correlation set from the unprocessed to the processed area
pub struct Relocator {
    store: Arc<dyn ObjectStore>,
    layout: KeyLayout,
    dry_run: bool,
}

impl Relocator {
    pub fn new(store: Arc<dyn ObjectStore>, layout: KeyLayout) -> Self {
        Self {
            store,
            layout,
            dry_run: false,
        }
    }

    /// List only; record planned moves without copying or deleting
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Relocate every object of the set
    ///
    /// An empty set is not an error. Per-object failures are recorded in the
    /// report; use [`RelocationReport::into_result`] to treat them as an error.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the listing itself fails.
    pub async fn relocate(&self, bucket: &str, id: &CorrelationId) -> Result<RelocationReport> {
        let prefix = self.layout.relocation_prefix(id);
        let listed = self
            .store
            .list(bucket, &prefix, Some(LIST_DELIMITER))
            .await?;

        let mut report = RelocationReport::new(bucket, id, self.dry_run);

        for key in listed {
            if !Self::belongs_to(&key, id) {
                tracing::debug!(key = %key, correlation_id = %id, "Excluded from relocation set");
                report.excluded.push(key);
                continue;
            }

            let outcome = self.relocate_object(bucket, key).await;
            if let Some(reason) = outcome.failure() {
                tracing::warn!(
                    key = %outcome.key,
                    destination = %outcome.destination,
                    error = %reason,
                    "Object relocation failed"
                );
            }
            report.objects.push(outcome);
        }

        if report.objects.is_empty() {
            tracing::info!(bucket = %bucket, correlation_id = %id, "Nothing to relocate");
        } else {
            tracing::info!(
                bucket = %bucket,
                correlation_id = %id,
                attempted = report.attempted(),
                moved = report.moved(),
                failed = report.failures().len(),
                dry_run = self.dry_run,
                "Relocation finished"
            );
        }

        Ok(report)
    }

    fn belongs_to(key: &str, id: &CorrelationId) -> bool {
        keys::correlation_id(key).is_ok_and(|parsed| &parsed == id)
    }

    async fn relocate_object(&self, bucket: &str, key: String) -> ObjectRelocation {
        let destination = match keys::file_name(&key) {
            Ok(name) => self.layout.processed_key(name),
            Err(e) => {
                return ObjectRelocation {
                    key,
                    destination: String::new(),
                    copy: StepOutcome::Failed(e.to_string()),
                    delete: StepOutcome::NotAttempted,
                }
            }
        };

        if self.dry_run {
            tracing::info!(key = %key, destination = %destination, "Dry run: would relocate");
            return ObjectRelocation {
                key,
                destination,
                copy: StepOutcome::NotAttempted,
                delete: StepOutcome::NotAttempted,
            };
        }

        let copied = self.store.copy(bucket, &key, &destination).await;
        let copy = StepOutcome::from_result(&copied);

        let delete = if copy.is_success() {
            StepOutcome::from_result(&self.store.delete(bucket, &key).await)
        } else {
            StepOutcome::NotAttempted
        };

        ObjectRelocation {
            key,
            destination,
            copy,
            delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{MemoryObjectStore, StorageOperation};
    use crate::domain::ErrorKind;

    fn id(value: &str) -> CorrelationId {
        CorrelationId::new(value).unwrap()
    }

    fn seeded() -> Arc<MemoryObjectStore> {
        let store = Arc::new(MemoryObjectStore::new());
        store.insert("B", "unprocessed/123.pdf", b"pdf".to_vec());
        store.insert("B", "unprocessed/123.json", b"{}".to_vec());
        store
    }

    #[tokio::test]
    async fn test_relocate_moves_set() {
        let store = seeded();
        let relocator = Relocator::new(store.clone(), KeyLayout::default());

        let report = relocator.relocate("B", &id("123")).await.unwrap();

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.moved(), 2);
        assert!(report.is_complete());
        assert_eq!(
            store.keys("B"),
            vec!["processed/123.json".to_string(), "processed/123.pdf".to_string()]
        );
    }

    #[tokio::test]
    async fn test_relocate_excludes_prefix_collisions() {
        let store = seeded();
        store.insert("B", "unprocessed/1234.pdf", b"other".to_vec());
        let relocator = Relocator::new(store.clone(), KeyLayout::default());

        let report = relocator.relocate("B", &id("123")).await.unwrap();

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.excluded, vec!["unprocessed/1234.pdf".to_string()]);
        assert!(store.contains("B", "unprocessed/1234.pdf"));
    }

    #[tokio::test]
    async fn test_relocate_empty_set_is_ok() {
        let store = Arc::new(MemoryObjectStore::new());
        store.create_bucket("B");
        let relocator = Relocator::new(store.clone(), KeyLayout::default());

        let report = relocator.relocate("B", &id("123")).await.unwrap();

        assert_eq!(report.attempted(), 0);
        assert!(report.is_complete());
        assert!(store.calls_of(StorageOperation::Copy).is_empty());
    }

    #[tokio::test]
    async fn test_failed_copy_skips_delete() {
        let store = seeded();
        store.fail_on(StorageOperation::Copy, "unprocessed/123.json");
        let relocator = Relocator::new(store.clone(), KeyLayout::default());

        let report = relocator.relocate("B", &id("123")).await.unwrap();

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key, "unprocessed/123.json");
        assert_eq!(failures[0].delete, StepOutcome::NotAttempted);
        assert!(store.contains("B", "unprocessed/123.json"));
        assert!(store.contains("B", "processed/123.pdf"));

        let deletes = store.calls_of(StorageOperation::Delete);
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].key, "unprocessed/123.pdf");
    }

    #[tokio::test]
    async fn test_failed_delete_is_attributed_to_delete() {
        let store = seeded();
        store.fail_on(StorageOperation::Delete, "unprocessed/123.pdf");
        let relocator = Relocator::new(store.clone(), KeyLayout::default());

        let report = relocator.relocate("B", &id("123")).await.unwrap();
        let failure = report
            .objects
            .iter()
            .find(|o| o.key == "unprocessed/123.pdf")
            .unwrap();

        assert!(failure.copy.is_success());
        assert!(matches!(failure.delete, StepOutcome::Failed(_)));
        assert!(store.contains("B", "processed/123.pdf"));
        assert!(store.contains("B", "unprocessed/123.pdf"));
    }

    #[tokio::test]
    async fn test_into_result_reports_partial_relocation() {
        let store = seeded();
        store.fail_on(StorageOperation::Copy, "unprocessed/123.pdf");
        let relocator = Relocator::new(store, KeyLayout::default());

        let err = relocator
            .relocate("B", &id("123"))
            .await
            .unwrap()
            .into_result()
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PartialRelocation);
        assert!(err.to_string().contains("1 of 2"));
        assert!(err.to_string().contains("unprocessed/123.pdf"));
    }

    #[tokio::test]
    async fn test_listing_failure_is_error() {
        let store = seeded();
        store.fail_on(StorageOperation::List, "unprocessed/123");
        let relocator = Relocator::new(store, KeyLayout::default());

        let err = relocator.relocate("B", &id("123")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_dry_run_only_lists() {
        let store = seeded();
        let relocator = Relocator::new(store.clone(), KeyLayout::default()).with_dry_run(true);

        let report = relocator.relocate("B", &id("123")).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.moved(), 0);
        assert!(report.is_complete());
        assert!(store.calls_of(StorageOperation::Copy).is_empty());
        assert!(store.calls_of(StorageOperation::Delete).is_empty());
        assert!(store.contains("B", "unprocessed/123.pdf"));
    }
}
