//! In-memory object store
//!
//! Keeps buckets in process memory, records every call, and can be told to
//! fail specific operations on specific keys. Used by the test suites and for
//! local experiments.

use super::traits::{listing_includes, ObjectStore, StorageResult};
use crate::domain::StorageError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// Storage primitive, used for call recording and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOperation {
    Get,
    Put,
    List,
    Copy,
    Delete,
}

/// One recorded call; `key` is the source key for copies and the prefix for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCall {
    pub operation: StorageOperation,
    pub bucket: String,
    pub key: String,
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    calls: Vec<StorageCall>,
    faults: HashSet<(StorageOperation, String)>,
}

/// Object store held entirely in memory
#[derive(Default)]
pub struct MemoryObjectStore {
    state: Mutex<State>,
}

impl MemoryObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bucket
    pub fn create_bucket(&self, bucket: &str) {
        self.lock().buckets.entry(bucket.to_string()).or_default();
    }

    /// Insert an object without recording a call
    pub fn insert(&self, bucket: &str, key: &str, content: impl Into<Vec<u8>>) {
        self.lock()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), content.into());
    }

    /// Make `operation` on `key` fail with a transport error
    pub fn fail_on(&self, operation: StorageOperation, key: &str) {
        self.lock().faults.insert((operation, key.to_string()));
    }

    /// Whether the object exists
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.lock()
            .buckets
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key))
    }

    /// All keys of a bucket, in ascending order
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every call made so far, in call order
    pub fn calls(&self) -> Vec<StorageCall> {
        self.lock().calls.clone()
    }

    /// Calls of one kind
    pub fn calls_of(&self, operation: StorageOperation) -> Vec<StorageCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panicking test thread must not hide the store from the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and apply any injected fault
    fn begin(&self, operation: StorageOperation, bucket: &str, key: &str) -> StorageResult<()> {
        let mut state = self.lock();
        state.calls.push(StorageCall {
            operation,
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        if state.faults.contains(&(operation, key.to_string())) {
            return Err(StorageError::Transport(format!(
                "injected {operation:?} failure for {bucket}/{key}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.begin(StorageOperation::Get, bucket, key)?;
        let state = self.lock();
        let objects = state
            .buckets
            .get(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>) -> StorageResult<()> {
        self.begin(StorageOperation::Put, bucket, key)?;
        self.insert(bucket, key, content);
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> StorageResult<Vec<String>> {
        self.begin(StorageOperation::List, bucket, prefix)?;
        let state = self.lock();
        let objects = state
            .buckets
            .get(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        Ok(objects
            .keys()
            .filter(|key| listing_includes(key, prefix, delimiter))
            .cloned()
            .collect())
    }

    async fn copy(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> StorageResult<()> {
        self.begin(StorageOperation::Copy, bucket, source_key)?;
        let mut state = self.lock();
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        let content = objects
            .get(source_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: source_key.to_string(),
            })?;
        objects.insert(destination_key.to_string(), content);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.begin(StorageOperation::Delete, bucket, key)?;
        let mut state = self.lock();
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}
