//! Object storage abstraction
//!
//! The pipeline only needs five primitives from a bucket store. Keys are
//! `/`-separated paths; listings follow S3 semantics where a delimiter hides
//! keys that continue past the next delimiter after the prefix.

use crate::domain::StorageError;
use async_trait::async_trait;

/// Result type for storage calls
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Bucket-oriented object store
///
/// Implementations own their fault tolerance: every call must finish or fail
/// within a bounded time, and a timeout is reported as
/// [`StorageError::Timeout`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name used in logs
    fn backend_name(&self) -> &'static str;

    /// Read the full content of an object
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the object does not exist.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Write an object, replacing any existing content
    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>) -> StorageResult<()>;

    /// List keys starting with `prefix`, in ascending key order
    ///
    /// With a delimiter, keys whose remainder after `prefix` contains the
    /// delimiter are left out.
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> StorageResult<Vec<String>>;

    /// Copy an object within a bucket
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the source does not exist.
    async fn copy(&self, bucket: &str, source_key: &str, destination_key: &str)
        -> StorageResult<()>;

    /// Delete an object
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the object does not exist.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;
}

/// Whether `key` belongs in a listing of `prefix` bounded by `delimiter`
pub fn listing_includes(key: &str, prefix: &str, delimiter: Option<&str>) -> bool {
    let Some(rest) = key.strip_prefix(prefix) else {
        return false;
    };
    match delimiter {
        Some(d) if !d.is_empty() => !rest.contains(d),
        _ => true,
    }
}
