//! Filesystem-backed object store
//!
//! Each bucket is a directory under a root directory and each key is a
//! relative file path inside it. Every call is bounded by the configured
//! operation timeout.

use super::traits::{listing_includes, ObjectStore, StorageResult};
use crate::config::StorageConfig;
use crate::domain::StorageError;
use async_trait::async_trait;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Object store rooted at a local directory
pub struct FsObjectStore {
    root: PathBuf,
    timeout: Duration,
}

impl FsObjectStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    /// Create a store from the storage section of the configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            &config.root,
            Duration::from_secs(config.operation_timeout_seconds),
        )
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> StorageResult<PathBuf> {
        if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
            return Err(StorageError::Transport(format!(
                "Invalid bucket name: '{bucket}'"
            )));
        }
        Ok(self.root.join(bucket))
    }

    /// Resolve a key to a path, refusing anything that escapes the bucket
    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::Transport(format!(
                "Invalid object key: '{key}'"
            )));
        }
        Ok(self.bucket_dir(bucket)?.join(relative))
    }

    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<PathBuf> {
        let dir = self.bucket_dir(bucket)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(StorageError::BucketNotFound(bucket.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::BucketNotFound(bucket.to_string()))
            }
            Err(e) => Err(StorageError::Transport(e.to_string())),
        }
    }

    async fn bounded<T, F>(&self, operation: &str, future: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(format!(
                "{operation} exceeded {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    fn map_io(bucket: &str, key: &str, err: std::io::Error) -> StorageError {
        if err.kind() == ErrorKind::NotFound {
            StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }
        } else {
            StorageError::Transport(format!("{bucket}/{key}: {err}"))
        }
    }

    /// Collect the keys below `start`, walking directories iteratively
    ///
    /// A missing `start` directory yields no keys. Without `recursive` only
    /// the files directly inside `start` are collected.
    async fn keys_under(
        &self,
        bucket_dir: &Path,
        start: PathBuf,
        recursive: bool,
    ) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![start];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StorageError::Transport(format!("{}: {e}", dir.display())))
                }
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::Transport(format!("{}: {e}", dir.display())))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::Transport(format!("{}: {e}", path.display())))?;

                if file_type.is_dir() {
                    if recursive {
                        pending.push(path);
                    }
                } else if let Ok(relative) = path.strip_prefix(bucket_dir) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }

        Ok(keys)
    }
}

/// Directory a listing starts from, relative to the bucket, and whether it
/// has to descend into subdirectories
///
/// Listings start at the directory holding `prefix`. With a `/` delimiter no
/// key below a further `/` can match, so only that one directory is read.
fn listing_root(prefix: &str, delimiter: Option<&str>) -> (PathBuf, bool) {
    let recursive = delimiter != Some("/");
    let dir = prefix.rsplit_once('/').map_or("", |(dir, _)| dir);
    let relative = Path::new(dir);
    if relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        (relative.to_path_buf(), recursive)
    } else {
        (PathBuf::new(), true)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        self.bounded("get", async {
            self.ensure_bucket(bucket).await?;
            tokio::fs::read(&path)
                .await
                .map_err(|e| Self::map_io(bucket, key, e))
        })
        .await
    }

    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        self.bounded("put", async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Self::map_io(bucket, key, e))?;
            }
            tokio::fs::write(&path, content)
                .await
                .map_err(|e| Self::map_io(bucket, key, e))
        })
        .await
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> StorageResult<Vec<String>> {
        self.bounded("list", async {
            let bucket_dir = self.ensure_bucket(bucket).await?;
            let (start, recursive) = listing_root(prefix, delimiter);
            let mut keys: Vec<String> = self
                .keys_under(&bucket_dir, bucket_dir.join(start), recursive)
                .await?
                .into_iter()
                .filter(|key| listing_includes(key, prefix, delimiter))
                .collect();
            keys.sort();
            Ok(keys)
        })
        .await
    }

    async fn copy(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> StorageResult<()> {
        let source = self.object_path(bucket, source_key)?;
        let destination = self.object_path(bucket, destination_key)?;
        self.bounded("copy", async {
            self.ensure_bucket(bucket).await?;
            tokio::fs::metadata(&source)
                .await
                .map_err(|e| Self::map_io(bucket, source_key, e))?;
            if let Some(parent) = destination.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Self::map_io(bucket, destination_key, e))?;
            }
            tokio::fs::copy(&source, &destination)
                .await
                .map(|_| ())
                .map_err(|e| Self::map_io(bucket, source_key, e))
        })
        .await
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        self.bounded("delete", async {
            self.ensure_bucket(bucket).await?;
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| Self::map_io(bucket, key, e))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FsObjectStore {
        FsObjectStore::new(dir.path(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store
            .put("B", "unprocessed/1.pdf", b"%PDF".to_vec())
            .await
            .unwrap();
        let content = store.get("B", "unprocessed/1.pdf").await.unwrap();

        assert_eq!(content, b"%PDF".to_vec());
        assert!(dir.path().join("B/unprocessed/1.pdf").exists());
    }

    #[tokio::test]
    async fn test_get_missing_object() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.put("B", "unprocessed/1.pdf", vec![1]).await.unwrap();

        let err = store.get("B", "unprocessed/2.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_missing_bucket() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).get("nope", "a.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::BucketNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_is_prefix_and_delimiter_bounded() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for key in [
            "unprocessed/123.pdf",
            "unprocessed/123.json",
            "unprocessed/456.pdf",
            "unprocessed/123/nested.pdf",
            "processed/123.pdf",
        ] {
            store.put("B", key, vec![0]).await.unwrap();
        }

        let keys = store
            .list("B", "unprocessed/123", Some("/"))
            .await
            .unwrap();
        assert_eq!(keys, vec!["unprocessed/123.json", "unprocessed/123.pdf"]);
    }

    #[tokio::test]
    async fn test_copy_then_delete() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.put("B", "unprocessed/1.json", b"{}".to_vec()).await.unwrap();

        store
            .copy("B", "unprocessed/1.json", "processed/1.json")
            .await
            .unwrap();
        store.delete("B", "unprocessed/1.json").await.unwrap();

        assert_eq!(store.get("B", "processed/1.json").await.unwrap(), b"{}".to_vec());
        assert!(store.get("B", "unprocessed/1.json").await.is_err());
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.put("B", "unprocessed/other.pdf", vec![0]).await.unwrap();

        let err = store
            .copy("B", "unprocessed/1.pdf", "processed/1.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { key, .. } if key == "unprocessed/1.pdf"));
    }

    #[tokio::test]
    async fn test_copy_unreadable_source_is_transport() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.put("B", "unprocessed/1.pdf", vec![0]).await.unwrap();

        // A path through a regular file is not a missing object
        let err = store
            .copy("B", "unprocessed/1.pdf/inner", "processed/inner")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn test_listing_root() {
        assert_eq!(
            listing_root("unprocessed/123", Some("/")),
            (PathBuf::from("unprocessed"), false)
        );
        assert_eq!(
            listing_root("unprocessed/", Some("/")),
            (PathBuf::from("unprocessed"), false)
        );
        assert_eq!(listing_root("unprocessed/123", None), (PathBuf::from("unprocessed"), true));
        assert_eq!(listing_root("123", Some("/")), (PathBuf::new(), false));
        assert_eq!(listing_root("../x/123", Some("/")), (PathBuf::new(), true));
    }

    #[tokio::test]
    async fn test_list_missing_prefix_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.put("B", "processed/1.pdf", vec![0]).await.unwrap();

        let keys = store.list("B", "unprocessed/1", Some("/")).await.unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_list_without_delimiter_descends() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for key in ["unprocessed/1.pdf", "unprocessed/1/a.pdf", "processed/1.pdf"] {
            store.put("B", key, vec![0]).await.unwrap();
        }

        let keys = store.list("B", "unprocessed/1", None).await.unwrap();
        assert_eq!(keys, vec!["unprocessed/1.pdf", "unprocessed/1/a.pdf"]);
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store.get("B", "../secret").await.unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));
        let err = store.get("B", "/etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));
    }
}
