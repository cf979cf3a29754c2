//! Artifact and metadata retrieval
//!
//! Both fetchers perform exactly one full read through the injected
//! [`ObjectStore`] and never retry. Partial reads are the store's concern.

use crate::adapters::storage::ObjectStore;
use crate::core::keys::KeyLayout;
use crate::domain::{CorrelationId, FulfillmentMetadata, ObjectReference, Result};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Raw artifact content, owned by one unit run
#[derive(Clone, PartialEq, Eq)]
pub struct ArtifactBytes(Vec<u8>);

impl ArtifactBytes {
    pub fn new(content: Vec<u8>) -> Self {
        Self(content)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Hex-encoded SHA-256 of the content (64 characters)
    ///
    /// # Examples
    ///
    /// ```
    /// use courier::core::fetch::ArtifactBytes;
    ///
    /// let artifact = ArtifactBytes::new(b"%PDF-1.7".to_vec());
    /// assert_eq!(artifact.sha256().len(), 64);
    /// ```
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.0);
        let result = hasher.finalize();
        format!("{result:x}")
    }
}

impl std::fmt::Debug for ArtifactBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBytes")
            .field("len", &self.0.len())
            .finish()
    }
}

impl From<Vec<u8>> for ArtifactBytes {
    fn from(content: Vec<u8>) -> Self {
        Self(content)
    }
}

/// Reads the artifact that triggered a unit
pub struct ArtifactFetcher {
    store: Arc<dyn ObjectStore>,
}

impl ArtifactFetcher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Fetch the full artifact content
    ///
    /// # Errors
    ///
    /// Storage failures are returned unchanged; `NotFound` and transport
    /// errors are both fatal for the unit.
    pub async fn fetch_artifact(&self, reference: &ObjectReference) -> Result<ArtifactBytes> {
        let content = self
            .store
            .get(reference.bucket(), reference.key())
            .await?;
        let artifact = ArtifactBytes::new(content);

        tracing::debug!(
            bucket = %reference.bucket(),
            key = %reference.key(),
            size_bytes = artifact.len(),
            sha256 = %artifact.sha256(),
            "Fetched artifact"
        );

        if artifact.is_empty() {
            tracing::warn!(key = %reference.key(), "Artifact is empty");
        }

        Ok(artifact)
    }
}

/// Reads and decodes the metadata document of a correlation identifier
pub struct MetadataFetcher {
    store: Arc<dyn ObjectStore>,
    layout: KeyLayout,
}

impl MetadataFetcher {
    pub fn new(store: Arc<dyn ObjectStore>, layout: KeyLayout) -> Self {
        Self { store, layout }
    }

    /// Fetch `<unprocessed>/<id>.json` from `bucket` and decode it
    ///
    /// # Errors
    ///
    /// Storage failures are returned unchanged. Undecodable content yields
    /// [`CourierError::Decode`](crate::domain::CourierError::Decode).
    pub async fn fetch_metadata(
        &self,
        bucket: &str,
        id: &CorrelationId,
    ) -> Result<FulfillmentMetadata> {
        let key = self.layout.metadata_key(id);
        let content = self.store.get(bucket, &key).await?;
        let metadata = FulfillmentMetadata::from_json_slice(&content)?;

        tracing::debug!(
            bucket = %bucket,
            key = %key,
            policy_number = metadata.record.policy_number,
            "Fetched metadata"
        );

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryObjectStore;
    use crate::domain::{ErrorKind, StorageError};

    const METADATA: &str = r#"{
        "email": {"from": "policies@insurer.example", "to": "holder@example.com"},
        "data": {"name": "Jane Doe", "city": "Pune", "policyNumber": 1234567890}
    }"#;

    fn store() -> Arc<MemoryObjectStore> {
        let store = Arc::new(MemoryObjectStore::new());
        store.insert("B", "unprocessed/1234567890.pdf", b"%PDF-1.7".to_vec());
        store.insert("B", "unprocessed/1234567890.json", METADATA.as_bytes().to_vec());
        store
    }

    #[test]
    fn test_sha256_known_value() {
        let artifact = ArtifactBytes::new(b"abc".to_vec());
        assert_eq!(
            artifact.sha256(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_debug_hides_content() {
        let artifact = ArtifactBytes::new(b"secret".to_vec());
        assert_eq!(format!("{artifact:?}"), "ArtifactBytes { len: 6 }");
    }

    #[tokio::test]
    async fn test_fetch_artifact() {
        let fetcher = ArtifactFetcher::new(store());
        let reference = ObjectReference::new("B", "unprocessed/1234567890.pdf");

        let artifact = fetcher.fetch_artifact(&reference).await.unwrap();
        assert_eq!(artifact.as_slice(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_fetch_artifact_empty_object_is_accepted() {
        let store = store();
        store.insert("B", "unprocessed/9.pdf", Vec::new());
        let fetcher = ArtifactFetcher::new(store);

        let artifact = fetcher
            .fetch_artifact(&ObjectReference::new("B", "unprocessed/9.pdf"))
            .await
            .unwrap();
        assert!(artifact.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_artifact_not_found() {
        let fetcher = ArtifactFetcher::new(store());
        let err = fetcher
            .fetch_artifact(&ObjectReference::new("B", "unprocessed/missing.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_metadata() {
        let fetcher = MetadataFetcher::new(store(), KeyLayout::default());
        let id = CorrelationId::new("1234567890").unwrap();

        let metadata = fetcher.fetch_metadata("B", &id).await.unwrap();
        assert_eq!(metadata.recipient.to_address, "holder@example.com");
        assert_eq!(metadata.record.holder_name, "Jane Doe");
        assert_eq!(metadata.policy_number(), "1234567890");
    }

    #[tokio::test]
    async fn test_fetch_metadata_missing() {
        let fetcher = MetadataFetcher::new(store(), KeyLayout::default());
        let id = CorrelationId::new("555").unwrap();

        let err = fetcher.fetch_metadata("B", &id).await.unwrap_err();
        assert!(matches!(
            err,
            crate::domain::CourierError::Storage(StorageError::NotFound { ref key, .. })
                if key == "unprocessed/555.json"
        ));
    }

    #[tokio::test]
    async fn test_fetch_metadata_undecodable() {
        let store = store();
        store.insert("B", "unprocessed/77.json", b"{\"email\": 1}".to_vec());
        let fetcher = MetadataFetcher::new(store, KeyLayout::default());

        let err = fetcher
            .fetch_metadata("B", &CorrelationId::new("77").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
