//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Correlation identifier newtype wrapper
///
/// Groups every object (PDF, JSON) that belongs to one policy fulfillment.
/// It is the segment of an object key between the first `/` and the first `.`.
///
/// # Examples
///
/// ```
/// use courier::domain::ids::CorrelationId;
/// use std::str::FromStr;
///
/// let id = CorrelationId::from_str("1234567890").unwrap();
/// assert_eq!(id.as_str(), "1234567890");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Creates a new CorrelationId
    ///
    /// Rejects empty values and values containing a key delimiter (`/` or `.`).
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Correlation ID cannot be empty".to_string());
        }
        if id.contains('/') || id.contains('.') {
            return Err(format!(
                "Correlation ID cannot contain '/' or '.': {id}"
            ));
        }
        Ok(Self(id))
    }

    /// Returns the correlation ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CorrelationId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference to one stored object
///
/// Created from a trigger notification and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    bucket: String,
    key: String,
}

impl ObjectReference {
    /// Creates a new object reference
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key within the bucket
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_valid() {
        let id = CorrelationId::new("1234567890").unwrap();
        assert_eq!(id.as_str(), "1234567890");
        assert_eq!(id.to_string(), "1234567890");
    }

    #[test]
    fn test_correlation_id_empty() {
        assert!(CorrelationId::new("").is_err());
        assert!(CorrelationId::new("   ").is_err());
    }

    #[test]
    fn test_correlation_id_rejects_delimiters() {
        assert!(CorrelationId::new("a/b").is_err());
        assert!(CorrelationId::new("a.pdf").is_err());
    }

    #[test]
    fn test_correlation_id_into_inner() {
        let id = CorrelationId::from_str("42").unwrap();
        assert_eq!(id.into_inner(), "42".to_string());
    }

    #[test]
    fn test_object_reference_display() {
        let reference = ObjectReference::new("B", "unprocessed/1.pdf");
        assert_eq!(reference.bucket(), "B");
        assert_eq!(reference.key(), "unprocessed/1.pdf");
        assert_eq!(reference.to_string(), "B/unprocessed/1.pdf");
    }
}
