//! Domain error types
//!
//! This module defines the error hierarchy for Courier. Collaborator failures
//! (storage, mail) have their own enums and are wrapped by [`CourierError`],
//! so no third-party error type crosses a module boundary.

use thiserror::Error;

/// Main Courier error type
///
/// Every fallible pipeline operation returns this type. [`CourierError::kind`]
/// maps each variant onto the pipeline's error taxonomy.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Mail transport errors
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    /// Object key does not match `<prefix>/<correlation-id><ext>`
    #[error("Malformed object key: {0}")]
    MalformedKey(String),

    /// Metadata document is not valid JSON or misses required fields
    #[error("Metadata decode error: {0}")]
    Decode(String),

    /// One or more objects in a relocation set were not moved
    #[error("Partial relocation: {failed} of {attempted} object(s) failed ({keys})")]
    PartialRelocation {
        failed: usize,
        attempted: usize,
        keys: String,
    },

    /// Work was abandoned because the invocation was cancelled
    #[error("Cancelled during {0}")]
    Cancelled(String),

    /// At least one unit of a batch failed
    #[error("{failed} of {total} unit(s) failed; first failure: {first}")]
    BatchFailed {
        failed: usize,
        total: usize,
        first: String,
    },

    /// Trigger event could not be read
    #[error("Invalid trigger event: {0}")]
    InvalidEvent(String),

}

/// Error taxonomy used when reporting stage failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Transport,
    Decode,
    MalformedKey,
    Delivery,
    PartialRelocation,
    Cancelled,
    Configuration,
}

impl CourierError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CourierError::Storage(StorageError::NotFound { .. }) => ErrorKind::NotFound,
            CourierError::Storage(_) => ErrorKind::Transport,
            CourierError::Mail(_) => ErrorKind::Delivery,
            CourierError::MalformedKey(_) => ErrorKind::MalformedKey,
            CourierError::Decode(_) => ErrorKind::Decode,
            CourierError::PartialRelocation { .. } => ErrorKind::PartialRelocation,
            CourierError::Cancelled(_) => ErrorKind::Cancelled,
            CourierError::Configuration(_) | CourierError::InvalidEvent(_) => {
                ErrorKind::Configuration
            }
            CourierError::BatchFailed { .. } => ErrorKind::Transport,
        }
    }
}

/// Object storage errors
///
/// Raised by [`ObjectStore`](crate::adapters::storage::ObjectStore)
/// implementations. Timeouts are a transport failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object does not exist
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// The call to the storage backend failed
    #[error("Storage transport failed: {0}")]
    Transport(String),

    /// The call did not finish within the configured bound
    #[error("Storage operation timed out: {0}")]
    Timeout(String),
}

/// Mail transport errors
#[derive(Debug, Error)]
pub enum MailError {
    /// Failed to reach the relay or SMTP server
    #[error("Failed to reach mail server: {0}")]
    ConnectionFailed(String),

    /// Server refused the message (HTTP or SMTP status)
    #[error("Mail server rejected message: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// Server did not answer in time
    #[error("Mail server timeout: {0}")]
    Timeout(String),

    /// Message could not be built
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_error_display() {
        let err = CourierError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_storage_not_found_kind() {
        let err: CourierError = StorageError::NotFound {
            bucket: "b".to_string(),
            key: "unprocessed/1.json".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("b/unprocessed/1.json"));
    }

    #[test]
    fn test_storage_transport_kinds() {
        let err: CourierError = StorageError::Timeout("get".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err: CourierError = StorageError::BucketNotFound("b".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_mail_errors_are_delivery() {
        let err: CourierError = MailError::Rejected {
            status: 550,
            message: "mailbox unavailable".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Delivery);
        assert!(err.to_string().contains("550"));
    }

    #[test]
    fn test_partial_relocation_display() {
        let err = CourierError::PartialRelocation {
            failed: 1,
            attempted: 3,
            keys: "unprocessed/1.json".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::PartialRelocation);
        assert_eq!(
            err.to_string(),
            "Partial relocation: 1 of 3 object(s) failed (unprocessed/1.json)"
        );
    }
}
