//! Collaborator factory
//!
//! Builds the storage and mail collaborators selected by configuration.

use crate::adapters::mail::{MailTransport, RecordingTransport, RelayTransport, SmtpTransport};
use crate::adapters::storage::{FsObjectStore, ObjectStore};
use crate::config::schema::{MailTransportKind, StorageBackend};
use crate::config::CourierConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the object store named by `storage.backend`
pub fn create_object_store(config: &CourierConfig) -> Arc<dyn ObjectStore> {
    match config.storage.backend {
        StorageBackend::Filesystem => {
            tracing::info!(root = %config.storage.root, "Creating filesystem object store");
            Arc::new(FsObjectStore::from_config(&config.storage))
        }
    }
}

/// Create the mail transport named by `mail.transport`
///
/// Dry runs always get a [`RecordingTransport`], whatever is configured.
///
/// # Errors
///
/// Returns an error if the relay or SMTP client cannot be built.
pub fn create_mail_transport(config: &CourierConfig) -> Result<Arc<dyn MailTransport>> {
    if config.application.dry_run {
        tracing::info!("Dry run: notifications are recorded, not delivered");
        return Ok(Arc::new(RecordingTransport::new()));
    }

    match config.mail.transport {
        MailTransportKind::Relay => {
            tracing::info!(endpoint = %config.mail.relay_endpoint, "Creating mail relay transport");
            Ok(Arc::new(RelayTransport::new(&config.mail)?))
        }
        MailTransportKind::Smtp => {
            tracing::info!(
                host = %config.mail.smtp_host,
                port = config.mail.smtp_port,
                "Creating SMTP transport"
            );
            Ok(Arc::new(SmtpTransport::new(&config.mail)?))
        }
        MailTransportKind::Recording => Ok(Arc::new(RecordingTransport::new())),
    }
}
