//! External system integrations for Courier.
//!
//! - [`storage`] - object storage (trait plus filesystem and in-memory stores)
//! - [`mail`] - mail transports (trait plus HTTP relay and recording transports)
//! - [`factory`] - builds the configured collaborators
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the pipeline can be
//! driven by in-memory collaborators in tests:
//!
//! ```rust
//! use courier::adapters::mail::RecordingTransport;
//! use courier::adapters::storage::MemoryObjectStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryObjectStore::new());
//! store.insert("B", "unprocessed/1234567890.pdf", b"%PDF-1.7".to_vec());
//! let transport = Arc::new(RecordingTransport::new());
//! # let _ = (store, transport);
//! ```

pub mod factory;
pub mod mail;
pub mod storage;

pub use factory::{create_mail_transport, create_object_store};
