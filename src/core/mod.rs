//! Core business logic for Courier.
//!
//! # Modules
//!
//! - [`keys`] - object key parsing and bucket layout
//! - [`fetch`] - artifact and metadata retrieval
//! - [`notify`] - notification composition and dispatch
//! - [`relocate`] - moving a processed set to the processed area
//! - [`pipeline`] - per-unit stage machine and batch coordination
//!
//! # Workflow
//!
//! For each object reference in a trigger event:
//!
//! 1. **Parse**: derive the correlation id from the key
//! 2. **Fetch artifact**: read the triggering PDF
//! 3. **Fetch metadata**: read and decode `<unprocessed>/<id>.json`
//! 4. **Notify**: mail the PDF to the recipient
//! 5. **Relocate**: move every `<unprocessed>/<id>.*` object to the processed area
//!
//! A failing stage ends the unit; later stages never run for it.
//!
//! # Example
//!
//! ```rust
//! use courier::adapters::mail::RecordingTransport;
//! use courier::adapters::storage::MemoryObjectStore;
//! use courier::config::{CourierConfig, MailConfig};
//! use courier::core::pipeline::PipelineCoordinator;
//! use courier::domain::ObjectReference;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = CourierConfig {
//!     application: Default::default(),
//!     storage: Default::default(),
//!     mail: MailConfig::default(),
//!     pipeline: Default::default(),
//!     logging: Default::default(),
//! };
//! let store = Arc::new(MemoryObjectStore::new());
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator =
//!     PipelineCoordinator::new(&config, store, Arc::new(RecordingTransport::new()), shutdown_rx);
//!
//! let summary = coordinator
//!     .process_batch(vec![ObjectReference::new("policies", "unprocessed/1234567890.pdf")])
//!     .await;
//! println!("Failed: {}", summary.failed());
//! # }
//! ```

pub mod fetch;
pub mod keys;
pub mod notify;
pub mod pipeline;
pub mod relocate;
