// Courier - Policy Document Fulfillment Pipeline
// Copyright (c) 2025 Courier Contributors
// Licensed under the MIT License

//! # Courier - policy document fulfillment
//!
//! Courier reacts to newly uploaded policy documents. For every
//! `unprocessed/<id>.pdf` object it reads the companion
//! `unprocessed/<id>.json` metadata, mails the PDF to the policy holder and
//! then moves every `unprocessed/<id>.*` object to `processed/`.
//!
//! ## Architecture
//!
//! Courier follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (key parsing, fetch, notify, relocate, pipeline)
//! - [`adapters`] - External integrations (object storage, mail transports)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier::config::load_config;
//! use courier::core::pipeline::PipelineCoordinator;
//! use courier::domain::{ObjectReference, TriggerEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("courier.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = PipelineCoordinator::from_config(&config, shutdown_rx)?;
//!
//!     let event = TriggerEvent::from_references([ObjectReference::new(
//!         "policies",
//!         "unprocessed/1234567890.pdf",
//!     )]);
//!     println!("{}", coordinator.handle_event(&event).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], whose error type is
//! [`domain::CourierError`]. Storage and mail failures are wrapped via `?`:
//!
//! ```rust,no_run
//! use courier::domain::CourierError;
//!
//! fn example() -> Result<(), CourierError> {
//!     let config = courier::config::load_config("courier.toml")?;
//!     println!("{}", config.storage.root);
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Courier logs through `tracing`; each unit of work runs inside a `unit`
//! span carrying the invocation id, bucket and key. See [`logging`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
