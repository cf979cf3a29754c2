//! Configuration management for Courier.
//!
//! Courier reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `COURIER_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use courier::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("courier.toml")?;
//! println!("Storage root: {}", config.storage.root);
//! println!("Relay: {}", config.mail.relay_endpoint);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`StorageConfig`] - backend, bucket root, key prefixes, call timeout
//! - [`MailConfig`] - transport, relay endpoint or SMTP server, credentials, message text
//! - [`PipelineConfig`] - batch concurrency, trigger extensions
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [storage]
//! root = "/srv/buckets"
//!
//! [mail]
//! relay_endpoint = "https://mail-relay.example.com/v1/messages"
//! username = "courier"
//! password = "${COURIER_RELAY_PASSWORD}"
//! sender_name = "Customer Service"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CourierConfig, LoggingConfig, MailConfig, MailTransportKind,
    PipelineConfig, StorageBackend, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
