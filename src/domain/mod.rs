//! Domain models and types for Courier.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`CorrelationId`], [`ObjectReference`])
//! - **Metadata model** ([`FulfillmentMetadata`], [`Recipient`], [`PolicyRecord`])
//! - **Trigger events** ([`TriggerEvent`])
//! - **Error types** ([`CourierError`], [`StorageError`], [`MailError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CourierError>`]:
//!
//! ```rust
//! use courier::domain::{CourierError, ErrorKind, Result};
//!
//! fn example() -> Result<()> {
//!     Err(CourierError::MalformedKey("no-separator.pdf".to_string()))
//! }
//!
//! assert_eq!(example().unwrap_err().kind(), ErrorKind::MalformedKey);
//! ```

pub mod errors;
pub mod event;
pub mod ids;
pub mod metadata;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{CourierError, ErrorKind, MailError, StorageError};
pub use event::TriggerEvent;
pub use ids::{CorrelationId, ObjectReference};
pub use metadata::{FulfillmentMetadata, PolicyRecord, Recipient};
pub use result::Result;
