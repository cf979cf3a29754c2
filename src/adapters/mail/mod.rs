//! Mail transport adapters
//!
//! - [`MailTransport`] - delivers a composed [`OutboundMessage`]
//! - [`RelayTransport`] - HTTP mail relay with Basic credentials
//! - [`SmtpTransport`] - SMTP submission with a MIME attachment
//! - [`RecordingTransport`] - captures messages (dry runs, tests)

pub mod recording;
pub mod relay;
pub mod smtp;
pub mod traits;

pub use recording::RecordingTransport;
pub use relay::RelayTransport;
pub use smtp::SmtpTransport;
pub use traits::{Attachment, MailTransport, OutboundMessage};
