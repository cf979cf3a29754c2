//! Mail transport abstraction

use crate::domain::MailError;
use async_trait::async_trait;

/// File attached to a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// A fully composed notification, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Display name shown in front of the sender address
    pub sender_display: String,
    pub from_address: String,
    pub to_address: String,
    pub subject: String,
    pub text_body: String,
    pub attachment: Attachment,
}

impl OutboundMessage {
    /// `From` header value, e.g. `Customer Service <a@x.com>`
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.sender_display, self.from_address)
    }
}

/// Delivers composed messages
///
/// A transport sends synchronously from the caller's point of view and owns
/// its own timeout. It never retries.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short transport name used in logs
    fn transport_name(&self) -> &'static str;

    /// Whether sent messages leave the process
    fn delivers(&self) -> bool {
        true
    }

    /// Deliver one message
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}
