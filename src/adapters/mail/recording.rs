//! Recording mail transport
//!
//! Captures messages instead of delivering them. Dry runs use it so a
//! composed notification can be inspected in the logs; tests use it to
//! assert on what would have been sent.

use super::traits::{MailTransport, OutboundMessage};
use crate::domain::MailError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Transport that keeps every message in memory
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    rejection: Option<String>,
}

impl RecordingTransport {
    /// Transport that accepts every message
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that rejects every message with `reason`
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            rejection: Some(reason.into()),
        }
    }

    /// Messages accepted so far
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn transport_name(&self) -> &'static str {
        "recording"
    }

    fn delivers(&self) -> bool {
        false
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        if let Some(reason) = &self.rejection {
            return Err(MailError::Rejected {
                status: 554,
                message: reason.clone(),
            });
        }

        tracing::info!(
            from = %message.from_header(),
            to = %message.to_address,
            subject = %message.subject,
            attachment = %message.attachment.filename,
            attachment_bytes = message.attachment.content.len(),
            "Recorded notification (not delivered)"
        );

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mail::traits::Attachment;

    fn message(subject: &str) -> OutboundMessage {
        OutboundMessage {
            sender_display: "Courier".to_string(),
            from_address: "a@x.com".to_string(),
            to_address: "b@x.com".to_string(),
            subject: subject.to_string(),
            text_body: String::new(),
            attachment: Attachment {
                filename: "1".to_string(),
                content_type: "application/pdf".to_string(),
                content: vec![],
            },
        }
    }

    #[tokio::test]
    async fn test_records_messages_in_order() {
        let transport = RecordingTransport::new();
        transport.send(&message("first")).await.unwrap();
        transport.send(&message("second")).await.unwrap();

        let subjects: Vec<_> = transport
            .messages()
            .into_iter()
            .map(|m| m.subject)
            .collect();
        assert_eq!(subjects, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_rejecting_transport() {
        let transport = RecordingTransport::rejecting("relay down");
        let err = transport.send(&message("s")).await.unwrap_err();

        assert!(matches!(err, MailError::Rejected { message, .. } if message == "relay down"));
        assert!(transport.messages().is_empty());
    }
}
