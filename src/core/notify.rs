//! Notification composition and dispatch

use crate::adapters::mail::{Attachment, MailTransport, OutboundMessage};
use crate::config::MailConfig;
use crate::core::fetch::ArtifactBytes;
use crate::domain::{FulfillmentMetadata, Result};
use std::sync::Arc;

/// Content type of every attachment
pub const ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";

/// Configured wording of a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub sender_name: String,
    pub subject_prefix: String,
    pub body_template: String,
}

impl MessageTemplate {
    pub fn from_config(config: &MailConfig) -> Self {
        Self {
            sender_name: config.sender_name.clone(),
            subject_prefix: config.subject_prefix.clone(),
            body_template: config.body_template.clone(),
        }
    }

    /// `"<prefix> - <policy_number>"`, or just the number without a prefix
    pub fn subject(&self, policy_number: &str) -> String {
        if self.subject_prefix.trim().is_empty() {
            policy_number.to_string()
        } else {
            format!("{} - {policy_number}", self.subject_prefix)
        }
    }

    /// Body with `{name}` and `{policy_number}` substituted
    ///
    /// Substitution is a single pass over the template, so placeholders
    /// inside the substituted values are left as written.
    pub fn body(&self, holder_name: &str, policy_number: &str) -> String {
        let mut body = String::with_capacity(self.body_template.len() + holder_name.len());
        let mut rest = self.body_template.as_str();

        while let Some(start) = rest.find('{') {
            body.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{name}") {
                body.push_str(holder_name);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{policy_number}") {
                body.push_str(policy_number);
                rest = after;
            } else {
                body.push('{');
                rest = &tail[1..];
            }
        }

        body.push_str(rest);
        body
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::from_config(&MailConfig::default())
    }
}

/// Sends the artifact to the recipient named in the metadata
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    template: MessageTemplate,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>, template: MessageTemplate) -> Self {
        Self {
            transport,
            template,
        }
    }

    /// Build the message without sending it
    ///
    /// The attachment is named after the policy number digits, with no
    /// extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier::adapters::mail::RecordingTransport;
    /// use courier::core::fetch::ArtifactBytes;
    /// use courier::core::notify::{MessageTemplate, Notifier};
    /// use courier::domain::FulfillmentMetadata;
    /// use std::sync::Arc;
    ///
    /// let metadata = FulfillmentMetadata::from_json_slice(br#"{
    ///     "email": {"from": "a@insurer.example", "to": "b@example.com"},
    ///     "data": {"name": "Jane", "policyNumber": 42}
    /// }"#).unwrap();
    /// let notifier = Notifier::new(Arc::new(RecordingTransport::new()), MessageTemplate::default());
    ///
    /// let message = notifier.compose(&metadata, ArtifactBytes::new(vec![1, 2, 3]));
    /// assert!(message.subject.ends_with("42"));
    /// assert_eq!(message.attachment.filename, "42");
    /// ```
    pub fn compose(&self, metadata: &FulfillmentMetadata, artifact: ArtifactBytes) -> OutboundMessage {
        let policy_number = metadata.policy_number();

        OutboundMessage {
            sender_display: self.template.sender_name.clone(),
            from_address: metadata.recipient.from_address.clone(),
            to_address: metadata.recipient.to_address.clone(),
            subject: self.template.subject(&policy_number),
            text_body: self
                .template
                .body(&metadata.record.holder_name, &policy_number),
            attachment: Attachment {
                filename: policy_number,
                content_type: ATTACHMENT_CONTENT_TYPE.to_string(),
                content: artifact.into_inner(),
            },
        }
    }

    /// Compose and deliver; consumes the artifact
    ///
    /// # Errors
    ///
    /// Transport failures come back as
    /// [`CourierError::Mail`](crate::domain::CourierError::Mail). Nothing is
    /// retried.
    pub async fn notify(&self, metadata: &FulfillmentMetadata, artifact: ArtifactBytes) -> Result<()> {
        let message = self.compose(metadata, artifact);

        tracing::debug!(
            transport = self.transport.transport_name(),
            to = %message.to_address,
            subject = %message.subject,
            attachment_bytes = message.attachment.content.len(),
            "Sending notification"
        );

        self.transport.send(&message).await?;

        tracing::info!(
            to = %message.to_address,
            policy_number = %message.attachment.filename,
            "Notification sent"
        );
        Ok(())
    }
}
