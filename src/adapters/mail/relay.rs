//! HTTP mail relay transport
//!
//! Posts each message as JSON to a configured relay endpoint. The attachment
//! travels base64-encoded and the relay credentials go in a Basic
//! `Authorization` header.

use super::traits::{MailTransport, OutboundMessage};
use crate::config::MailConfig;
use crate::domain::{CourierError, MailError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    attachments: [RelayAttachment<'a>; 1],
}

#[derive(Serialize)]
struct RelayAttachment<'a> {
    filename: &'a str,
    content_type: &'a str,
    content: String,
}

/// Mail transport backed by an HTTP relay
pub struct RelayTransport {
    endpoint: String,
    client: Client,
    authorization: Option<String>,
}

impl RelayTransport {
    /// Create a relay transport from the mail configuration
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .build()
            .map_err(|e| {
                CourierError::Configuration(format!("Failed to build mail relay client: {e}"))
            })?;

        let authorization = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                let credentials = format!("{username}:{}", password.expose_secret().as_ref());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        };

        Ok(Self {
            endpoint: config.relay_endpoint.clone(),
            client,
            authorization,
        })
    }

    /// Relay endpoint messages are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MailTransport for RelayTransport {
    fn transport_name(&self) -> &'static str {
        "relay"
    }

    async fn send(&self, message: &OutboundMessage) -> std::result::Result<(), MailError> {
        let body = RelayRequest {
            from: message.from_header(),
            to: [&message.to_address],
            subject: &message.subject,
            text: &message.text_body,
            attachments: [RelayAttachment {
                filename: &message.attachment.filename,
                content_type: &message.attachment.content_type,
                content: general_purpose::STANDARD.encode(&message.attachment.content),
            }],
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(auth) = &self.authorization {
            request = request.header("Authorization", auth);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MailError::Timeout(e.to_string())
            } else {
                MailError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            "Mail relay accepted message"
        );
        Ok(())
    }
}
