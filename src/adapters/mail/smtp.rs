//! SMTP transport
//!
//! Submits each message to an SMTP server as `multipart/mixed`: a plain-text
//! body followed by the attachment. The connection is upgraded with STARTTLS
//! unless `mail.smtp_starttls` is off.

use super::traits::{MailTransport, OutboundMessage};
use crate::config::MailConfig;
use crate::domain::{CourierError, MailError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Mail transport backed by an SMTP server
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    server: String,
}

impl SmtpTransport {
    /// Create an SMTP transport from the mail configuration
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Configuration`] if the STARTTLS client cannot
    /// be set up for `mail.smtp_host`.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let builder = if config.smtp_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(
                |e| {
                    CourierError::Configuration(format!(
                        "Invalid mail.smtp_host '{}': {e}",
                        config.smtp_host
                    ))
                },
            )?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
        };

        let mut builder = builder
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_seconds)));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().as_ref().to_string(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            server: format!("{}:{}", config.smtp_host, config.smtp_port),
        })
    }

    /// `host:port` of the SMTP server
    pub fn server(&self) -> &str {
        &self.server
    }
}

/// Render an [`OutboundMessage`] as a MIME message
///
/// # Errors
///
/// Returns [`MailError::InvalidMessage`] for unparsable addresses or content
/// types.
pub fn build_message(message: &OutboundMessage) -> std::result::Result<Message, MailError> {
    let from = Mailbox::new(
        Some(message.sender_display.clone()),
        parse_address(&message.from_address)?,
    );
    let to = Mailbox::new(None, parse_address(&message.to_address)?);
    let content_type = ContentType::parse(&message.attachment.content_type).map_err(|e| {
        MailError::InvalidMessage(format!(
            "invalid content type '{}': {e}",
            message.attachment.content_type
        ))
    })?;

    let attachment = MimeAttachment::new(message.attachment.filename.clone())
        .body(message.attachment.content.clone(), content_type);

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(message.text_body.clone()))
                .singlepart(attachment),
        )
        .map_err(|e| MailError::InvalidMessage(e.to_string()))
}

fn parse_address(address: &str) -> std::result::Result<Address, MailError> {
    address
        .parse()
        .map_err(|e| MailError::InvalidMessage(format!("invalid address '{address}': {e}")))
}

fn map_smtp_error(err: lettre::transport::smtp::Error) -> MailError {
    if err.is_timeout() {
        return MailError::Timeout(err.to_string());
    }
    match err.status() {
        Some(code) => MailError::Rejected {
            status: code.to_string().parse().unwrap_or_default(),
            message: err.to_string(),
        },
        None => MailError::ConnectionFailed(err.to_string()),
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn transport_name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &OutboundMessage) -> std::result::Result<(), MailError> {
        let email = build_message(message)?;

        let response = self.mailer.send(email).await.map_err(map_smtp_error)?;

        tracing::debug!(
            server = %self.server,
            code = %response.code(),
            "SMTP server accepted message"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mail::traits::Attachment;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    fn message() -> OutboundMessage {
        OutboundMessage {
            sender_display: "Kubesure".to_string(),
            from_address: "policies@insurer.example".to_string(),
            to_address: "holder@example.com".to_string(),
            subject: "Your Policy Document - 1234567890".to_string(),
            text_body: "Hello Asha".to_string(),
            attachment: Attachment {
                filename: "1234567890".to_string(),
                content_type: "application/pdf".to_string(),
                content: b"%PDF-1.7".to_vec(),
            },
        }
    }

    fn config(port: u16) -> MailConfig {
        MailConfig {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: port,
            smtp_starttls: false,
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    /// Minimal SMTP server for one session; returns the DATA payload
    async fn serve_session(listener: TcpListener, rcpt_reply: &'static str) -> String {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut data = String::new();
        let mut in_data = false;

        write.write_all(b"220 localhost ESMTP\r\n").await.unwrap();

        while let Ok(Some(line)) = lines.next_line().await {
            if in_data {
                if line == "." {
                    in_data = false;
                    if write.write_all(b"250 2.0.0 queued\r\n").await.is_err() {
                        break;
                    }
                } else {
                    data.push_str(&line);
                    data.push('\n');
                }
                continue;
            }

            let command = line.to_ascii_uppercase();
            let reply = if command.starts_with("EHLO") {
                "250-localhost\r\n250 8BITMIME\r\n"
            } else if command.starts_with("RCPT TO") {
                rcpt_reply
            } else if command == "DATA" {
                in_data = true;
                "354 end data with <CR><LF>.<CR><LF>\r\n"
            } else if command == "QUIT" {
                let _ = write.write_all(b"221 bye\r\n").await;
                break;
            } else {
                "250 ok\r\n"
            };
            if write.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
        }

        data
    }

    #[test]
    fn test_build_message_is_multipart_with_pdf() {
        let email = build_message(&message()).unwrap();
        let formatted = String::from_utf8(email.formatted()).unwrap();

        assert!(formatted.contains("From: Kubesure <policies@insurer.example>"));
        assert!(formatted.contains("To: holder@example.com"));
        assert!(formatted.contains("Subject: Your Policy Document - 1234567890"));
        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("Content-Type: application/pdf"));
        assert!(formatted.contains("filename=\"1234567890\""));
        assert!(formatted.contains("Hello Asha"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let mut bad = message();
        bad.to_address = "not an address".to_string();
        let err = build_message(&bad).unwrap_err();
        assert!(matches!(err, MailError::InvalidMessage(_)));
    }

    #[tokio::test]
    async fn test_send_delivers_to_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(serve_session(listener, "250 2.1.5 ok\r\n"));

        let transport = SmtpTransport::new(&config(port)).unwrap();
        assert_eq!(transport.server(), format!("127.0.0.1:{port}"));
        transport.send(&message()).await.unwrap();

        let data = server.await.unwrap();
        assert!(data.contains("Subject: Your Policy Document - 1234567890"));
        assert!(data.contains("Content-Type: application/pdf"));
        assert!(data.contains("filename=\"1234567890\""));
    }

    #[tokio::test]
    async fn test_send_reports_rejection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(serve_session(listener, "550 5.1.1 mailbox unavailable\r\n"));

        let transport = SmtpTransport::new(&config(port)).unwrap();
        let err = transport.send(&message()).await.unwrap_err();

        match err {
            MailError::Rejected { status, .. } => assert_eq!(status, 550),
            other => panic!("Expected Rejected error, got {other:?}"),
        }
        let _ = server.await;
    }

    #[tokio::test]
    async fn test_send_unreachable_server() {
        let transport = SmtpTransport::new(&config(1)).unwrap();
        let err = transport.send(&message()).await.unwrap_err();
        assert!(matches!(
            err,
            MailError::ConnectionFailed(_) | MailError::Timeout(_)
        ));
    }
}
