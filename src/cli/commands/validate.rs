//! Validate config command implementation

use crate::config::load_config;
use crate::config::schema::MailTransportKind;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Storage Root: {}", config.storage.root);
        println!(
            "  Areas: {} -> {}",
            config.storage.unprocessed_prefix, config.storage.processed_prefix
        );
        match config.mail.transport {
            MailTransportKind::Relay => {
                println!("  Mail Transport: relay");
                println!("  Relay Endpoint: {}", config.mail.relay_endpoint);
                println!(
                    "  Relay Credentials: {}",
                    if config.mail.username.is_some() {
                        "configured"
                    } else {
                        "none"
                    }
                );
            }
            MailTransportKind::Smtp => {
                println!("  Mail Transport: smtp");
                println!(
                    "  SMTP Server: {}:{}{}",
                    config.mail.smtp_host,
                    config.mail.smtp_port,
                    if config.mail.smtp_starttls {
                        " (STARTTLS)"
                    } else {
                        ""
                    }
                );
                println!(
                    "  SMTP Credentials: {}",
                    if config.mail.username.is_some() {
                        "configured"
                    } else {
                        "none"
                    }
                );
            }
            MailTransportKind::Recording => println!("  Mail Transport: recording"),
        }
        println!("  Sender Name: {}", config.mail.sender_name);
        println!("  Subject Prefix: {}", config.mail.subject_prefix);
        println!(
            "  Max Concurrent Units: {}",
            config.pipeline.max_concurrent_units
        );
        println!(
            "  Trigger Extensions: {}",
            config.pipeline.trigger_extensions.join(", ")
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mail]\ntransport = \"recording\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_validate_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mail]\ntransport = \"relay\"\nrelay_endpoint = \"ftp://x\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
