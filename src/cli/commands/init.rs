//! Init command implementation
//!
//! Writes a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "courier.toml")]
    pub output: String,

    /// Include every option with explanations
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Courier configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your relay endpoint and storage root", self.output);
                println!("  2. Set COURIER_MAIL_USERNAME and COURIER_MAIL_PASSWORD (or use a .env file)");
                println!("  3. Validate configuration: courier validate-config");
                println!("  4. Process an object: courier process --bucket <bucket> --key unprocessed/<id>.pdf");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Courier Configuration File
# Policy document fulfillment pipeline

[application]
log_level = "info"
dry_run = false

[storage]
backend = "filesystem"
root = "./buckets"

[mail]
transport = "relay"
relay_endpoint = "https://mail-relay.example.com/v1/send"
username = "${COURIER_MAIL_USERNAME}"
password = "${COURIER_MAIL_PASSWORD}"
sender_name = "Customer Service"
subject_prefix = "Your Policy Document"

[pipeline]
max_concurrent_units = 4

[logging]
local_enabled = false
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Courier Configuration File
# Policy document fulfillment pipeline
#
# Every option is listed with its default. Values of the form ${VAR} are read
# from the environment (a .env file is honoured). Any option can also be
# overridden with COURIER_<SECTION>_<KEY>, e.g. COURIER_STORAGE_ROOT.

[application]
# trace | debug | info | warn | error
log_level = "info"

# Compose and log notifications without sending them; list relocations
# without moving anything
dry_run = false

[storage]
# Only "filesystem" is available: one directory per bucket under root
backend = "filesystem"
root = "./buckets"

# Areas inside each bucket (single path segments)
unprocessed_prefix = "unprocessed"
processed_prefix = "processed"

# Upper bound for a single storage call
operation_timeout_seconds = 30

[mail]
# relay     - JSON POST to an HTTP mail relay
# smtp      - SMTP submission server
# recording - keep messages in memory and log them (nothing is delivered)
transport = "relay"
relay_endpoint = "https://mail-relay.example.com/v1/send"

# Used by the smtp transport
# smtp_host = "smtp.example.com"
smtp_port = 587
smtp_starttls = true

# Credentials for the relay or the SMTP server; set both or neither
username = "${COURIER_MAIL_USERNAME}"
password = "${COURIER_MAIL_PASSWORD}"

# Shown as "<sender_name> <from address>"
sender_name = "Customer Service"

# Subject is "<subject_prefix> - <policy number>"
subject_prefix = "Your Policy Document"

# {name} is the policy holder, {policy_number} the policy number
body_template = """
Hello {name},

Your policy has been issued and the policy document has been attached.
Please use policy number {policy_number} to make any enquiries.

Best Wishes,
Customer Service
"""

timeout_seconds = 30

[pipeline]
# Units of one event processed at the same time
max_concurrent_units = 4

# Keys with any other extension are skipped
trigger_extensions = [".pdf"]

[logging]
# JSON lines written to <local_path>/courier.log.*
local_enabled = false
local_path = "./logs"

# daily | hourly
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CourierConfig;

    fn parse(content: &str) -> CourierConfig {
        let content = content
            .replace("${COURIER_MAIL_USERNAME}", "courier")
            .replace("${COURIER_MAIL_PASSWORD}", "secret");
        toml::from_str(&content).unwrap()
    }

    #[test]
    fn test_generated_configs_are_valid() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = parse(&content);
            assert!(config.validate().is_ok());
            assert_eq!(config.storage.unprocessed_prefix, "unprocessed");
        }
    }

    #[test]
    fn test_config_with_examples_template() {
        let config = parse(&InitArgs::generate_config_with_examples());
        assert!(config.mail.body_template.contains("{name}"));
        assert_eq!(config.pipeline.trigger_extensions, vec![".pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_init_writes_file_and_refuses_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("courier.toml");
        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(output.exists());
        assert_eq!(args.execute().await.unwrap(), 2);
    }
}
