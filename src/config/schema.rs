//! Configuration schema types
//!
//! This module defines the configuration structure for Courier.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Object storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Buckets are directories under `storage.root`
    #[default]
    Filesystem,
}

/// Mail transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailTransportKind {
    /// HTTP mail relay
    #[default]
    Relay,
    /// SMTP submission server
    Smtp,
    /// Keep messages in memory and log them instead of sending
    Recording,
}

/// Main Courier configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Object storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Notification mail settings
    pub mail: MailConfig,

    /// Pipeline orchestration settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CourierConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.storage.validate()?;
        self.mail.validate()?;
        self.pipeline.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (compose but don't send mail, don't move objects)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory holding one directory per bucket
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Key prefix of objects awaiting processing
    #[serde(default = "default_unprocessed_prefix")]
    pub unprocessed_prefix: String,

    /// Key prefix objects are moved to once processed
    #[serde(default = "default_processed_prefix")]
    pub processed_prefix: String,

    /// Upper bound for a single storage call
    #[serde(default = "default_timeout_seconds")]
    pub operation_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            unprocessed_prefix: default_unprocessed_prefix(),
            processed_prefix: default_processed_prefix(),
            operation_timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("storage.root cannot be empty".to_string());
        }

        for (name, prefix) in [
            ("unprocessed_prefix", &self.unprocessed_prefix),
            ("processed_prefix", &self.processed_prefix),
        ] {
            if prefix.is_empty() {
                return Err(format!("storage.{name} cannot be empty"));
            }
            if prefix.contains('/') || prefix.contains('.') {
                return Err(format!(
                    "storage.{name} '{prefix}' must be a single segment without '/' or '.'"
                ));
            }
        }

        if self.unprocessed_prefix == self.processed_prefix {
            return Err(
                "storage.unprocessed_prefix and storage.processed_prefix must differ".to_string(),
            );
        }

        if self.operation_timeout_seconds == 0 {
            return Err("storage.operation_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Notification mail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Transport used to deliver notifications
    #[serde(default)]
    pub transport: MailTransportKind,

    /// Outbound relay endpoint (required for the relay transport)
    #[serde(default)]
    pub relay_endpoint: String,

    /// SMTP server host (required for the smtp transport)
    #[serde(default)]
    pub smtp_host: String,

    /// SMTP submission port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Upgrade the SMTP connection with STARTTLS
    #[serde(default = "default_smtp_starttls")]
    pub smtp_starttls: bool,

    /// Relay or SMTP username (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Relay or SMTP password (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Display name placed in front of the sender address
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Subject text preceding the policy number
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Body template; `{name}` and `{policy_number}` are substituted
    #[serde(default = "default_body_template")]
    pub body_template: String,

    /// Relay request or SMTP command timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransportKind::default(),
            relay_endpoint: String::new(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_starttls: default_smtp_starttls(),
            username: None,
            password: None,
            sender_name: default_sender_name(),
            subject_prefix: default_subject_prefix(),
            body_template: default_body_template(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl MailConfig {
    fn validate(&self) -> Result<(), String> {
        if self.transport == MailTransportKind::Relay {
            if self.relay_endpoint.trim().is_empty() {
                return Err("mail.relay_endpoint is required for the relay transport".to_string());
            }
            let parsed = url::Url::parse(&self.relay_endpoint).map_err(|e| {
                format!("Invalid mail.relay_endpoint '{}': {e}", self.relay_endpoint)
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!(
                    "mail.relay_endpoint must use http or https, got '{}'",
                    parsed.scheme()
                ));
            }
        }

        if self.transport == MailTransportKind::Smtp {
            if self.smtp_host.trim().is_empty() {
                return Err("mail.smtp_host is required for the smtp transport".to_string());
            }
            if self.smtp_port == 0 {
                return Err("mail.smtp_port must be > 0".to_string());
            }
        }

        if self.username.is_some() != self.password.is_some() {
            return Err("mail.username and mail.password must be set together".to_string());
        }

        if self.sender_name.trim().is_empty() {
            return Err("mail.sender_name cannot be empty".to_string());
        }

        if !self.body_template.contains("{name}") {
            return Err("mail.body_template must contain the {name} placeholder".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("mail.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Pipeline orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Units of one batch processed at the same time
    #[serde(default = "default_max_concurrent_units")]
    pub max_concurrent_units: usize,

    /// Key extensions that start a unit of work; other keys are skipped
    #[serde(default = "default_trigger_extensions")]
    pub trigger_extensions: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_units: default_max_concurrent_units(),
            trigger_extensions: default_trigger_extensions(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_units == 0 {
            return Err("pipeline.max_concurrent_units must be > 0".to_string());
        }
        if self.trigger_extensions.is_empty() {
            return Err("pipeline.trigger_extensions cannot be empty".to_string());
        }
        for ext in &self.trigger_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(format!(
                    "Invalid trigger extension '{ext}'. Extensions start with '.', e.g. \".pdf\""
                ));
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local logging is enabled".to_string());
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_storage_root() -> String {
    "./buckets".to_string()
}

fn default_unprocessed_prefix() -> String {
    "unprocessed".to_string()
}

fn default_processed_prefix() -> String {
    "processed".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_starttls() -> bool {
    true
}

fn default_sender_name() -> String {
    "Customer Service".to_string()
}

fn default_subject_prefix() -> String {
    "Your Policy Document".to_string()
}

fn default_body_template() -> String {
    "Hello {name},\n\n\
     Your policy has been issued and the policy document has been attached.\n\
     Please use policy number {policy_number} to make any enquiries.\n\n\
     Best Wishes,\n\
     Customer Service\n"
        .to_string()
}

fn default_max_concurrent_units() -> usize {
    4
}

fn default_trigger_extensions() -> Vec<String> {
    vec![".pdf".to_string()]
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
