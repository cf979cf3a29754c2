//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CourierConfig, MailTransportKind};
use super::secret::secret_string;
use crate::domain::errors::CourierError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CourierConfig
/// 4. Applies environment variable overrides (COURIER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`CourierError::Configuration`] if the file cannot be read or
/// parsed, a referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use courier::config::loader::load_config;
///
/// let config = load_config("courier.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CourierConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CourierError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CourierError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CourierConfig = toml::from_str(&contents)
        .map_err(|e| CourierError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CourierError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CourierError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CourierError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using COURIER_* prefix
///
/// Environment variables follow the pattern: COURIER_<SECTION>_<KEY>
/// For example: COURIER_MAIL_RELAY_ENDPOINT, COURIER_STORAGE_ROOT
fn apply_env_overrides(config: &mut CourierConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("COURIER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("COURIER_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Storage overrides
    if let Ok(val) = std::env::var("COURIER_STORAGE_ROOT") {
        config.storage.root = val;
    }
    if let Ok(val) = std::env::var("COURIER_STORAGE_UNPROCESSED_PREFIX") {
        config.storage.unprocessed_prefix = val;
    }
    if let Ok(val) = std::env::var("COURIER_STORAGE_PROCESSED_PREFIX") {
        config.storage.processed_prefix = val;
    }
    if let Ok(val) = std::env::var("COURIER_STORAGE_OPERATION_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.storage.operation_timeout_seconds = seconds;
        }
    }

    // Mail overrides
    if let Ok(val) = std::env::var("COURIER_MAIL_TRANSPORT") {
        config.mail.transport = match val.to_lowercase().as_str() {
            "relay" => MailTransportKind::Relay,
            "smtp" => MailTransportKind::Smtp,
            "recording" => MailTransportKind::Recording,
            other => {
                return Err(CourierError::Configuration(format!(
                    "Invalid COURIER_MAIL_TRANSPORT '{other}'. Must be one of: relay, smtp, recording"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("COURIER_MAIL_RELAY_ENDPOINT") {
        config.mail.relay_endpoint = val;
    }
    if let Ok(val) = std::env::var("COURIER_MAIL_SMTP_HOST") {
        config.mail.smtp_host = val;
    }
    if let Ok(val) = std::env::var("COURIER_MAIL_SMTP_PORT") {
        if let Ok(port) = val.parse() {
            config.mail.smtp_port = port;
        }
    }
    if let Ok(val) = std::env::var("COURIER_MAIL_USERNAME") {
        config.mail.username = Some(val);
    }
    if let Ok(val) = std::env::var("COURIER_MAIL_PASSWORD") {
        config.mail.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("COURIER_MAIL_SENDER_NAME") {
        config.mail.sender_name = val;
    }
    if let Ok(val) = std::env::var("COURIER_MAIL_SUBJECT_PREFIX") {
        config.mail.subject_prefix = val;
    }

    // Pipeline overrides
    if let Ok(val) = std::env::var("COURIER_PIPELINE_MAX_CONCURRENT_UNITS") {
        if let Ok(units) = val.parse() {
            config.pipeline.max_concurrent_units = units;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("COURIER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("COURIER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
