//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Courier using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Courier - policy document fulfillment pipeline
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(version, about, long_about = None)]
#[command(author = "Courier Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "courier.toml", env = "COURIER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "COURIER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline for a trigger event or a single object
    Process(commands::process::ProcessArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// List correlation ids still waiting in the unprocessed area
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_process_event() {
        let cli = Cli::parse_from(["courier", "process", "--event", "event.json"]);
        assert_eq!(cli.config, "courier.toml");
        match cli.command {
            Commands::Process(args) => assert_eq!(args.event.as_deref(), Some("event.json")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_process_single_object() {
        let cli = Cli::parse_from([
            "courier",
            "process",
            "--bucket",
            "policies",
            "--key",
            "unprocessed/1234567890.pdf",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Process(args) => {
                assert_eq!(args.bucket.as_deref(), Some("policies"));
                assert_eq!(args.key.as_deref(), Some("unprocessed/1234567890.pdf"));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_process_event_conflicts_with_key() {
        let result = Cli::try_parse_from([
            "courier", "process", "--event", "e.json", "--bucket", "b", "--key", "k",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "courier",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "validate-config",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["courier", "status", "--bucket", "policies"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["courier", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
