// Courier - Policy Document Fulfillment Pipeline
// Copyright (c) 2025 Courier Contributors
// Licensed under the MIT License

use clap::Parser;
use courier::cli::{Cli, Commands};
use courier::config::{load_config, LoggingConfig};
use courier::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config file when it loads; commands report
    // configuration errors themselves
    let (config_log_level, logging_config) = match load_config(&cli.config) {
        Ok(config) => (Some(config.application.log_level), config.logging),
        Err(_) => (None, LoggingConfig::default()),
    };
    let log_level = cli
        .log_level
        .as_deref()
        .or(config_log_level.as_deref())
        .unwrap_or("info");
    let logging_guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Courier - Policy Document Fulfillment Pipeline"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), cancelling in-flight units...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, cancelling in-flight units...");
                }
            }
            eprintln!("\n⚠️  Shutdown signal received, abandoning in-flight units...");
            let _ = shutdown_tx.send(true);
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), cancelling in-flight units...");
                eprintln!("\n⚠️  Shutdown signal received, abandoning in-flight units...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors
    drop(logging_guard);
    process::exit(exit_code);
}

async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Process(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
