// zbx-provision - Zabbix server/proxy provisioning tool
// Copyright (c) 2025 zbx-provision Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use zbx_provision::cli::commands::EXIT_FATAL;
use zbx_provision::cli::{Cli, Commands};
use zbx_provision::config::{load_config_unvalidated, LoggingConfig};
use zbx_provision::logging::init_logging;

fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging settings come from the config file when it can be read; the
    // command itself reports any problem with it
    let file_config = load_config_unvalidated(&cli.config).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config
        .map(|c| c.logging)
        .unwrap_or_else(LoggingConfig::default);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "zbx-provision - Zabbix server/proxy provisioning tool"
    );

    // Provisioning is strictly sequential
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            eprintln!("Error: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    // Execute command and get exit code
    let exit_code = match runtime.block_on(execute_command(&cli)) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // The guard flushes the file appender; process::exit skips destructors
    drop(guard);
    drop(runtime);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Provision(args) => args.execute(&cli.config).await,
        Commands::ShowConfig(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
