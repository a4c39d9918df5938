//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for zbx-provision using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// zbx-provision - Zabbix server/proxy provisioning tool
#[derive(Parser, Debug)]
#[command(name = "zbx-provision")]
#[command(version, about, long_about = None)]
#[command(author = "zbx-provision Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "zbx-provision.toml", env = "ZBX_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ZBX_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install, bootstrap and configure the Zabbix server or proxy
    Provision(commands::provision::ProvisionArgs),

    /// Print the configuration file a provisioning run would render
    ShowConfig(commands::show_config::ShowConfigArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
