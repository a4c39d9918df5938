//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the zbx-provision configuration file without touching the host.

use super::{exit_code, EXIT_FATAL, EXIT_OK};
use crate::config::load_config_unvalidated;
use crate::core::tables::{bootstrap_table, package_table, LocalStoreBootstrap};
use crate::core::validate_inputs;
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

        // Load configuration
        let config = match load_config_unvalidated(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_code(&e));
            }
        };

        let (bootstrap, packages) = match (bootstrap_table(), package_table()) {
            (Ok(b), Ok(p)) => (b, p),
            (Err(e), _) | (_, Err(e)) => {
                println!("❌ Internal lookup table is incomplete");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        // Validate configuration
        match validate_inputs(&config, &bootstrap) {
            Ok(inputs) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Role: {}", inputs.role);
                println!("  Zabbix Version: {}", inputs.version);
                println!("  Database Vendor: {}", inputs.vendor);
                println!("  Package: {}", packages.get(inputs.role, inputs.vendor));
                println!(
                    "  Database: {} ({})",
                    config.database.name,
                    format_endpoint(config.database.endpoint(inputs.vendor))
                );
                println!("  Credential Group: {}", inputs.primary_group);
                match (&inputs.local_store, &inputs.local_store_group) {
                    (LocalStoreBootstrap::MySql, Some(group)) => {
                        println!(
                            "  Local Store: MySQL database '{}' (credential group: {group})",
                            config.database.mysql.database_name
                        );
                    }
                    _ => println!("  Local Store: not bootstrapped"),
                }
                println!("  Config Directory: {}", config.zabbix.config_dir.display());
                println!(
                    "  Platform Family: {}",
                    config.zabbix.platform_family.as_str()
                );
                println!("  Log Level: {}", config.application.log_level);
                println!("  Dry Run: {}", config.application.dry_run);
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(exit_code(&e))
            }
        }
    }
}

fn format_endpoint((host, port): (&str, u16)) -> String {
    format!("{host}:{port}")
}
