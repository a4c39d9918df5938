//! Provision command implementation
//!
//! This module implements the `provision` command: one full, idempotent
//! provisioning pass for the configured role.

use super::{exit_code, EXIT_OK};
use crate::adapters::create_collaborators;
use crate::config::{load_config, ProvisionConfig};
use crate::core::{Collaborators, ProvisionOrchestrator, ProvisionReport};
use crate::domain::PlatformFamily;
use clap::Args;

/// Arguments for the provision command
#[derive(Args, Debug, Default)]
pub struct ProvisionArgs {
    /// Dry run mode - resolve and render without changing the host
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProvisionArgs {
    /// Execute the provision command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting provision command");

        // Role and vendor are checked here, before platform detection
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code(&e));
            }
        };

        let (collaborators, platform) = match create_collaborators(&config) {
            Ok(c) => c,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to initialize collaborators");
                eprintln!("Failed to initialize provisioning: {e}");
                return Ok(exit_code(&e));
            }
        };

        self.run_with(&config, collaborators, platform).await
    }

    /// Runs the provisioning pass against explicit collaborators
    pub async fn run_with(
        &self,
        config: &ProvisionConfig,
        collaborators: Collaborators,
        platform: PlatformFamily,
    ) -> anyhow::Result<i32> {
        let dry_run = self.dry_run || config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - the host will not be changed");
            if !self.json {
                println!("🔍 DRY RUN MODE - No changes will be made to this host");
                println!();
            }
        }

        let orchestrator = ProvisionOrchestrator::new(collaborators, platform, dry_run)?;

        if !self.json {
            println!("🚀 Provisioning Zabbix {}...", config.zabbix.role);
            println!();
        }

        let report = match orchestrator.run(config).await {
            Ok(r) => r,
            Err(e) => {
                crate::log_error_with_context!(&e, "Provisioning failed");
                eprintln!("Provisioning failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        self.print_report(&report)?;
        Ok(EXIT_OK)
    }

    fn print_report(&self, report: &ProvisionReport) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        println!("📊 Provisioning Summary:");
        println!("{report}");
        if let Some(digest) = &report.config_digest {
            println!("Configuration SHA-256: {digest}");
        }
        println!(
            "Duration: {:.2}s",
            report.duration().num_milliseconds() as f64 / 1000.0
        );
        println!();
        if report.dry_run {
            println!("✅ Dry run completed");
        } else {
            println!("✅ Provisioning completed successfully!");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::EXIT_INPUT_ERROR;

    #[test]
    fn test_provision_args_defaults() {
        let args = ProvisionArgs::default();
        assert!(!args.dry_run);
        assert!(!args.json);
    }

    #[tokio::test]
    async fn test_missing_config_is_input_error() {
        let args = ProvisionArgs::default();
        let code = args.execute("/nonexistent/zbx-provision.toml").await.unwrap();
        assert_eq!(code, EXIT_INPUT_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_role_is_input_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("zbx-provision.toml");
        std::fs::write(
            &path,
            "[zabbix]\nrole = \"agent\"\nversion = \"4.0\"\n\n[database]\nvendor = \"mysql\"\n",
        )
        .unwrap();

        let args = ProvisionArgs::default();
        let code = args.execute(path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, EXIT_INPUT_ERROR);
    }
}
