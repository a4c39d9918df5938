//! Show config command implementation
//!
//! This module implements the `show-config` command, which prints the
//! configuration file a provisioning run would render. The database password
//! is masked.

use super::{exit_code, EXIT_OK};
use crate::adapters::credentials::DataBagStore;
use crate::adapters::render::format_conf;
use crate::config::load_config;
use crate::core::preview;
use clap::Args;
use std::sync::Arc;

/// Arguments for the show-config command
#[derive(Args, Debug, Default)]
pub struct ShowConfigArgs {
    /// Print the tree as TOML instead of the daemon's Key=Value format
    #[arg(long)]
    pub toml: bool,
}

impl ShowConfigArgs {
    /// Execute the show-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Rendering configuration preview");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code(&e));
            }
        };

        let store = Arc::new(DataBagStore::new(
            config.credentials.data_bag_path.clone(),
            config.credentials.item.clone(),
        ));

        let rendered = match preview(&config, store).await {
            Ok(r) => r,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to build configuration");
                eprintln!("Failed to build configuration: {e}");
                return Ok(exit_code(&e));
            }
        };

        let redacted = rendered.redacted();
        if self.toml {
            print!("{}", toml::to_string(redacted.as_table())?);
        } else {
            print!("{}", format_conf(&redacted).as_str());
        }
        Ok(EXIT_OK)
    }
}
