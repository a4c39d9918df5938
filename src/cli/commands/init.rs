//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{exit_code, EXIT_FATAL, EXIT_INPUT_ERROR, EXIT_OK};
use crate::domain::Role;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "zbx-provision.toml")]
    pub output: String,

    /// Role the sample configures (server or proxy)
    #[arg(long, default_value = "server")]
    pub role: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, role = %self.role, "Initializing configuration file");

        println!("📝 Initializing zbx-provision configuration");
        println!();

        let role = match Role::parse(&self.role) {
            Ok(r) => r,
            Err(e) => {
                println!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_INPUT_ERROR);
        }

        match fs::write(&self.output, sample_config(role)) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create the credential data bags:");
                println!("     <data_bag_path>/<credential_group>/users.json");
                if role == Role::Proxy {
                    println!("     The MySQL group needs a 'root' user for the local store bootstrap");
                }
                println!("  3. Validate configuration: zbx-provision validate-config");
                println!("  4. Preview the rendered file: zbx-provision show-config");
                println!("  5. Provision: zbx-provision provision");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

/// Sample configuration for a role
pub fn sample_config(role: Role) -> String {
    let (vendor, database) = match role {
        Role::Server => ("postgresql", SERVER_DATABASE),
        Role::Proxy => ("mysql", PROXY_DATABASE),
    };

    format!(
        r#"# zbx-provision configuration
# Zabbix {role} provisioning

[application]
log_level = "info"
dry_run = false

[zabbix]
role = "{role}"
version = "4.0"
# service = "zabbix-{role}"
config_dir = "/etc/zabbix"
templates_dir = "/etc/zabbix/templates"
# auto | debian | rhel
platform_family = "auto"

# Base configuration tree. Top-level keys are rendered first, each table
# becomes a section. Keys the installed version no longer accepts are pruned.
[zabbix.config]
LogFile = "/var/log/zabbix/zabbix_{role}.log"
LogFileSize = 0
PidFile = "/run/zabbix/zabbix_{role}.pid"
Timeout = 4
AlertScriptsPath = "/usr/lib/zabbix/alertscripts"

[zabbix.config.cache]
CacheSize = "32M"
HistoryCacheSize = "16M"
HistoryIndexCacheSize = "4M"
TrendCacheSize = "4M"
ValueCacheSize = "8M"

[zabbix.config.workers]
StartPollers = 5
StartPingers = 1

[zabbix.config.hk]
HousekeepingFrequency = 1
MaxHousekeeperDelete = 5000

{database}
[credentials]
data_bag_path = "/etc/zbx-provision/data_bags"
item = "users"

[logging]
local_enabled = false
local_path = "/var/log/zbx-provision"
local_rotation = "daily"
"#,
        role = role,
        database = database.replace("{vendor}", vendor),
    )
}

const SERVER_DATABASE: &str = r#"[database]
vendor = "{vendor}"
name = "zabbix"

[database.postgresql]
listen_addresses = "127.0.0.1"
port = 5432
credential_group = "zabbix-postgresql"
maintenance_database = "postgres"
# schema_files = ["/usr/share/zabbix-server-pgsql/schema.sql"]
"#;

const PROXY_DATABASE: &str = r#"[database]
vendor = "{vendor}"
# Local store of the proxy; only mysql is bootstrapped
proxy_store = "mysql"

[database.mysql]
listen_addresses = "127.0.0.1"
port = 3306
credential_group = "zabbix-mysql"
database_name = "zabbix_proxy"
character_set = "utf8"
collate = "utf8_bin"
db_user = "zabbix"
admin_user = "root"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvisionConfig;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case(Role::Server ; "server sample")]
    #[test_case(Role::Proxy ; "proxy sample")]
    fn test_sample_config_is_valid(role: Role) {
        let config: ProvisionConfig = toml::from_str(&sample_config(role)).unwrap();
        config.validate().unwrap();
        assert_eq!(config.role().unwrap(), role);
        assert!(config.zabbix.config.section("cache").is_some());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("zbx-provision.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            role: "server".to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_INPUT_ERROR);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_init_writes_sample() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("zbx-provision.toml");

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            role: "proxy".to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_OK);
        assert!(fs::read_to_string(&output)
            .unwrap()
            .contains("role = \"proxy\""));
    }

    #[tokio::test]
    async fn test_init_rejects_unknown_role() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs {
            output: dir.path().join("x.toml").to_string_lossy().into_owned(),
            role: "agent".to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_INPUT_ERROR);
    }
}
