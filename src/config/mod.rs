//! Configuration management.
//!
//! # Overview
//!
//! Provisioning is driven by one TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ZBX_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation that reports role and vendor problems as tagged errors
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level, dry run
//! - [`ZabbixConfig`] - Role, version, paths, and the base configuration tree
//! - [`DatabaseConfig`] - Vendor selection, [`PostgreSQLConfig`], [`MySQLConfig`]
//! - [`CredentialsConfig`] - Data bag location
//! - [`LoggingConfig`] - File logging
//!
//! # Example Configuration
//!
//! ```toml
//! [zabbix]
//! role = "proxy"
//! version = "4.0"
//!
//! [zabbix.config]
//! Timeout = 4
//!
//! [zabbix.config.cache]
//! CacheSize = "32M"
//!
//! [database]
//! vendor = "mysql"
//!
//! [database.mysql]
//! credential_group = "zabbix-mysql"
//! database_name = "zabbix_proxy"
//!
//! [credentials]
//! data_bag_path = "/etc/zbx-provision/data_bags"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_unvalidated};
pub use schema::{
    ApplicationConfig, CredentialsConfig, DatabaseConfig, LoggingConfig, MySQLConfig,
    PostgreSQLConfig, ProvisionConfig, ZabbixConfig,
};
pub use secret::{redact_all, secret_string, SecretString, SecretValue, REDACTED};
