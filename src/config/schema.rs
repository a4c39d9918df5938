//! Configuration schema types
//!
//! Maps the provisioning TOML file onto typed sections. Role and vendor stay
//! strings here so that an unknown value surfaces as the tagged
//! [`ProvisionError::InvalidRole`] / [`ProvisionError::InvalidVendor`] from
//! [`ProvisionConfig::validate`] instead of an opaque TOML parse error.

use crate::domain::errors::ProvisionError;
use crate::domain::result::Result;
use crate::domain::{ConfigurationTree, DatabaseVendor, PlatformFamily, Role};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Zabbix role, version and base configuration tree
    #[serde(default)]
    pub zabbix: ZabbixConfig,

    /// Backing database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Credential store location
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProvisionConfig {
    /// Validates the configuration
    ///
    /// Role is checked first, then vendors, so an invalid role is reported
    /// before anything else.
    ///
    /// # Errors
    ///
    /// Returns the tagged error for role/vendor problems and
    /// [`ProvisionError::Validation`] for everything else.
    pub fn validate(&self) -> Result<()> {
        let role = self.role()?;
        self.vendor()?;
        if role == Role::Proxy {
            self.proxy_store()?;
        }

        self.application.validate()?;
        self.zabbix.validate()?;
        self.database.validate()?;
        self.credentials.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Parsed role
    pub fn role(&self) -> Result<Role> {
        Role::parse(&self.zabbix.role)
    }

    /// Parsed primary database vendor
    pub fn vendor(&self) -> Result<DatabaseVendor> {
        DatabaseVendor::parse(&self.database.vendor, "database.vendor")
    }

    /// Parsed vendor of the proxy's local store
    pub fn proxy_store(&self) -> Result<DatabaseVendor> {
        DatabaseVendor::parse(&self.database.proxy_store, "database.proxy_store")
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (resolve and build, but change nothing on the host)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ProvisionError::Validation(format!(
                "Invalid application.log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Zabbix instance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZabbixConfig {
    /// `server` or `proxy`
    #[serde(default)]
    pub role: String,

    /// Installed Zabbix version (only `major.minor` is used)
    #[serde(default)]
    pub version: String,

    /// Service name; defaults to `zabbix-server` / `zabbix-proxy` by role
    #[serde(default)]
    pub service: Option<String>,

    /// Directory the daemon configuration file is rendered into
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Directory for Zabbix templates, created when missing
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// `auto`, `debian` or `rhel`
    #[serde(default = "default_platform_family")]
    pub platform_family: String,

    /// Base configuration tree rendered into the daemon configuration file
    #[serde(default)]
    pub config: ConfigurationTree,
}

impl ZabbixConfig {
    fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ProvisionError::Validation(
                "zabbix.version cannot be empty".to_string(),
            ));
        }

        if let Some(service) = &self.service {
            if service.trim().is_empty() {
                return Err(ProvisionError::Validation(
                    "zabbix.service cannot be empty when set".to_string(),
                ));
            }
        }

        if !self.config_dir.is_absolute() {
            return Err(ProvisionError::Validation(format!(
                "zabbix.config_dir must be an absolute path, got '{}'",
                self.config_dir.display()
            )));
        }

        self.platform_family()?;
        Ok(())
    }

    /// Platform family override, `None` for auto-detection
    pub fn platform_family(&self) -> Result<Option<PlatformFamily>> {
        match self.platform_family.to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(None),
            "debian" => Ok(Some(PlatformFamily::Debian)),
            "rhel" => Ok(Some(PlatformFamily::Rhel)),
            other => Err(ProvisionError::Validation(format!(
                "Invalid zabbix.platform_family '{other}'. Must be one of: auto, debian, rhel"
            ))),
        }
    }
}

impl Default for ZabbixConfig {
    fn default() -> Self {
        Self {
            role: String::new(),
            version: String::new(),
            service: None,
            config_dir: default_config_dir(),
            templates_dir: default_templates_dir(),
            platform_family: default_platform_family(),
            config: ConfigurationTree::default(),
        }
    }
}

/// Backing database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Primary database vendor (`postgresql` or `mysql`)
    #[serde(default)]
    pub vendor: String,

    /// Primary database name
    #[serde(default = "default_database_name")]
    pub name: String,

    /// Vendor of the proxy's local store
    #[serde(default = "default_proxy_store")]
    pub proxy_store: String,

    /// PostgreSQL settings
    #[serde(default)]
    pub postgresql: PostgreSQLConfig,

    /// MySQL settings (also used for the proxy's local store)
    #[serde(default)]
    pub mysql: MySQLConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            vendor: String::new(),
            name: default_database_name(),
            proxy_store: default_proxy_store(),
            postgresql: PostgreSQLConfig::default(),
            mysql: MySQLConfig::default(),
        }
    }
}

impl DatabaseConfig {
    fn validate(&self) -> Result<()> {
        if !is_identifier(&self.name) {
            return Err(ProvisionError::Validation(format!(
                "database.name '{}' must match [A-Za-z0-9_]+",
                self.name
            )));
        }
        self.postgresql.validate()?;
        self.mysql.validate()?;
        Ok(())
    }

    /// Configuration path of a vendor's credential group
    pub fn credential_group_path(vendor: DatabaseVendor) -> String {
        format!("database.{}.credential_group", vendor.as_str())
    }

    /// Credential group name configured for a vendor
    pub fn credential_group(&self, vendor: DatabaseVendor) -> Option<&str> {
        let group = match vendor {
            DatabaseVendor::PostgreSQL => self.postgresql.credential_group.as_deref(),
            DatabaseVendor::MySQL => self.mysql.credential_group.as_deref(),
        };
        group.filter(|g| !g.trim().is_empty())
    }

    /// Listen address and port configured for a vendor
    pub fn endpoint(&self, vendor: DatabaseVendor) -> (&str, u16) {
        match vendor {
            DatabaseVendor::PostgreSQL => (&self.postgresql.listen_addresses, self.postgresql.port),
            DatabaseVendor::MySQL => (&self.mysql.listen_addresses, self.mysql.port),
        }
    }

    /// Schema files configured for a vendor
    pub fn schema_files(&self, vendor: DatabaseVendor) -> &[PathBuf] {
        match vendor {
            DatabaseVendor::PostgreSQL => &self.postgresql.schema_files,
            DatabaseVendor::MySQL => &self.mysql.schema_files,
        }
    }
}

/// PostgreSQL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgreSQLConfig {
    /// Address the server listens on
    #[serde(default = "default_listen_addresses")]
    pub listen_addresses: String,

    /// Port
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Credential group holding the database user
    #[serde(default)]
    pub credential_group: Option<String>,

    /// Database to connect to while creating the Zabbix database
    #[serde(default = "default_pg_maintenance_database")]
    pub maintenance_database: String,

    /// SQL files imported, in order, into an empty Zabbix database
    #[serde(default)]
    pub schema_files: Vec<PathBuf>,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl PostgreSQLConfig {
    fn validate(&self) -> Result<()> {
        if self.listen_addresses.trim().is_empty() {
            return Err(ProvisionError::Validation(
                "database.postgresql.listen_addresses cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ProvisionError::Validation(
                "database.postgresql.port must be > 0".to_string(),
            ));
        }
        if !is_identifier(&self.maintenance_database) {
            return Err(ProvisionError::Validation(format!(
                "database.postgresql.maintenance_database '{}' must match [A-Za-z0-9_]+",
                self.maintenance_database
            )));
        }
        Ok(())
    }
}

impl Default for PostgreSQLConfig {
    fn default() -> Self {
        Self {
            listen_addresses: default_listen_addresses(),
            port: default_pg_port(),
            credential_group: None,
            maintenance_database: default_pg_maintenance_database(),
            schema_files: Vec::new(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

/// MySQL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySQLConfig {
    /// Address the server listens on
    #[serde(default = "default_listen_addresses")]
    pub listen_addresses: String,

    /// Port
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Credential group holding the administrative and application users
    #[serde(default)]
    pub credential_group: Option<String>,

    /// Database created for a proxy's local store
    #[serde(default = "default_proxy_database_name")]
    pub database_name: String,

    /// Character set of the created database
    #[serde(default = "default_character_set")]
    pub character_set: String,

    /// Collation of the created database
    #[serde(default = "default_collate")]
    pub collate: String,

    /// Application user the daemon connects as
    #[serde(default = "default_mysql_db_user")]
    pub db_user: String,

    /// Administrative user; never granted, only connects
    #[serde(default = "default_mysql_admin_user")]
    pub admin_user: String,

    /// Path or name of the `mysql` client binary
    #[serde(default = "default_mysql_client")]
    pub client_binary: String,

    /// SQL files imported, in order, into an empty Zabbix database
    #[serde(default)]
    pub schema_files: Vec<PathBuf>,
}

impl MySQLConfig {
    fn validate(&self) -> Result<()> {
        if self.listen_addresses.trim().is_empty() {
            return Err(ProvisionError::Validation(
                "database.mysql.listen_addresses cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ProvisionError::Validation(
                "database.mysql.port must be > 0".to_string(),
            ));
        }
        for (path, value) in [
            ("database.mysql.database_name", &self.database_name),
            ("database.mysql.character_set", &self.character_set),
            ("database.mysql.collate", &self.collate),
        ] {
            if !is_identifier(value) {
                return Err(ProvisionError::Validation(format!(
                    "{path} '{value}' must match [A-Za-z0-9_]+"
                )));
            }
        }
        if self.db_user.trim().is_empty() || self.admin_user.trim().is_empty() {
            return Err(ProvisionError::Validation(
                "database.mysql.db_user and database.mysql.admin_user cannot be empty"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MySQLConfig {
    fn default() -> Self {
        Self {
            listen_addresses: default_listen_addresses(),
            port: default_mysql_port(),
            credential_group: None,
            database_name: default_proxy_database_name(),
            character_set: default_character_set(),
            collate: default_collate(),
            db_user: default_mysql_db_user(),
            admin_user: default_mysql_admin_user(),
            client_binary: default_mysql_client(),
            schema_files: Vec::new(),
        }
    }
}

/// Credential store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Root directory of the data bags (`<root>/<group>/<item>.json`)
    #[serde(default = "default_data_bag_path")]
    pub data_bag_path: PathBuf,

    /// Item holding the users of a group
    #[serde(default = "default_data_bag_item")]
    pub item: String,
}

impl CredentialsConfig {
    fn validate(&self) -> Result<()> {
        if self.item.trim().is_empty() || self.item.contains('/') {
            return Err(ProvisionError::Validation(format!(
                "credentials.item '{}' must be a plain file stem",
                self.item
            )));
        }
        Ok(())
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            data_bag_path: default_data_bag_path(),
            item: default_data_bag_item(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(ProvisionError::Validation(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            )));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err(ProvisionError::Validation(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// Whether `value` is safe to splice into SQL as an identifier or keyword
pub fn is_identifier(value: &str) -> bool {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static regex is valid"))
        .is_match(value)
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("/etc/zabbix")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("/etc/zabbix/templates")
}

fn default_platform_family() -> String {
    "auto".to_string()
}

fn default_database_name() -> String {
    "zabbix".to_string()
}

fn default_proxy_store() -> String {
    "mysql".to_string()
}

fn default_listen_addresses() -> String {
    "127.0.0.1".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_maintenance_database() -> String {
    "postgres".to_string()
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_proxy_database_name() -> String {
    "zabbix_proxy".to_string()
}

fn default_character_set() -> String {
    "utf8".to_string()
}

fn default_collate() -> String {
    "utf8_bin".to_string()
}

fn default_mysql_db_user() -> String {
    "zabbix".to_string()
}

fn default_mysql_admin_user() -> String {
    "root".to_string()
}

fn default_mysql_client() -> String {
    "mysql".to_string()
}

fn default_data_bag_path() -> PathBuf {
    PathBuf::from("/etc/zbx-provision/data_bags")
}

fn default_data_bag_item() -> String {
    "users".to_string()
}

fn default_local_path() -> String {
    "/var/log/zbx-provision".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
