//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ProvisionConfig;
use crate::domain::errors::ProvisionError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ProvisionConfig
/// 4. Applies environment variable overrides (ZBX_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ProvisionError::Configuration`] when the file cannot be read or
/// parsed, and the tagged validation error (for example
/// [`ProvisionError::InvalidRole`]) when validation fails.
///
/// # Examples
///
/// ```no_run
/// use zbx_provision::config::loader::load_config;
///
/// let config = load_config("zbx-provision.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ProvisionConfig> {
    let config = load_config_unvalidated(path)?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration without validating it
///
/// `validate-config` uses this to report a file that cannot be parsed
/// separately from one whose values are invalid.
pub fn load_config_unvalidated(path: impl AsRef<Path>) -> Result<ProvisionConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ProvisionError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ProvisionError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ProvisionConfig = toml::from_str(&contents)
        .map_err(|e| ProvisionError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ProvisionError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Comments may mention ${VARS} that are not meant to be set
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ProvisionError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using ZBX_* prefix
///
/// Environment variables follow the pattern: ZBX_<SECTION>_<KEY>
/// For example: ZBX_ZABBIX_ROLE, ZBX_DATABASE_VENDOR
fn apply_env_overrides(config: &mut ProvisionConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("ZBX_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("ZBX_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Zabbix overrides
    if let Ok(val) = std::env::var("ZBX_ZABBIX_ROLE") {
        config.zabbix.role = val;
    }
    if let Ok(val) = std::env::var("ZBX_ZABBIX_VERSION") {
        config.zabbix.version = val;
    }
    if let Ok(val) = std::env::var("ZBX_ZABBIX_SERVICE") {
        config.zabbix.service = Some(val);
    }
    if let Ok(val) = std::env::var("ZBX_ZABBIX_CONFIG_DIR") {
        config.zabbix.config_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("ZBX_ZABBIX_PLATFORM_FAMILY") {
        config.zabbix.platform_family = val;
    }

    // Database overrides
    if let Ok(val) = std::env::var("ZBX_DATABASE_VENDOR") {
        config.database.vendor = val;
    }
    if let Ok(val) = std::env::var("ZBX_DATABASE_PROXY_STORE") {
        config.database.proxy_store = val;
    }
    if let Ok(val) = std::env::var("ZBX_DATABASE_POSTGRESQL_LISTEN_ADDRESSES") {
        config.database.postgresql.listen_addresses = val;
    }
    if let Ok(val) = std::env::var("ZBX_DATABASE_POSTGRESQL_PORT") {
        if let Ok(port) = val.parse() {
            config.database.postgresql.port = port;
        }
    }
    if let Ok(val) = std::env::var("ZBX_DATABASE_POSTGRESQL_CREDENTIAL_GROUP") {
        config.database.postgresql.credential_group = Some(val);
    }
    if let Ok(val) = std::env::var("ZBX_DATABASE_MYSQL_LISTEN_ADDRESSES") {
        config.database.mysql.listen_addresses = val;
    }
    if let Ok(val) = std::env::var("ZBX_DATABASE_MYSQL_PORT") {
        if let Ok(port) = val.parse() {
            config.database.mysql.port = port;
        }
    }
    if let Ok(val) = std::env::var("ZBX_DATABASE_MYSQL_CREDENTIAL_GROUP") {
        config.database.mysql.credential_group = Some(val);
    }
    if let Ok(val) = std::env::var("ZBX_DATABASE_MYSQL_DATABASE_NAME") {
        config.database.mysql.database_name = val;
    }

    // Credential store overrides
    if let Ok(val) = std::env::var("ZBX_CREDENTIALS_DATA_BAG_PATH") {
        config.credentials.data_bag_path = PathBuf::from(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ZBX_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ZBX_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
