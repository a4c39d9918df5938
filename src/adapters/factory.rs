//! Collaborator factory
//!
//! Builds the production implementations of every collaborator trait from
//! configuration.

use crate::adapters::command::CommandRunner;
use crate::adapters::credentials::DataBagStore;
use crate::adapters::mysql::{MySqlCliExecutor, MySqlPrimaryProvisioner};
use crate::adapters::packages::SystemPackageManager;
use crate::adapters::postgresql::PostgresPrimaryProvisioner;
use crate::adapters::primary::SqlPrimaryProvisioner;
use crate::adapters::render::ConfFileRenderer;
use crate::adapters::service::SystemdServiceManager;
use crate::adapters::traits::AdminExecutor;
use crate::config::ProvisionConfig;
use crate::core::orchestrator::Collaborators;
use crate::domain::{PlatformFamily, ProvisionError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Where the platform family is detected from when not configured
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Platform family from configuration, or detected from `os_release`
///
/// # Errors
///
/// [`ProvisionError::Configuration`] when detection fails.
pub fn detect_platform(config: &ProvisionConfig, os_release: &Path) -> Result<PlatformFamily> {
    if let Some(family) = config.zabbix.platform_family()? {
        return Ok(family);
    }

    let contents = std::fs::read_to_string(os_release).map_err(|e| {
        ProvisionError::Configuration(format!(
            "Cannot detect platform family from {}: {e}; set zabbix.platform_family",
            os_release.display()
        ))
    })?;

    let family = PlatformFamily::from_os_release(&contents).ok_or_else(|| {
        ProvisionError::Configuration(format!(
            "Unsupported platform in {}; set zabbix.platform_family to debian or rhel",
            os_release.display()
        ))
    })?;
    tracing::debug!(platform = %family, "Detected platform family");
    Ok(family)
}

/// Create every collaborator based on the configuration
///
/// # Returns
///
/// The collaborators and the platform family they were built for
///
/// # Errors
///
/// Returns an error if the platform family cannot be determined
pub fn create_collaborators(config: &ProvisionConfig) -> Result<(Collaborators, PlatformFamily)> {
    let platform = detect_platform(config, Path::new(OS_RELEASE_PATH))?;
    let runner = CommandRunner::default();

    let admin: Arc<dyn AdminExecutor> = Arc::new(MySqlCliExecutor::new(
        config.database.mysql.client_binary.clone(),
        runner.clone(),
    ));

    let postgresql = PostgresPrimaryProvisioner::new(
        config.database.postgresql.maintenance_database.clone(),
        Duration::from_secs(config.database.postgresql.connect_timeout_seconds),
        config.database.postgresql.schema_files.clone(),
    );
    let mysql = MySqlPrimaryProvisioner::new(admin.clone(), config.database.mysql.schema_files.clone());

    tracing::debug!(platform = %platform, "Creating collaborators");
    let collaborators = Collaborators {
        credentials: Arc::new(DataBagStore::new(
            config.credentials.data_bag_path.clone(),
            config.credentials.item.clone(),
        )),
        packages: Arc::new(SystemPackageManager::new(platform, runner.clone())),
        admin,
        primary: Arc::new(SqlPrimaryProvisioner::new(postgresql, mysql)),
        renderer: Arc::new(ConfFileRenderer::default()),
        services: Arc::new(SystemdServiceManager::new(runner)),
    };

    Ok((collaborators, platform))
}
