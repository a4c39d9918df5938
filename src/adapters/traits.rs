//! Collaborator traits
//!
//! The orchestrator talks to the outside world only through these traits.
//! Production implementations live next to this module; tests plug in fakes.

use crate::adapters::command::CommandError;
use crate::config::SecretString;
use crate::core::builder::RenderedConfiguration;
use crate::domain::{CredentialGroup, DatabaseVendor, Result, Role, SensitiveStatement};
use async_trait::async_trait;
use std::path::Path;

/// Secret store holding credential groups
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetches every user of `group`
    ///
    /// # Errors
    ///
    /// [`crate::domain::ProvisionError::EmptyCredentialGroup`] for an unknown
    /// or empty group, [`crate::domain::ProvisionError::CredentialStore`] when
    /// the store cannot be read.
    async fn get(&self, group: &str) -> Result<CredentialGroup>;
}

/// Host package manager
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Installs `package`; an already installed package is a no-op
    ///
    /// # Errors
    ///
    /// [`crate::domain::ProvisionError::PackageInstallFailure`]
    async fn install(&self, package: &str) -> Result<()>;
}

/// Administrative connection to a database server
#[derive(Debug, Clone)]
pub struct AdminConnection {
    /// Host
    pub host: String,
    /// Port
    pub port: u16,
    /// User the statements run as
    pub user: String,
    /// Password of `user`
    pub password: SecretString,
}

/// Executes raw administrative SQL
#[async_trait]
pub trait AdminExecutor: Send + Sync {
    /// Runs a statement for its side effect
    async fn execute(
        &self,
        connection: &AdminConnection,
        statement: &SensitiveStatement,
    ) -> std::result::Result<(), CommandError>;

    /// Runs a query and returns one string per result row
    async fn query(
        &self,
        connection: &AdminConnection,
        statement: &SensitiveStatement,
    ) -> std::result::Result<Vec<String>, CommandError>;

    /// Feeds a SQL file to `database`
    async fn import_file(
        &self,
        connection: &AdminConnection,
        database: &str,
        path: &Path,
    ) -> std::result::Result<(), CommandError>;
}

/// Everything needed to ensure the primary application database exists
#[derive(Debug, Clone)]
pub struct PrimaryDatabaseRequest {
    /// Database name
    pub name: String,
    /// Engine
    pub vendor: DatabaseVendor,
    /// Application user
    pub user: String,
    /// Application user's password
    pub password: SecretString,
    /// Host
    pub host: String,
    /// Port
    pub port: u16,
    /// Role of the Zabbix instance using the database
    pub role: Role,
}

/// Creates the primary database and its schema when missing
#[async_trait]
pub trait PrimaryDatabaseProvisioner: Send + Sync {
    /// Ensures the database (and, where configured, its schema) exists
    ///
    /// # Errors
    ///
    /// [`crate::domain::ProvisionError::PrimaryProvisionFailure`]
    async fn ensure(&self, request: &PrimaryDatabaseRequest) -> Result<()>;
}

/// Result of writing a configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Whether the file content differs from what was there before
    pub changed: bool,
    /// SHA-256 of the rendered content, safe to log
    pub digest: String,
}

/// Writes the daemon configuration file
#[async_trait]
pub trait ConfigRenderer: Send + Sync {
    /// Writes `configuration` to `target`
    ///
    /// # Errors
    ///
    /// [`crate::domain::ProvisionError::RenderFailure`]
    async fn render(
        &self,
        target: &Path,
        configuration: &RenderedConfiguration,
    ) -> Result<RenderOutcome>;

    /// Whether `target` already holds exactly this configuration
    async fn is_current(&self, target: &Path, configuration: &RenderedConfiguration)
        -> Result<bool>;
}

/// Host service manager
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Enables `service` at boot
    async fn enable(&self, service: &str) -> Result<()>;

    /// Restarts `service` and waits for the service manager to return
    async fn restart(&self, service: &str) -> Result<()>;
}
