//! Domain error types
//!
//! Every failure of a provisioning run maps to one [`ProvisionError`] variant.
//! All of them are fatal: the run aborts and the operator fixes the input and
//! re-runs. Messages name the offending configuration path or value and never
//! carry a password.

use thiserror::Error;

/// Main provisioning error type
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Role is neither `server` nor `proxy`
    #[error("zabbix.role must be 'server' or 'proxy' (now: '{value}')")]
    InvalidRole { value: String },

    /// Database vendor is neither `postgresql` nor `mysql`
    #[error("{path} must be 'postgresql' or 'mysql' (now: '{value}')")]
    InvalidVendor { path: String, value: String },

    /// Credential group reference is empty or unset
    #[error("Credential group is not set: specify a group name in {path}")]
    MissingCredentialGroup { path: String },

    /// Credential group exists in name only: the store has no users for it
    #[error("Credential group '{group}' is empty or does not exist")]
    EmptyCredentialGroup { group: String },

    /// A specific user required by a step is absent from the group
    #[error("Credential group '{group}' has no entry for user '{user}'")]
    MissingCredential { group: String, user: String },

    /// Credential store could not be read or parsed
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// Package manager reported a failure
    #[error("Failed to install package '{package}': {reason}")]
    PackageInstallFailure { package: String, reason: String },

    /// Proxy local database bootstrap failed
    #[error("Database bootstrap failed: {0}")]
    DatabaseBootstrapFailure(String),

    /// Primary database provisioning failed
    #[error("Primary database provisioning failed: {0}")]
    PrimaryProvisionFailure(String),

    /// Configuration file could not be rendered
    #[error("Failed to render {path}: {reason}")]
    RenderFailure { path: String, reason: String },

    /// Service manager reported a failure
    #[error("Failed to {action} service '{service}': {reason}")]
    ServiceFailure {
        service: String,
        action: String,
        reason: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl ProvisionError {
    /// Whether the error stems from operator input rather than a failing step
    ///
    /// The CLI maps input errors to exit code 2 and everything else to 5.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ProvisionError::InvalidRole { .. }
                | ProvisionError::InvalidVendor { .. }
                | ProvisionError::MissingCredentialGroup { .. }
                | ProvisionError::EmptyCredentialGroup { .. }
                | ProvisionError::MissingCredential { .. }
                | ProvisionError::Configuration(_)
                | ProvisionError::Validation(_)
        )
    }
}

impl From<std::io::Error> for ProvisionError {
    fn from(err: std::io::Error) -> Self {
        ProvisionError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ProvisionError {
    fn from(err: serde_json::Error) -> Self {
        ProvisionError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ProvisionError {
    fn from(err: toml::de::Error) -> Self {
        ProvisionError::Configuration(format!("TOML parse error: {err}"))
    }
}
