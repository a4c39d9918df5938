//! Provisioning orchestrator - runs one provisioning pass end to end
//!
//! ```text
//! ValidateInputs → ResolveCredentials → InstallPackage → [ProxyBootstrapDb]
//!   → ProvisionPrimaryDatabase → PrepareHost → BuildConfiguration
//!   → RenderFile → [RestartService]
//! ```
//!
//! Validation and credential resolution are read-only and both finish
//! before the first side effect, so bad input never leaves a half-provisioned
//! host. Every later step is idempotent; a failed run is simply repeated.

use crate::adapters::traits::{
    AdminConnection, AdminExecutor, ConfigRenderer, CredentialStore, PackageManager,
    PrimaryDatabaseProvisioner, PrimaryDatabaseRequest, ServiceManager,
};
use crate::config::{DatabaseConfig, ProvisionConfig};
use crate::core::bootstrap::{plan, BootstrapRequest, DatabaseBootstrapper};
use crate::core::builder::{build, RenderedConfiguration};
use crate::core::credentials::{primary_user, require_user, CredentialResolver};
use crate::core::report::{ProvisionReport, Step, StepRecord, StepStatus};
use crate::core::tables::{
    bootstrap_table, config_file_name, default_service_name, package_table,
    platform_extra_packages, LocalStoreBootstrap, RoleVendorTable,
};
use crate::domain::errors::ProvisionError;
use crate::domain::{
    CredentialGroup, DatabaseConnectionFacts, DatabaseVendor, PlatformFamily, Result, Role,
    UserCredential, Version,
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// External collaborators of a run
#[derive(Clone)]
pub struct Collaborators {
    pub credentials: Arc<dyn CredentialStore>,
    pub packages: Arc<dyn PackageManager>,
    pub admin: Arc<dyn AdminExecutor>,
    pub primary: Arc<dyn PrimaryDatabaseProvisioner>,
    pub renderer: Arc<dyn ConfigRenderer>,
    pub services: Arc<dyn ServiceManager>,
}

/// Inputs that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInputs {
    pub role: Role,
    pub vendor: DatabaseVendor,
    pub version: Version,
    pub local_store: LocalStoreBootstrap,
    /// Credential group of the primary database
    pub primary_group: String,
    /// Credential group of the proxy's MySQL local store, when bootstrapped
    pub local_store_group: Option<String>,
}

/// Validates role, vendors and credential group references
///
/// Role is checked first, so an invalid role is reported even when other
/// inputs are broken too.
///
/// # Errors
///
/// [`ProvisionError::InvalidRole`], [`ProvisionError::InvalidVendor`],
/// [`ProvisionError::MissingCredentialGroup`] or a validation error.
pub fn validate_inputs(
    config: &ProvisionConfig,
    bootstrap: &RoleVendorTable<LocalStoreBootstrap>,
) -> Result<ValidatedInputs> {
    config.validate()?;
    let role = config.role()?;
    let vendor = config.vendor()?;

    let local_store = match role {
        Role::Proxy => *bootstrap.get(role, config.proxy_store()?),
        Role::Server => *bootstrap.get(role, vendor),
    };

    let parsed = Version::parse_lenient(&config.zabbix.version);
    if !parsed.exact {
        tracing::warn!(
            input = %config.zabbix.version,
            version = %parsed.version,
            "zabbix.version is not a plain major.minor version; using best-effort parse"
        );
    }

    let primary_group = group_reference(&config.database, vendor)?;
    let local_store_group = match local_store {
        LocalStoreBootstrap::MySql => Some(group_reference(&config.database, DatabaseVendor::MySQL)?),
        LocalStoreBootstrap::Skip => None,
    };

    Ok(ValidatedInputs {
        role,
        vendor,
        version: parsed.version,
        local_store,
        primary_group,
        local_store_group,
    })
}

fn group_reference(database: &DatabaseConfig, vendor: DatabaseVendor) -> Result<String> {
    database
        .credential_group(vendor)
        .map(str::to_string)
        .ok_or_else(|| ProvisionError::MissingCredentialGroup {
            path: DatabaseConfig::credential_group_path(vendor),
        })
}

/// Credentials resolved for a run
struct ResolvedCredentials {
    primary_user: UserCredential,
    local_store: Option<LocalStoreCredentials>,
}

struct LocalStoreCredentials {
    group: CredentialGroup,
    admin: UserCredential,
}

/// Provisioning orchestrator
pub struct ProvisionOrchestrator {
    collaborators: Collaborators,
    resolver: CredentialResolver,
    bootstrapper: DatabaseBootstrapper,
    platform: PlatformFamily,
    packages: RoleVendorTable<&'static str>,
    bootstrap: RoleVendorTable<LocalStoreBootstrap>,
    dry_run: bool,
}

impl ProvisionOrchestrator {
    /// Creates an orchestrator
    ///
    /// # Errors
    ///
    /// [`ProvisionError::Configuration`] if a lookup table is incomplete.
    pub fn new(collaborators: Collaborators, platform: PlatformFamily, dry_run: bool) -> Result<Self> {
        Ok(Self {
            resolver: CredentialResolver::new(collaborators.credentials.clone()),
            bootstrapper: DatabaseBootstrapper::new(collaborators.admin.clone()),
            collaborators,
            platform,
            packages: package_table()?,
            bootstrap: bootstrap_table()?,
            dry_run,
        })
    }

    fn record(&self, steps: &mut Vec<StepRecord>, step: Step, status: StepStatus) {
        match &status {
            StepStatus::Done => tracing::info!(step = %step, "Step completed"),
            StepStatus::DryRun => tracing::info!(step = %step, "DRY RUN: step not executed"),
            StepStatus::Skipped(reason) => {
                crate::log_step_skipped!(step, reason);
            }
        }
        steps.push(StepRecord { step, status });
    }

    /// Runs one provisioning pass
    ///
    /// # Errors
    ///
    /// The first failing step's error; nothing after it runs.
    pub async fn run(&self, config: &ProvisionConfig) -> Result<ProvisionReport> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut steps = Vec::new();

        crate::log_step_start!(Step::ValidateInputs);
        let inputs = validate_inputs(config, &self.bootstrap)?;
        self.record(&mut steps, Step::ValidateInputs, StepStatus::Done);

        crate::log_step_start!(Step::ResolveCredentials);
        let credentials = self.resolve_credentials(config, &inputs).await?;
        self.record(&mut steps, Step::ResolveCredentials, StepStatus::Done);

        crate::log_step_start!(Step::InstallPackage);
        let package = *self.packages.get(inputs.role, inputs.vendor);
        let status = self.install_packages(package).await?;
        self.record(&mut steps, Step::InstallPackage, status);

        crate::log_step_start!(Step::ProxyBootstrapDb);
        let status = self.bootstrap_local_store(config, &credentials).await?;
        self.record(&mut steps, Step::ProxyBootstrapDb, status);

        crate::log_step_start!(Step::ProvisionPrimaryDatabase);
        let facts = connection_facts(config, &inputs, &credentials.primary_user);
        let status = self.provision_primary(&inputs, &facts).await?;
        self.record(&mut steps, Step::ProvisionPrimaryDatabase, status);

        crate::log_step_start!(Step::PrepareHost);
        let service = config
            .zabbix
            .service
            .clone()
            .unwrap_or_else(|| default_service_name(inputs.role).to_string());
        let status = self.prepare_host(config, &service).await?;
        self.record(&mut steps, Step::PrepareHost, status);

        crate::log_step_start!(Step::BuildConfiguration);
        let rendered = build(&config.zabbix.config, &facts, inputs.version, inputs.role);
        tracing::debug!(configuration = ?rendered, "Built configuration");
        self.record(&mut steps, Step::BuildConfiguration, StepStatus::Done);

        crate::log_step_start!(Step::RenderFile);
        let config_path: PathBuf = config.zabbix.config_dir.join(config_file_name(inputs.role));
        let (config_changed, config_digest) = if self.dry_run {
            let current = self
                .collaborators
                .renderer
                .is_current(&config_path, &rendered)
                .await?;
            self.record(&mut steps, Step::RenderFile, StepStatus::DryRun);
            (!current, None)
        } else {
            let outcome = self
                .collaborators
                .renderer
                .render(&config_path, &rendered)
                .await?;
            self.record(&mut steps, Step::RenderFile, StepStatus::Done);
            (outcome.changed, Some(outcome.digest))
        };

        let mut service_restarted = false;
        if !config_changed {
            self.record(
                &mut steps,
                Step::RestartService,
                StepStatus::Skipped("configuration unchanged".to_string()),
            );
        } else if self.dry_run {
            self.record(&mut steps, Step::RestartService, StepStatus::DryRun);
        } else {
            crate::log_step_start!(Step::RestartService);
            self.collaborators.services.restart(&service).await?;
            service_restarted = true;
            self.record(&mut steps, Step::RestartService, StepStatus::Done);
        }

        let report = ProvisionReport {
            started_at,
            finished_at: Utc::now(),
            role: inputs.role,
            vendor: inputs.vendor,
            version: inputs.version,
            package: package.to_string(),
            config_path,
            config_digest,
            config_changed,
            service_restarted,
            dry_run: self.dry_run,
            steps,
        };
        crate::log_provision_complete!(report.executed().count(), clock.elapsed());
        Ok(report)
    }

    async fn resolve_credentials(
        &self,
        config: &ProvisionConfig,
        inputs: &ValidatedInputs,
    ) -> Result<ResolvedCredentials> {
        resolve_credentials(&self.resolver, config, inputs).await
    }

    async fn install_packages(&self, package: &str) -> Result<StepStatus> {
        let extras = platform_extra_packages(self.platform);
        if self.dry_run {
            tracing::info!(package = %package, extras = ?extras, "DRY RUN: would install packages");
            return Ok(StepStatus::DryRun);
        }

        self.collaborators.packages.install(package).await?;
        for extra in extras {
            self.collaborators.packages.install(extra).await?;
        }
        Ok(StepStatus::Done)
    }

    async fn bootstrap_local_store(
        &self,
        config: &ProvisionConfig,
        credentials: &ResolvedCredentials,
    ) -> Result<StepStatus> {
        let Some(local) = &credentials.local_store else {
            return Ok(StepStatus::Skipped(
                "no MySQL local store for this role".to_string(),
            ));
        };

        let mysql = &config.database.mysql;
        let request = BootstrapRequest {
            connection: AdminConnection {
                host: mysql.listen_addresses.clone(),
                port: mysql.port,
                user: local.admin.name.clone(),
                password: local.admin.password.clone(),
            },
            database: &mysql.database_name,
            character_set: &mysql.character_set,
            collate: &mysql.collate,
            users: local.group.users(),
        };

        if self.dry_run {
            let statements = plan(&request)
                .map_err(|e| ProvisionError::DatabaseBootstrapFailure(e.to_string()))?;
            for statement in &statements {
                tracing::info!(statement = %statement, "DRY RUN: would execute");
            }
            return Ok(StepStatus::DryRun);
        }

        self.bootstrapper.bootstrap(&request).await?;
        Ok(StepStatus::Done)
    }

    async fn provision_primary(
        &self,
        inputs: &ValidatedInputs,
        facts: &DatabaseConnectionFacts,
    ) -> Result<StepStatus> {
        let request = PrimaryDatabaseRequest {
            name: facts.name.clone(),
            vendor: inputs.vendor,
            user: facts.user.clone(),
            password: facts.password.clone(),
            host: facts.host.clone(),
            port: facts.port,
            role: inputs.role,
        };

        if self.dry_run {
            tracing::info!(
                database = %request.name,
                vendor = %request.vendor,
                user = %request.user,
                "DRY RUN: would ensure primary database"
            );
            return Ok(StepStatus::DryRun);
        }

        self.collaborators.primary.ensure(&request).await?;
        Ok(StepStatus::Done)
    }

    async fn prepare_host(&self, config: &ProvisionConfig, service: &str) -> Result<StepStatus> {
        let templates_dir = &config.zabbix.templates_dir;
        if self.dry_run {
            tracing::info!(
                templates_dir = %templates_dir.display(),
                service = %service,
                "DRY RUN: would create templates directory and enable service"
            );
            return Ok(StepStatus::DryRun);
        }

        tokio::fs::create_dir_all(templates_dir).await.map_err(|e| {
            ProvisionError::Io(format!(
                "Failed to create templates directory {}: {e}",
                templates_dir.display()
            ))
        })?;
        self.collaborators.services.enable(service).await?;
        Ok(StepStatus::Done)
    }
}

/// Builds the configuration a run would render, without side effects
///
/// Runs validation and credential resolution only; the result still holds
/// the database password.
pub async fn preview(
    config: &ProvisionConfig,
    store: Arc<dyn CredentialStore>,
) -> Result<RenderedConfiguration> {
    let inputs = validate_inputs(config, &bootstrap_table()?)?;
    let credentials = resolve_credentials(&CredentialResolver::new(store), config, &inputs).await?;
    let facts = connection_facts(config, &inputs, &credentials.primary_user);
    Ok(build(&config.zabbix.config, &facts, inputs.version, inputs.role))
}

async fn resolve_credentials(
    resolver: &CredentialResolver,
    config: &ProvisionConfig,
    inputs: &ValidatedInputs,
) -> Result<ResolvedCredentials> {
    let primary_group = resolver
        .resolve(
            &DatabaseConfig::credential_group_path(inputs.vendor),
            Some(inputs.primary_group.as_str()),
        )
        .await?;
    let primary_user =
        primary_user(inputs.vendor, &primary_group, &config.database.mysql.db_user)?.clone();

    let local_store = match &inputs.local_store_group {
        None => None,
        Some(group_name) => {
            let group = if inputs.vendor == DatabaseVendor::MySQL
                && *group_name == inputs.primary_group
            {
                primary_group.clone()
            } else {
                resolver
                    .resolve(
                        &DatabaseConfig::credential_group_path(DatabaseVendor::MySQL),
                        Some(group_name.as_str()),
                    )
                    .await?
            };
            let admin = require_user(&group, &config.database.mysql.admin_user)?.clone();
            Some(LocalStoreCredentials { group, admin })
        }
    };

    Ok(ResolvedCredentials {
        primary_user,
        local_store,
    })
}

/// Connection facts injected into the `db` section
///
/// A proxy whose primary store is its MySQL local store points at the
/// bootstrapped database; everything else uses `database.name`.
pub fn connection_facts(
    config: &ProvisionConfig,
    inputs: &ValidatedInputs,
    user: &UserCredential,
) -> DatabaseConnectionFacts {
    let name = if inputs.local_store == LocalStoreBootstrap::MySql
        && inputs.vendor == DatabaseVendor::MySQL
    {
        config.database.mysql.database_name.clone()
    } else {
        config.database.name.clone()
    };
    let (host, port) = config.database.endpoint(inputs.vendor);

    DatabaseConnectionFacts {
        name,
        host: host.to_string(),
        port,
        user: user.name.clone(),
        password: user.password.clone(),
    }
}
