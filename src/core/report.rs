//! Provisioning run report
//!
//! This module defines the per-run summary returned by the orchestrator.

use crate::domain::{DatabaseVendor, Role, Version};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Steps of a provisioning run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    ValidateInputs,
    ResolveCredentials,
    InstallPackage,
    ProxyBootstrapDb,
    ProvisionPrimaryDatabase,
    PrepareHost,
    BuildConfiguration,
    RenderFile,
    RestartService,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ValidateInputs => "validate_inputs",
            Step::ResolveCredentials => "resolve_credentials",
            Step::InstallPackage => "install_package",
            Step::ProxyBootstrapDb => "proxy_bootstrap_db",
            Step::ProvisionPrimaryDatabase => "provision_primary_database",
            Step::PrepareHost => "prepare_host",
            Step::BuildConfiguration => "build_configuration",
            Step::RenderFile => "render_file",
            Step::RestartService => "restart_service",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What happened to a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum StepStatus {
    /// Ran to completion
    Done,
    /// Did not apply to this role/vendor or was not needed
    Skipped(String),
    /// Would have run, but this is a dry run
    DryRun,
}

/// One entry of the run log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub status: StepStatus,
}

/// Summary of a provisioning run
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: DateTime<Utc>,

    /// Role provisioned
    pub role: Role,

    /// Primary database vendor
    pub vendor: DatabaseVendor,

    /// Version the configuration was pruned for
    pub version: Version,

    /// Zabbix package for the role and vendor
    pub package: String,

    /// Rendered configuration file
    pub config_path: PathBuf,

    /// SHA-256 of the rendered configuration
    pub config_digest: Option<String>,

    /// Whether the configuration file changed (or would change, in a dry run)
    pub config_changed: bool,

    /// Whether the service was restarted
    pub service_restarted: bool,

    /// Whether nothing on the host was modified
    pub dry_run: bool,

    /// Steps in execution order
    pub steps: Vec<StepRecord>,
}

impl ProvisionReport {
    /// Status recorded for `step`, if it was reached
    pub fn status(&self, step: Step) -> Option<&StepStatus> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| &record.status)
    }

    /// Steps that actually ran
    pub fn executed(&self) -> impl Iterator<Item = Step> + '_ {
        self.steps
            .iter()
            .filter(|record| record.status == StepStatus::Done)
            .map(|record| record.step)
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Provisioned {} ({}, Zabbix {}) with package {}",
            self.role, self.vendor, self.version, self.package
        )?;
        if self.dry_run {
            writeln!(f, "Dry run: no changes were made")?;
        }
        for record in &self.steps {
            match &record.status {
                StepStatus::Done => writeln!(f, "  {:<28} done", record.step)?,
                StepStatus::DryRun => writeln!(f, "  {:<28} dry run", record.step)?,
                StepStatus::Skipped(reason) => {
                    writeln!(f, "  {:<28} skipped ({reason})", record.step)?
                }
            }
        }
        writeln!(
            f,
            "Configuration {}: {}",
            self.config_path.display(),
            if self.config_changed {
                "changed"
            } else {
                "unchanged"
            }
        )?;
        write!(
            f,
            "Service restarted: {}",
            if self.service_restarted { "yes" } else { "no" }
        )
    }
}
