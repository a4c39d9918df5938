//! Core provisioning logic.
//!
//! # Modules
//!
//! - [`rules`] - Version rules pruning configuration keys
//! - [`builder`] - Merge of the base tree with database facts
//! - [`tables`] - Lookup tables keyed by role and vendor
//! - [`credentials`] - Credential group resolution
//! - [`bootstrap`] - Proxy local database bootstrap
//! - [`orchestrator`] - The provisioning run itself
//! - [`report`] - Per-run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use zbx_provision::adapters::create_collaborators;
//! use zbx_provision::config::load_config;
//! use zbx_provision::core::ProvisionOrchestrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("zbx-provision.toml")?;
//! let (collaborators, platform) = create_collaborators(&config)?;
//!
//! let orchestrator = ProvisionOrchestrator::new(collaborators, platform, false)?;
//! let report = orchestrator.run(&config).await?;
//!
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod builder;
pub mod credentials;
pub mod orchestrator;
pub mod report;
pub mod rules;
pub mod tables;

pub use builder::{build, RenderedConfiguration};
pub use orchestrator::{
    preview, validate_inputs, Collaborators, ProvisionOrchestrator, ValidatedInputs,
};
pub use report::{ProvisionReport, Step, StepRecord, StepStatus};
pub use rules::{apply_rules, VersionRule, VERSION_RULES};
