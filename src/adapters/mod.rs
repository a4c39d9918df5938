//! External system integrations.
//!
//! The orchestrator only sees the traits in [`traits`]; this module also
//! ships one implementation of each:
//!
//! - [`credentials`] - Data bag credential store
//! - [`packages`] - `apt-get` / `yum` package manager
//! - [`mysql`] - `mysql` client admin executor and MySQL primary provisioner
//! - [`postgresql`] - PostgreSQL primary provisioner (`tokio-postgres`)
//! - [`primary`] - Vendor dispatch for primary provisioning
//! - [`render`] - Zabbix `Key=Value` configuration file renderer
//! - [`service`] - systemd service manager
//! - [`command`] - Host command runner shared by the CLI-driven adapters
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with fake implementations. [`factory`] wires the production
//! implementations together from configuration.

pub mod command;
pub mod credentials;
pub mod factory;
pub mod mysql;
pub mod packages;
pub mod postgresql;
pub mod primary;
pub mod render;
pub mod service;
pub mod traits;

pub use factory::{create_collaborators, detect_platform};
pub use traits::{
    AdminConnection, AdminExecutor, ConfigRenderer, CredentialStore, PackageManager,
    PrimaryDatabaseProvisioner, PrimaryDatabaseRequest, RenderOutcome, ServiceManager,
};
