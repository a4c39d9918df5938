// zbx-provision - Zabbix server/proxy provisioning tool
// Copyright (c) 2025 zbx-provision Contributors
// Licensed under the MIT License

//! # zbx-provision - Zabbix server/proxy provisioning
//!
//! zbx-provision turns a Linux host into a working Zabbix server or Zabbix
//! proxy in one idempotent run: it installs the package for the chosen role
//! and database vendor, bootstraps the proxy's MySQL local store, creates the
//! primary database, and renders the daemon configuration file with
//! credentials merged in.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Validating** role and vendor selection before anything is changed
//! - **Resolving** database credentials from a data bag store
//! - **Bootstrapping** the proxy's local MySQL database and users
//! - **Rendering** `zabbix_server.conf` / `zabbix_proxy.conf`, pruned for the
//!   installed version
//!
//! ## Architecture
//!
//! zbx-provision follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (rules, builder, bootstrap, orchestrator)
//! - [`adapters`] - External integrations (data bags, packages, MySQL,
//!   PostgreSQL, systemd, file rendering)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zbx_provision::adapters::create_collaborators;
//! use zbx_provision::config::load_config;
//! use zbx_provision::core::ProvisionOrchestrator;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("zbx-provision.toml")?;
//!     let (collaborators, platform) = create_collaborators(&config)?;
//!
//!     let orchestrator = ProvisionOrchestrator::new(collaborators, platform, false)?;
//!     let report = orchestrator.run(&config).await?;
//!
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! ## Version Rules
//!
//! Keys that the installed Zabbix version rejects are removed before
//! rendering:
//!
//! ```rust
//! use zbx_provision::core::apply_rules;
//! use zbx_provision::domain::{ConfigurationTree, Role, Version};
//!
//! let tree = ConfigurationTree::from_toml_str(
//!     "SenderFrequency = 30\n[cache]\nHistoryTextCacheSize = \"16M\"\n",
//! ).unwrap();
//!
//! let tree = apply_rules(tree, Version::new(4, 0), Role::Server);
//! assert!(!tree.contains(None, "SenderFrequency"));
//! assert!(!tree.contains(Some("cache"), "HistoryTextCacheSize"));
//! ```
//!
//! ## Error Handling
//!
//! Every failure is a [`domain::ProvisionError`]. Errors caused by operator
//! input are told apart with [`domain::ProvisionError::is_input_error`], which
//! the CLI maps to exit code 2; everything else exits with 5.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
