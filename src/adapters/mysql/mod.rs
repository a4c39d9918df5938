//! MySQL integration
//!
//! Administrative SQL goes through the `mysql` command-line client; the
//! primary provisioner builds on top of it.

pub mod adapter;
pub mod client;

pub use adapter::MySqlPrimaryProvisioner;
pub use client::MySqlCliExecutor;
