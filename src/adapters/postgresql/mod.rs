//! PostgreSQL integration
//!
//! This module provisions the primary Zabbix database on PostgreSQL.

pub mod adapter;
pub mod client;

pub use adapter::PostgresPrimaryProvisioner;
pub use client::{PostgresClient, PostgresConnectParams};
