//! PostgreSQL client implementation
//!
//! Thin wrapper over one `tokio-postgres` connection, opened for a single
//! provisioning step and dropped afterwards.

use crate::config::SecretString;
use crate::domain::sql::pg_identifier;
use crate::domain::{ProvisionError, Result};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::NoTls;

/// Connection parameters
#[derive(Debug, Clone)]
pub struct PostgresConnectParams<'a> {
    pub host: &'a str,
    pub port: u16,
    pub user: &'a str,
    pub password: &'a SecretString,
    pub database: &'a str,
    pub connect_timeout: Duration,
}

/// PostgreSQL client for provisioning
pub struct PostgresClient {
    client: tokio_postgres::Client,
    connection: JoinHandle<()>,
}

impl PostgresClient {
    /// Opens a connection
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::PrimaryProvisionFailure`] if the server
    /// cannot be reached or rejects the login.
    pub async fn connect(params: &PostgresConnectParams<'_>) -> Result<Self> {
        let password: &str = params.password.expose_secret().as_ref();

        let mut config = tokio_postgres::Config::new();
        config
            .host(params.host)
            .port(params.port)
            .user(params.user)
            .password(password)
            .dbname(params.database)
            .connect_timeout(params.connect_timeout)
            .application_name("zbx-provision");

        let (client, connection) = config.connect(NoTls).await.map_err(|e| {
            ProvisionError::PrimaryProvisionFailure(format!(
                "Failed to connect to PostgreSQL at {}:{} as '{}': {}",
                params.host, params.port, params.user, e
            ))
        })?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        tracing::debug!(host = %params.host, database = %params.database, "Connected to PostgreSQL");
        Ok(Self { client, connection })
    }

    /// Whether a database named `name` exists
    pub async fn database_exists(&self, name: &str) -> Result<bool> {
        let row = self
            .client
            .query_opt("SELECT 1 FROM pg_database WHERE datname = $1", &[&name])
            .await
            .map_err(|e| {
                ProvisionError::PrimaryProvisionFailure(format!(
                    "Failed to look up database '{name}': {e}"
                ))
            })?;
        Ok(row.is_some())
    }

    /// Creates database `name`, owned by the connected user
    pub async fn create_database(&self, name: &str) -> Result<()> {
        let statement = format!("CREATE DATABASE {}", pg_identifier(name)?);
        self.client.batch_execute(&statement).await.map_err(|e| {
            ProvisionError::PrimaryProvisionFailure(format!(
                "Failed to create database '{name}': {e}"
            ))
        })
    }

    /// Whether `relation` (for example `public.users`) exists
    pub async fn relation_exists(&self, relation: &str) -> Result<bool> {
        let row = self
            .client
            .query_one("SELECT to_regclass($1) IS NOT NULL", &[&relation])
            .await
            .map_err(|e| {
                ProvisionError::PrimaryProvisionFailure(format!(
                    "Failed to look up relation '{relation}': {e}"
                ))
            })?;
        Ok(row.get(0))
    }

    /// Runs a multi-statement SQL script
    pub async fn batch_execute(&self, sql: &str, source: &str) -> Result<()> {
        self.client.batch_execute(sql).await.map_err(|e| {
            ProvisionError::PrimaryProvisionFailure(format!("Failed to execute {source}: {e}"))
        })
    }
}

impl Drop for PostgresClient {
    fn drop(&mut self) {
        self.connection.abort();
    }
}
