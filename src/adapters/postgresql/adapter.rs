//! PostgreSQL primary database provisioning

use crate::adapters::postgresql::client::{PostgresClient, PostgresConnectParams};
use crate::adapters::traits::{PrimaryDatabaseProvisioner, PrimaryDatabaseRequest};
use crate::domain::{ProvisionError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Table whose presence marks an imported Zabbix schema
const SCHEMA_MARKER: &str = "public.users";

/// Creates the Zabbix database on PostgreSQL and imports the schema into it
/// when the schema is missing
#[derive(Debug, Clone)]
pub struct PostgresPrimaryProvisioner {
    maintenance_database: String,
    connect_timeout: Duration,
    schema_files: Vec<PathBuf>,
}

impl PostgresPrimaryProvisioner {
    /// Creates a provisioner
    ///
    /// # Arguments
    ///
    /// * `maintenance_database` - Database to connect to while the Zabbix database does not exist yet
    /// * `connect_timeout` - Connect timeout for each connection
    /// * `schema_files` - SQL files imported in order into an empty database
    pub fn new(
        maintenance_database: impl Into<String>,
        connect_timeout: Duration,
        schema_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            maintenance_database: maintenance_database.into(),
            connect_timeout,
            schema_files,
        }
    }

    fn params<'a>(
        &self,
        request: &'a PrimaryDatabaseRequest,
        database: &'a str,
    ) -> PostgresConnectParams<'a> {
        PostgresConnectParams {
            host: &request.host,
            port: request.port,
            user: &request.user,
            password: &request.password,
            database,
            connect_timeout: self.connect_timeout,
        }
    }

    async fn import_schema(&self, request: &PrimaryDatabaseRequest) -> Result<()> {
        let client = PostgresClient::connect(&self.params(request, &request.name)).await?;
        if client.relation_exists(SCHEMA_MARKER).await? {
            tracing::debug!(database = %request.name, "Schema already present");
            return Ok(());
        }

        for file in &self.schema_files {
            let sql = tokio::fs::read_to_string(file).await.map_err(|e| {
                ProvisionError::PrimaryProvisionFailure(format!(
                    "Failed to read schema file {}: {e}",
                    file.display()
                ))
            })?;
            client
                .batch_execute(&sql, &file.display().to_string())
                .await?;
            tracing::info!(database = %request.name, file = %file.display(), "Imported SQL file");
        }
        Ok(())
    }
}

#[async_trait]
impl PrimaryDatabaseProvisioner for PostgresPrimaryProvisioner {
    async fn ensure(&self, request: &PrimaryDatabaseRequest) -> Result<()> {
        {
            let client =
                PostgresClient::connect(&self.params(request, &self.maintenance_database)).await?;
            if client.database_exists(&request.name).await? {
                tracing::info!(database = %request.name, "PostgreSQL database already exists");
            } else {
                client.create_database(&request.name).await?;
                tracing::info!(database = %request.name, owner = %request.user, "Created PostgreSQL database");
            }
        }

        if self.schema_files.is_empty() {
            return Ok(());
        }
        self.import_schema(request).await
    }
}
