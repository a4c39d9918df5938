//! MySQL primary database provisioning

use crate::adapters::traits::{
    AdminConnection, AdminExecutor, PrimaryDatabaseProvisioner, PrimaryDatabaseRequest,
};
use crate::domain::errors::ProvisionError;
use crate::domain::sql::{mysql_identifier, mysql_string};
use crate::domain::{Result, SensitiveStatement};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Creates the Zabbix database on MySQL and imports the schema into it
/// when it has no tables yet
pub struct MySqlPrimaryProvisioner {
    executor: Arc<dyn AdminExecutor>,
    schema_files: Vec<PathBuf>,
}

impl MySqlPrimaryProvisioner {
    pub fn new(executor: Arc<dyn AdminExecutor>, schema_files: Vec<PathBuf>) -> Self {
        Self {
            executor,
            schema_files,
        }
    }

    fn failure(
        request: &PrimaryDatabaseRequest,
        error: crate::adapters::command::CommandError,
    ) -> ProvisionError {
        ProvisionError::PrimaryProvisionFailure(format!(
            "mysql database '{}': {}",
            request.name,
            error.redacted(&[&request.password])
        ))
    }
}

#[async_trait]
impl PrimaryDatabaseProvisioner for MySqlPrimaryProvisioner {
    async fn ensure(&self, request: &PrimaryDatabaseRequest) -> Result<()> {
        let database = mysql_identifier(&request.name)
            .map_err(|e| ProvisionError::PrimaryProvisionFailure(e.to_string()))?;
        let connection = AdminConnection {
            host: request.host.clone(),
            port: request.port,
            user: request.user.clone(),
            password: request.password.clone(),
        };

        self.executor
            .execute(
                &connection,
                &SensitiveStatement::plain(format!("CREATE DATABASE IF NOT EXISTS {database}")),
            )
            .await
            .map_err(|e| Self::failure(request, e))?;

        if self.schema_files.is_empty() {
            return Ok(());
        }

        let rows = self
            .executor
            .query(
                &connection,
                &SensitiveStatement::plain(format!(
                    "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = {}",
                    mysql_string(&request.name)
                )),
            )
            .await
            .map_err(|e| Self::failure(request, e))?;

        let tables: u64 = rows
            .first()
            .and_then(|row| row.trim().parse().ok())
            .unwrap_or(0);
        if tables > 0 {
            tracing::debug!(database = %request.name, tables, "Schema already present");
            return Ok(());
        }

        for file in &self.schema_files {
            self.executor
                .import_file(&connection, &request.name, file)
                .await
                .map_err(|e| Self::failure(request, e))?;
        }
        tracing::info!(
            database = %request.name,
            files = self.schema_files.len(),
            "Imported schema"
        );
        Ok(())
    }
}
