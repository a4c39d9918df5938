//! Vendor dispatch for primary database provisioning

use crate::adapters::mysql::MySqlPrimaryProvisioner;
use crate::adapters::postgresql::PostgresPrimaryProvisioner;
use crate::adapters::traits::{PrimaryDatabaseProvisioner, PrimaryDatabaseRequest};
use crate::domain::{DatabaseVendor, Result};
use async_trait::async_trait;

/// [`PrimaryDatabaseProvisioner`] choosing the engine from the request's vendor
pub struct SqlPrimaryProvisioner {
    postgresql: PostgresPrimaryProvisioner,
    mysql: MySqlPrimaryProvisioner,
}

impl SqlPrimaryProvisioner {
    pub fn new(postgresql: PostgresPrimaryProvisioner, mysql: MySqlPrimaryProvisioner) -> Self {
        Self { postgresql, mysql }
    }
}

#[async_trait]
impl PrimaryDatabaseProvisioner for SqlPrimaryProvisioner {
    async fn ensure(&self, request: &PrimaryDatabaseRequest) -> Result<()> {
        tracing::info!(
            database = %request.name,
            vendor = %request.vendor,
            role = %request.role,
            host = %request.host,
            port = request.port,
            "Ensuring primary database"
        );
        match request.vendor {
            DatabaseVendor::PostgreSQL => self.postgresql.ensure(request).await,
            DatabaseVendor::MySQL => self.mysql.ensure(request).await,
        }
    }
}
