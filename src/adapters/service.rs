//! systemd service manager

use crate::adapters::command::{CommandRunner, Stdin};
use crate::adapters::traits::ServiceManager;
use crate::domain::{ProvisionError, Result};
use async_trait::async_trait;

/// [`ServiceManager`] driving `systemctl`
#[derive(Debug, Clone)]
pub struct SystemdServiceManager {
    runner: CommandRunner,
}

impl SystemdServiceManager {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    async fn systemctl(&self, action: &str, service: &str) -> Result<()> {
        let args = vec![action.to_string(), service.to_string()];
        self.runner
            .run("systemctl", &args, &[], &[], Stdin::Null)
            .await
            .map_err(|e| ProvisionError::ServiceFailure {
                service: service.to_string(),
                action: action.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

#[async_trait]
impl ServiceManager for SystemdServiceManager {
    async fn enable(&self, service: &str) -> Result<()> {
        self.systemctl("enable", service).await?;
        tracing::info!(service = %service, "Service enabled");
        Ok(())
    }

    async fn restart(&self, service: &str) -> Result<()> {
        self.systemctl("restart", service).await?;
        tracing::info!(service = %service, "Service restarted");
        Ok(())
    }
}
