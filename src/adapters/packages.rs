//! System package manager
//!
//! `apt-get` on Debian-family hosts, `yum` on RHEL-family hosts. An
//! installed package is detected first so repeated runs do not touch the
//! package database.

use crate::adapters::command::{CommandError, CommandRunner, Stdin};
use crate::adapters::traits::PackageManager;
use crate::domain::errors::ProvisionError;
use crate::domain::{PlatformFamily, Result};
use async_trait::async_trait;

/// Package manager backed by the platform's native tool
#[derive(Debug, Clone)]
pub struct SystemPackageManager {
    family: PlatformFamily,
    runner: CommandRunner,
}

impl SystemPackageManager {
    pub fn new(family: PlatformFamily, runner: CommandRunner) -> Self {
        Self { family, runner }
    }

    async fn is_installed(&self, package: &str) -> bool {
        let (program, args) = query_command(self.family, package);
        match self.runner.run(program, &args, &[], &[], Stdin::Null).await {
            Ok(output) => match self.family {
                PlatformFamily::Debian => output.stdout.contains("install ok installed"),
                PlatformFamily::Rhel => true,
            },
            // Not installed is reported as a non-zero exit by both tools
            Err(CommandError::Failed { .. }) => false,
            Err(e) => {
                tracing::debug!(package = %package, error = %e, "Package query failed");
                false
            }
        }
    }
}

/// Command that asks whether `package` is installed
pub(crate) fn query_command(family: PlatformFamily, package: &str) -> (&'static str, Vec<String>) {
    match family {
        PlatformFamily::Debian => (
            "dpkg-query",
            vec![
                "-W".to_string(),
                "-f=${Status}".to_string(),
                package.to_string(),
            ],
        ),
        PlatformFamily::Rhel => ("rpm", vec!["-q".to_string(), package.to_string()]),
    }
}

/// Command that installs `package` non-interactively
pub(crate) fn install_command(
    family: PlatformFamily,
    package: &str,
) -> (&'static str, Vec<String>) {
    match family {
        PlatformFamily::Debian => (
            "apt-get",
            vec![
                "install".to_string(),
                "-y".to_string(),
                "-q".to_string(),
                package.to_string(),
            ],
        ),
        PlatformFamily::Rhel => (
            "yum",
            vec!["install".to_string(), "-y".to_string(), package.to_string()],
        ),
    }
}

/// Environment for the install command
///
/// Debian packages may prompt through debconf; the prompts are disabled.
pub(crate) fn install_env(family: PlatformFamily) -> &'static [(&'static str, &'static str)] {
    match family {
        PlatformFamily::Debian => &[("DEBIAN_FRONTEND", "noninteractive")],
        PlatformFamily::Rhel => &[],
    }
}

#[async_trait]
impl PackageManager for SystemPackageManager {
    async fn install(&self, package: &str) -> Result<()> {
        if self.is_installed(package).await {
            tracing::info!(package = %package, "Package already installed");
            return Ok(());
        }

        let (program, args) = install_command(self.family, package);
        let envs = install_env(self.family);

        tracing::info!(package = %package, tool = %program, "Installing package");
        self.runner
            .run(program, &args, envs, &[], Stdin::Null)
            .await
            .map_err(|e| ProvisionError::PackageInstallFailure {
                package: package.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(package = %package, "Package installed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debian_commands() {
        let (program, args) = install_command(PlatformFamily::Debian, "zabbix-proxy-mysql");
        assert_eq!(program, "apt-get");
        assert_eq!(args, vec!["install", "-y", "-q", "zabbix-proxy-mysql"]);

        let (program, args) = query_command(PlatformFamily::Debian, "zabbix-proxy-mysql");
        assert_eq!(program, "dpkg-query");
        assert_eq!(args.last().map(String::as_str), Some("zabbix-proxy-mysql"));
    }

    #[test]
    fn test_rhel_commands() {
        let (program, args) = install_command(PlatformFamily::Rhel, "zabbix-server-pgsql");
        assert_eq!(program, "yum");
        assert_eq!(args, vec!["install", "-y", "zabbix-server-pgsql"]);

        let (program, _) = query_command(PlatformFamily::Rhel, "zabbix-server-pgsql");
        assert_eq!(program, "rpm");
    }

    #[test]
    fn test_install_env() {
        assert_eq!(
            install_env(PlatformFamily::Debian),
            &[("DEBIAN_FRONTEND", "noninteractive")]
        );
        assert!(install_env(PlatformFamily::Rhel).is_empty());
    }
}
