//! Role, database vendor and platform family
//!
//! These are parsed from operator-provided strings. Parsing is the only place
//! where an unknown role or vendor can enter the system, so every later step
//! works with the closed enums.

use crate::domain::errors::ProvisionError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the host runs the central Zabbix server or a proxy relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Central server
    Server,
    /// Proxy relay with its own local store
    Proxy,
}

impl Role {
    /// Every role, in table order
    pub const ALL: [Role; 2] = [Role::Server, Role::Proxy];

    /// Parses a role value taken from `zabbix.role`
    ///
    /// Empty, absent and unknown values all fail with
    /// [`ProvisionError::InvalidRole`].
    ///
    /// # Examples
    ///
    /// ```
    /// use zbx_provision::domain::Role;
    ///
    /// assert_eq!(Role::parse("proxy").unwrap(), Role::Proxy);
    /// assert!(Role::parse("").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Role::Server),
            "proxy" => Ok(Role::Proxy),
            _ => Err(ProvisionError::InvalidRole {
                value: value.to_string(),
            }),
        }
    }

    /// Lowercase name as used in package names and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Server => "server",
            Role::Proxy => "proxy",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relational database engine backing persistent storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatabaseVendor {
    /// PostgreSQL
    #[serde(rename = "postgresql")]
    PostgreSQL,
    /// MySQL / MariaDB
    #[serde(rename = "mysql")]
    MySQL,
}

impl DatabaseVendor {
    /// Every vendor, in table order
    pub const ALL: [DatabaseVendor; 2] = [DatabaseVendor::PostgreSQL, DatabaseVendor::MySQL];

    /// Parses a vendor value; `path` names the configuration key it came from
    pub fn parse(value: &str, path: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgresql" => Ok(DatabaseVendor::PostgreSQL),
            "mysql" => Ok(DatabaseVendor::MySQL),
            _ => Err(ProvisionError::InvalidVendor {
                path: path.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Configuration name (`postgresql` / `mysql`)
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseVendor::PostgreSQL => "postgresql",
            DatabaseVendor::MySQL => "mysql",
        }
    }
}

impl fmt::Display for DatabaseVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system family, which decides the package tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    /// Debian, Ubuntu (apt)
    Debian,
    /// RHEL, CentOS, Rocky, Alma (yum)
    Rhel,
}

impl PlatformFamily {
    /// Detects the family from the contents of `/etc/os-release`
    ///
    /// Looks at `ID` and `ID_LIKE`. Returns `None` for families this tool
    /// has no package tool for.
    pub fn from_os_release(contents: &str) -> Option<Self> {
        let mut ids = Vec::new();
        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key == "ID" || key == "ID_LIKE" {
                let value = value.trim_matches('"');
                ids.extend(value.split_whitespace().map(str::to_ascii_lowercase));
            }
        }

        if ids.iter().any(|id| id == "debian" || id == "ubuntu") {
            Some(PlatformFamily::Debian)
        } else if ids
            .iter()
            .any(|id| matches!(id.as_str(), "rhel" | "centos" | "fedora" | "rocky" | "almalinux"))
        {
            Some(PlatformFamily::Rhel)
        } else {
            None
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFamily::Debian => f.write_str("debian"),
            PlatformFamily::Rhel => f.write_str("rhel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("server", Role::Server; "lowercase server")]
    #[test_case("proxy", Role::Proxy; "lowercase proxy")]
    #[test_case(" Proxy ", Role::Proxy; "padded mixed case")]
    fn test_role_parse_valid(input: &str, expected: Role) {
        assert_eq!(Role::parse(input).unwrap(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("agent"; "unknown role")]
    #[test_case("servers"; "near miss")]
    fn test_role_parse_invalid(input: &str) {
        let err = Role::parse(input).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidRole { .. }));
    }

    #[test]
    fn test_vendor_parse() {
        assert_eq!(
            DatabaseVendor::parse("postgresql", "database.vendor").unwrap(),
            DatabaseVendor::PostgreSQL
        );
        assert_eq!(
            DatabaseVendor::parse("MySQL", "database.vendor").unwrap(),
            DatabaseVendor::MySQL
        );
    }

    #[test]
    fn test_vendor_parse_invalid_keeps_path() {
        let err = DatabaseVendor::parse("sqlite", "database.proxy_store").unwrap_err();
        match err {
            ProvisionError::InvalidVendor { path, value } => {
                assert_eq!(path, "database.proxy_store");
                assert_eq!(value, "sqlite");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_platform_family_from_os_release() {
        let ubuntu = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n";
        assert_eq!(
            PlatformFamily::from_os_release(ubuntu),
            Some(PlatformFamily::Debian)
        );

        let rocky = "NAME=\"Rocky Linux\"\nID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\n";
        assert_eq!(
            PlatformFamily::from_os_release(rocky),
            Some(PlatformFamily::Rhel)
        );

        assert_eq!(PlatformFamily::from_os_release("ID=alpine\n"), None);
    }
}
