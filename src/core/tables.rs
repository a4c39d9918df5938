//! Lookup tables keyed by role and database vendor
//!
//! Branching on `(role, vendor)` goes through a [`RoleVendorTable`] instead of
//! nested conditionals. A table is checked for exhaustiveness when it is
//! built, so a missing combination fails at startup and every later lookup
//! is infallible.

use crate::domain::errors::ProvisionError;
use crate::domain::result::Result;
use crate::domain::{DatabaseVendor, PlatformFamily, Role};
use std::fmt;

/// Total mapping from `(Role, DatabaseVendor)` to `T`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleVendorTable<T> {
    cells: [[T; 2]; 2],
}

fn role_index(role: Role) -> usize {
    match role {
        Role::Server => 0,
        Role::Proxy => 1,
    }
}

fn vendor_index(vendor: DatabaseVendor) -> usize {
    match vendor {
        DatabaseVendor::PostgreSQL => 0,
        DatabaseVendor::MySQL => 1,
    }
}

impl<T: Clone + fmt::Debug> RoleVendorTable<T> {
    /// Builds a table, requiring exactly one entry per combination
    ///
    /// # Errors
    ///
    /// [`ProvisionError::Configuration`] naming the table and the duplicate
    /// or missing combination.
    pub fn from_entries(name: &str, entries: &[((Role, DatabaseVendor), T)]) -> Result<Self> {
        let mut cells: [[Option<T>; 2]; 2] = Default::default();

        for ((role, vendor), value) in entries {
            let cell = &mut cells[role_index(*role)][vendor_index(*vendor)];
            if cell.is_some() {
                return Err(ProvisionError::Configuration(format!(
                    "{name} table has more than one entry for ({role}, {vendor})"
                )));
            }
            *cell = Some(value.clone());
        }

        let mut missing = Vec::new();
        for role in Role::ALL {
            for vendor in DatabaseVendor::ALL {
                if cells[role_index(role)][vendor_index(vendor)].is_none() {
                    missing.push(format!("({role}, {vendor})"));
                }
            }
        }
        if !missing.is_empty() {
            return Err(ProvisionError::Configuration(format!(
                "{name} table has no entry for {}",
                missing.join(", ")
            )));
        }

        let [[a, b], [c, d]] = cells;
        match (a, b, c, d) {
            (Some(a), Some(b), Some(c), Some(d)) => Ok(Self {
                cells: [[a, b], [c, d]],
            }),
            _ => Err(ProvisionError::Configuration(format!(
                "{name} table is incomplete"
            ))),
        }
    }

    /// Value for a combination
    pub fn get(&self, role: Role, vendor: DatabaseVendor) -> &T {
        &self.cells[role_index(role)][vendor_index(vendor)]
    }
}

/// How the proxy's local store is prepared before the daemon starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalStoreBootstrap {
    /// Nothing to bootstrap locally
    Skip,
    /// Create the MySQL database and grant the declared users
    MySql,
}

/// Package installed for each role and vendor
pub fn package_table() -> Result<RoleVendorTable<&'static str>> {
    RoleVendorTable::from_entries(
        "package",
        &[
            ((Role::Server, DatabaseVendor::PostgreSQL), "zabbix-server-pgsql"),
            ((Role::Server, DatabaseVendor::MySQL), "zabbix-server-mysql"),
            ((Role::Proxy, DatabaseVendor::PostgreSQL), "zabbix-proxy-pgsql"),
            ((Role::Proxy, DatabaseVendor::MySQL), "zabbix-proxy-mysql"),
        ],
    )
}

/// Local store bootstrap, keyed by role and the proxy's local store vendor
pub fn bootstrap_table() -> Result<RoleVendorTable<LocalStoreBootstrap>> {
    RoleVendorTable::from_entries(
        "bootstrap",
        &[
            ((Role::Server, DatabaseVendor::PostgreSQL), LocalStoreBootstrap::Skip),
            ((Role::Server, DatabaseVendor::MySQL), LocalStoreBootstrap::Skip),
            ((Role::Proxy, DatabaseVendor::PostgreSQL), LocalStoreBootstrap::Skip),
            ((Role::Proxy, DatabaseVendor::MySQL), LocalStoreBootstrap::MySql),
        ],
    )
}

/// Daemon configuration file name for a role
pub fn config_file_name(role: Role) -> &'static str {
    match role {
        Role::Server => "zabbix_server.conf",
        Role::Proxy => "zabbix_proxy.conf",
    }
}

/// Service name used when `zabbix.service` is unset
pub fn default_service_name(role: Role) -> &'static str {
    match role {
        Role::Server => "zabbix-server",
        Role::Proxy => "zabbix-proxy",
    }
}

/// Packages installed next to the Zabbix package on a platform
pub fn platform_extra_packages(family: PlatformFamily) -> &'static [&'static str] {
    match family {
        PlatformFamily::Debian => &["snmp-mibs-downloader"],
        PlatformFamily::Rhel => &[],
    }
}
