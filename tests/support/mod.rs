//! Fake collaborators shared by the integration tests
//!
//! Each fake records what the orchestrator asked of it. The MySQL fake keeps
//! enough state (databases, accounts, grants) to observe idempotency.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Map;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zbx_provision::adapters::command::CommandError;
use zbx_provision::adapters::render::ConfFileRenderer;
use zbx_provision::adapters::{
    AdminConnection, AdminExecutor, CredentialStore, PackageManager, PrimaryDatabaseProvisioner,
    PrimaryDatabaseRequest, ServiceManager,
};
use zbx_provision::config::{secret_string, ProvisionConfig};
use zbx_provision::core::Collaborators;
use zbx_provision::domain::{CredentialGroup, ProvisionError, Result, SensitiveStatement, UserCredential};

pub fn user(name: &str, password: &str) -> UserCredential {
    UserCredential {
        name: name.to_string(),
        password: secret_string(password.to_string()),
        attributes: Map::new(),
    }
}

pub fn group(name: &str, users: &[(&str, &str)]) -> CredentialGroup {
    CredentialGroup::new(
        name,
        users.iter().map(|(n, p)| user(n, p)).collect(),
    )
}

/// In-memory credential store
#[derive(Default)]
pub struct FakeCredentialStore {
    groups: BTreeMap<String, CredentialGroup>,
    pub lookups: Mutex<Vec<String>>,
}

impl FakeCredentialStore {
    pub fn with_group(mut self, group: CredentialGroup) -> Self {
        self.groups.insert(group.name().to_string(), group);
        self
    }
}

#[async_trait]
impl CredentialStore for FakeCredentialStore {
    async fn get(&self, group: &str) -> Result<CredentialGroup> {
        self.lookups.lock().unwrap().push(group.to_string());
        match self.groups.get(group) {
            Some(found) if !found.is_empty() => Ok(found.clone()),
            _ => Err(ProvisionError::EmptyCredentialGroup {
                group: group.to_string(),
            }),
        }
    }
}

/// Package manager that remembers installs
#[derive(Default)]
pub struct RecordingPackageManager {
    pub installed: Mutex<Vec<String>>,
}

#[async_trait]
impl PackageManager for RecordingPackageManager {
    async fn install(&self, package: &str) -> Result<()> {
        let mut installed = self.installed.lock().unwrap();
        if !installed.iter().any(|p| p == package) {
            installed.push(package.to_string());
        }
        Ok(())
    }
}

/// MySQL server simulated at the statement level
#[derive(Default)]
pub struct SimulatedMySql {
    pub databases: Mutex<BTreeSet<String>>,
    pub accounts: Mutex<BTreeSet<String>>,
    pub grants: Mutex<BTreeSet<(String, String)>>,
    /// Statements as they would appear in a log
    pub redacted_log: Mutex<Vec<String>>,
    /// Statements as sent to the server
    pub executed: Mutex<Vec<String>>,
    /// Users that connected
    pub connections: Mutex<Vec<String>>,
    pub fail_on: Mutex<Option<String>>,
}

impl SimulatedMySql {
    pub fn fail_on(&self, fragment: &str) {
        *self.fail_on.lock().unwrap() = Some(fragment.to_string());
    }

    fn error(stderr: String) -> CommandError {
        CommandError::Failed {
            program: "mysql".to_string(),
            status: "exit status: 1".to_string(),
            stderr,
        }
    }

    fn quoted(sql: &str, open: char, close: char) -> Vec<String> {
        let mut values = Vec::new();
        let mut rest = sql;
        while let Some(start) = rest.find(open) {
            let after = &rest[start + 1..];
            match after.find(close) {
                Some(end) => {
                    values.push(after[..end].to_string());
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }
        values
    }
}

#[async_trait]
impl AdminExecutor for SimulatedMySql {
    async fn execute(
        &self,
        connection: &AdminConnection,
        statement: &SensitiveStatement,
    ) -> std::result::Result<(), CommandError> {
        let sql = statement.expose().to_string();
        self.connections.lock().unwrap().push(connection.user.clone());

        if let Some(fragment) = self.fail_on.lock().unwrap().as_deref() {
            if sql.contains(fragment) {
                return Err(Self::error(format!("ERROR 1064 near '{sql}'")));
            }
        }

        let if_not_exists = sql.contains("IF NOT EXISTS");
        if sql.starts_with("CREATE DATABASE") {
            if let Some(db) = Self::quoted(&sql, '`', '`').first() {
                let created = self.databases.lock().unwrap().insert(db.clone());
                if !created && !if_not_exists {
                    return Err(Self::error(format!(
                        "ERROR 1007 (HY000): Can't create database '{db}'; database exists"
                    )));
                }
            }
        } else if sql.starts_with("CREATE USER") {
            if let Some(name) = Self::quoted(&sql, '\'', '\'').first() {
                let created = self.accounts.lock().unwrap().insert(name.clone());
                if !created && !if_not_exists {
                    return Err(Self::error(format!(
                        "ERROR 1396 (HY000): Operation CREATE USER failed for '{name}'"
                    )));
                }
            }
        } else if sql.starts_with("GRANT") {
            let db = Self::quoted(&sql, '`', '`').first().cloned().unwrap_or_default();
            if let Some(name) = Self::quoted(&sql, '\'', '\'').first() {
                self.grants.lock().unwrap().insert((db, name.clone()));
            }
        }

        self.redacted_log
            .lock()
            .unwrap()
            .push(statement.redacted().to_string());
        self.executed.lock().unwrap().push(sql);
        Ok(())
    }

    async fn query(
        &self,
        connection: &AdminConnection,
        _statement: &SensitiveStatement,
    ) -> std::result::Result<Vec<String>, CommandError> {
        self.connections.lock().unwrap().push(connection.user.clone());
        Ok(Vec::new())
    }

    async fn import_file(
        &self,
        _connection: &AdminConnection,
        _database: &str,
        _path: &Path,
    ) -> std::result::Result<(), CommandError> {
        Ok(())
    }
}

/// Primary provisioner that remembers requests
#[derive(Default)]
pub struct RecordingPrimary {
    pub requests: Mutex<Vec<PrimaryDatabaseRequest>>,
}

#[async_trait]
impl PrimaryDatabaseProvisioner for RecordingPrimary {
    async fn ensure(&self, request: &PrimaryDatabaseRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Service manager that remembers actions
#[derive(Default)]
pub struct RecordingServiceManager {
    pub enabled: Mutex<Vec<String>>,
    pub restarted: Mutex<Vec<String>>,
}

#[async_trait]
impl ServiceManager for RecordingServiceManager {
    async fn enable(&self, service: &str) -> Result<()> {
        self.enabled.lock().unwrap().push(service.to_string());
        Ok(())
    }

    async fn restart(&self, service: &str) -> Result<()> {
        self.restarted.lock().unwrap().push(service.to_string());
        Ok(())
    }
}

/// A host: fakes plus a temporary filesystem for rendered files
pub struct TestHost {
    pub dir: TempDir,
    pub credentials: Arc<FakeCredentialStore>,
    pub packages: Arc<RecordingPackageManager>,
    pub mysql: Arc<SimulatedMySql>,
    pub primary: Arc<RecordingPrimary>,
    pub services: Arc<RecordingServiceManager>,
}

impl TestHost {
    pub fn new(credentials: FakeCredentialStore) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            credentials: Arc::new(credentials),
            packages: Arc::new(RecordingPackageManager::default()),
            mysql: Arc::new(SimulatedMySql::default()),
            primary: Arc::new(RecordingPrimary::default()),
            services: Arc::new(RecordingServiceManager::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            credentials: self.credentials.clone(),
            packages: self.packages.clone(),
            admin: self.mysql.clone(),
            primary: self.primary.clone(),
            renderer: Arc::new(ConfFileRenderer::new(0o640, None)),
            services: self.services.clone(),
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join("etc")
    }

    /// Parses `body` after substituting this host's directories
    pub fn config(&self, body: &str) -> ProvisionConfig {
        std::fs::create_dir_all(self.config_dir()).unwrap();
        let toml = body
            .replace("@CONFIG_DIR@", &self.config_dir().display().to_string())
            .replace(
                "@TEMPLATES_DIR@",
                &self.dir.path().join("templates").display().to_string(),
            );
        toml::from_str(&toml).unwrap()
    }

    pub fn rendered(&self, file: &str) -> String {
        std::fs::read_to_string(self.config_dir().join(file)).unwrap()
    }
}
