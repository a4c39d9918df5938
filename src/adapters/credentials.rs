//! Data bag credential store
//!
//! Reads credential groups from a directory of JSON data bags:
//!
//! ```text
//! <root>/<group>/<item>.json
//! {
//!   "id": "users",
//!   "users": {
//!     "root":   { "options": { "password": "..." } },
//!     "zabbix": { "options": { "password": "...", "superuser": false } }
//!   }
//! }
//! ```
//!
//! User order follows the document.

use crate::adapters::traits::CredentialStore;
use crate::config::secret_string;
use crate::domain::errors::ProvisionError;
use crate::domain::{CredentialGroup, Result, UserCredential};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Credential store backed by data bag files
#[derive(Debug, Clone)]
pub struct DataBagStore {
    root: PathBuf,
    item: String,
}

impl DataBagStore {
    /// Creates a store rooted at `root`, reading `<item>.json` per group
    pub fn new(root: impl Into<PathBuf>, item: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            item: item.into(),
        }
    }

    fn item_path(&self, group: &str) -> Result<PathBuf> {
        if group.is_empty()
            || group.contains('/')
            || group.contains('\\')
            || group.starts_with('.')
        {
            return Err(ProvisionError::CredentialStore(format!(
                "invalid credential group name '{group}'"
            )));
        }
        Ok(self.root.join(group).join(format!("{}.json", self.item)))
    }
}

#[async_trait]
impl CredentialStore for DataBagStore {
    async fn get(&self, group: &str) -> Result<CredentialGroup> {
        let path = self.item_path(group)?;

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(group = %group, path = %path.display(), "Data bag item not found");
                return Err(ProvisionError::EmptyCredentialGroup {
                    group: group.to_string(),
                });
            }
            Err(e) => {
                return Err(ProvisionError::CredentialStore(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        // Parse errors from serde_json quote input fragments, which may be a password
        let document: Value = serde_json::from_str(&contents).map_err(|e| {
            ProvisionError::CredentialStore(format!(
                "{} is not valid JSON (line {}, column {})",
                path.display(),
                e.line(),
                e.column()
            ))
        })?;

        let users = parse_users(group, &document)?;
        tracing::debug!(group = %group, users = users.len(), "Loaded credential group");
        Ok(CredentialGroup::new(group, users))
    }
}

fn parse_users(group: &str, document: &Value) -> Result<Vec<UserCredential>> {
    let Some(users) = document.get("users") else {
        return Ok(Vec::new());
    };
    let users = users.as_object().ok_or_else(|| {
        ProvisionError::CredentialStore(format!("'users' in group '{group}' must be an object"))
    })?;

    users
        .iter()
        .map(|(name, entry)| parse_user(group, name, entry))
        .collect()
}

fn parse_user(group: &str, name: &str, entry: &Value) -> Result<UserCredential> {
    let mut options: Map<String, Value> = entry
        .get("options")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let password = match options.remove("password") {
        Some(Value::String(password)) => password,
        _ => {
            return Err(ProvisionError::CredentialStore(format!(
                "user '{name}' in group '{group}' has no options.password string"
            )))
        }
    };

    Ok(UserCredential {
        name: name.to_string(),
        password: secret_string(password),
        attributes: options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    fn write_bag(dir: &TempDir, group: &str, body: &str) {
        let group_dir = dir.path().join(group);
        std::fs::create_dir_all(&group_dir).unwrap();
        std::fs::write(group_dir.join("users.json"), body).unwrap();
    }

    #[tokio::test]
    async fn test_reads_users_in_document_order() {
        let dir = TempDir::new().unwrap();
        write_bag(
            &dir,
            "zabbix-pg",
            r#"{"id":"users","users":{
                "zabbix":{"options":{"password":"pw1","superuser":false}},
                "audit":{"options":{"password":"pw2"}}
            }}"#,
        );

        let store = DataBagStore::new(dir.path(), "users");
        let group = store.get("zabbix-pg").await.unwrap();

        assert_eq!(group.len(), 2);
        assert_eq!(group.first().unwrap().name, "zabbix");
        assert_eq!(group.first().unwrap().password.expose_secret(), "pw1");
        assert_eq!(
            group.first().unwrap().attributes.get("superuser"),
            Some(&Value::Bool(false))
        );
        assert!(group.get("audit").is_some());
    }

    #[tokio::test]
    async fn test_unknown_group_is_empty_group() {
        let dir = TempDir::new().unwrap();
        let store = DataBagStore::new(dir.path(), "users");
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, ProvisionError::EmptyCredentialGroup { .. }));
    }

    #[tokio::test]
    async fn test_missing_users_key_is_empty() {
        let dir = TempDir::new().unwrap();
        write_bag(&dir, "empty", r#"{"id":"users"}"#);
        let store = DataBagStore::new(dir.path(), "users");
        assert!(store.get("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_without_password_rejected() {
        let dir = TempDir::new().unwrap();
        write_bag(&dir, "broken", r#"{"users":{"zabbix":{"options":{}}}}"#);
        let store = DataBagStore::new(dir.path(), "users");
        let err = store.get("broken").await.unwrap_err();
        assert!(matches!(err, ProvisionError::CredentialStore(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_does_not_echo_content() {
        let dir = TempDir::new().unwrap();
        write_bag(&dir, "bad", r#"{"users": {"zabbix": "s3cret"#);
        let store = DataBagStore::new(dir.path(), "users");
        let err = store.get("bad").await.unwrap_err();
        assert!(!err.to_string().contains("s3cret"));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let store = DataBagStore::new(dir.path(), "users");
        let err = store.get("../etc").await.unwrap_err();
        assert!(matches!(err, ProvisionError::CredentialStore(_)));
    }
}
