//! Credential resolution
//!
//! Turns a configured group reference into a non-empty [`CredentialGroup`]
//! and picks the users individual steps need out of it.

use crate::adapters::traits::CredentialStore;
use crate::domain::errors::ProvisionError;
use crate::domain::{CredentialGroup, DatabaseVendor, Result, UserCredential};
use std::sync::Arc;

/// Resolves credential groups from a [`CredentialStore`]
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Resolves the group configured at `path`
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::MissingCredentialGroup`] when `group` is unset or blank
    /// - [`ProvisionError::EmptyCredentialGroup`] when the store has no users for it
    /// - store errors as returned by the store
    pub async fn resolve(&self, path: &str, group: Option<&str>) -> Result<CredentialGroup> {
        let group = group
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .ok_or_else(|| ProvisionError::MissingCredentialGroup {
                path: path.to_string(),
            })?;

        let resolved = self.store.get(group).await?;
        if resolved.is_empty() {
            return Err(ProvisionError::EmptyCredentialGroup {
                group: group.to_string(),
            });
        }

        tracing::debug!(group = %group, users = resolved.len(), "Resolved credential group");
        Ok(resolved)
    }
}

/// Looks up `user` in `group`
///
/// # Errors
///
/// [`ProvisionError::MissingCredential`] when the group has no such user.
pub fn require_user<'a>(group: &'a CredentialGroup, user: &str) -> Result<&'a UserCredential> {
    group
        .get(user)
        .ok_or_else(|| ProvisionError::MissingCredential {
            group: group.name().to_string(),
            user: user.to_string(),
        })
}

/// User the Zabbix daemon connects to its primary database as
///
/// PostgreSQL uses the first user of the group; MySQL uses the configured
/// application user.
pub fn primary_user<'a>(
    vendor: DatabaseVendor,
    group: &'a CredentialGroup,
    mysql_user: &str,
) -> Result<&'a UserCredential> {
    match vendor {
        DatabaseVendor::PostgreSQL => {
            group
                .first()
                .ok_or_else(|| ProvisionError::EmptyCredentialGroup {
                    group: group.name().to_string(),
                })
        }
        DatabaseVendor::MySQL => require_user(group, mysql_user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapStore(HashMap<String, Vec<(&'static str, &'static str)>>);

    #[async_trait]
    impl CredentialStore for MapStore {
        async fn get(&self, group: &str) -> Result<CredentialGroup> {
            let users = self
                .0
                .get(group)
                .map(|users| {
                    users
                        .iter()
                        .map(|(name, pw)| UserCredential {
                            name: name.to_string(),
                            password: secret_string(pw.to_string()),
                            attributes: Default::default(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Ok(CredentialGroup::new(group, users))
        }
    }

    fn resolver() -> CredentialResolver {
        let mut groups = HashMap::new();
        groups.insert(
            "pg".to_string(),
            vec![("zabbix", "pw1"), ("readonly", "pw2")],
        );
        groups.insert("mysql".to_string(), vec![("root", "r"), ("zabbix", "z")]);
        groups.insert("empty".to_string(), vec![]);
        CredentialResolver::new(Arc::new(MapStore(groups)))
    }

    #[tokio::test]
    async fn test_unset_group_names_path() {
        let err = resolver()
            .resolve("database.postgresql.credential_group", None)
            .await
            .unwrap_err();
        match err {
            ProvisionError::MissingCredentialGroup { path } => {
                assert_eq!(path, "database.postgresql.credential_group")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_blank_group_is_missing() {
        let err = resolver().resolve("p", Some("  ")).await.unwrap_err();
        assert!(matches!(err, ProvisionError::MissingCredentialGroup { .. }));
    }

    #[tokio::test]
    async fn test_empty_and_unknown_groups() {
        for group in ["empty", "nope"] {
            let err = resolver().resolve("p", Some(group)).await.unwrap_err();
            assert!(matches!(err, ProvisionError::EmptyCredentialGroup { .. }));
        }
    }

    #[tokio::test]
    async fn test_primary_user_selection() {
        let resolver = resolver();
        let pg = resolver.resolve("p", Some("pg")).await.unwrap();
        assert_eq!(
            primary_user(DatabaseVendor::PostgreSQL, &pg, "zabbix").unwrap().name,
            "zabbix"
        );

        let mysql = resolver.resolve("p", Some("mysql")).await.unwrap();
        assert_eq!(
            primary_user(DatabaseVendor::MySQL, &mysql, "zabbix").unwrap().name,
            "zabbix"
        );

        let err = primary_user(DatabaseVendor::MySQL, &pg, "zabbix_app").unwrap_err();
        assert!(matches!(err, ProvisionError::MissingCredential { .. }));
    }
}
