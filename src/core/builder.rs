//! Configuration builder
//!
//! Merges the operator's base tree with the derived `db` section and prunes
//! keys the installed version no longer accepts.

use crate::config::REDACTED;
use crate::core::rules::apply_rules;
use crate::domain::{ConfigurationTree, DatabaseConnectionFacts, Role, Version, DB_SECTION};
use std::fmt;
use toml::Value;

/// Keys inside the `db` section whose values are never printed
const SENSITIVE_DB_KEYS: &[&str] = &["DBPassword"];

/// Final configuration for one run
///
/// Immutable once built. It embeds the database password, so `Debug` and
/// [`RenderedConfiguration::redacted`] mask it; only the renderer sees the
/// plain tree.
#[derive(Clone, PartialEq)]
pub struct RenderedConfiguration {
    tree: ConfigurationTree,
    role: Role,
    version: Version,
}

impl RenderedConfiguration {
    /// Plain tree, including secrets
    pub fn tree(&self) -> &ConfigurationTree {
        &self.tree
    }

    /// Role the configuration was built for
    pub fn role(&self) -> Role {
        self.role
    }

    /// Version the configuration was pruned for
    pub fn version(&self) -> Version {
        self.version
    }

    /// Copy of the tree with secret values replaced by a marker
    pub fn redacted(&self) -> ConfigurationTree {
        let mut tree = self.tree.clone();
        for key in SENSITIVE_DB_KEYS {
            if tree.contains(Some(DB_SECTION), key) {
                tree.insert(
                    Some(DB_SECTION),
                    *key,
                    Value::String(REDACTED.to_string()),
                );
            }
        }
        tree
    }
}

impl fmt::Debug for RenderedConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedConfiguration")
            .field("role", &self.role)
            .field("version", &self.version)
            .field("tree", &self.redacted())
            .finish()
    }
}

/// Builds the final configuration
///
/// Right-biased deep merge of `base` with `{db: facts}` followed by the
/// version rules. The result holds every key of `base` except the ones the
/// rules remove.
///
/// # Examples
///
/// ```
/// use zbx_provision::config::secret_string;
/// use zbx_provision::core::builder::build;
/// use zbx_provision::domain::{ConfigurationTree, DatabaseConnectionFacts, Role, Version};
///
/// let base = ConfigurationTree::from_toml_str("[db]\nDBHost = \"old\"").unwrap();
/// let facts = DatabaseConnectionFacts {
///     name: "zabbix".to_string(),
///     host: "new".to_string(),
///     port: 5432,
///     user: "zabbix".to_string(),
///     password: secret_string("pw".to_string()),
/// };
///
/// let rendered = build(&base, &facts, Version::new(4, 0), Role::Server);
/// let host = rendered.tree().get(Some("db"), "DBHost").unwrap();
/// assert_eq!(host.as_str(), Some("new"));
/// ```
pub fn build(
    base: &ConfigurationTree,
    facts: &DatabaseConnectionFacts,
    version: Version,
    role: Role,
) -> RenderedConfiguration {
    let mut merged = base.clone();
    merged.deep_merge(facts.to_tree());

    RenderedConfiguration {
        tree: apply_rules(merged, version, role),
        role,
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn facts() -> DatabaseConnectionFacts {
        DatabaseConnectionFacts {
            name: "zabbix".to_string(),
            host: "10.0.0.5".to_string(),
            port: 5432,
            user: "zabbix".to_string(),
            password: secret_string("pa55word".to_string()),
        }
    }

    fn tree(input: &str) -> ConfigurationTree {
        ConfigurationTree::from_toml_str(input).unwrap()
    }

    #[test]
    fn test_db_facts_override_base() {
        let base = tree("[db]\nDBHost = \"old\"\nDBSchema = \"public\"");
        let rendered = build(&base, &facts(), Version::new(4, 0), Role::Server);

        let db = rendered.tree().section("db").unwrap();
        assert_eq!(db.get("DBHost").unwrap().as_str(), Some("10.0.0.5"));
        assert_eq!(db.get("DBSchema").unwrap().as_str(), Some("public"));
        assert_eq!(db.get("DBPort").unwrap().as_integer(), Some(5432));
    }

    #[test]
    fn test_server_4_0_scenario() {
        let base = tree("SenderFrequency = 5\n[cache]\nHistoryTextCacheSize = 100");
        let rendered = build(&base, &facts(), Version::new(4, 0), Role::Server);

        assert!(!rendered.tree().contains(Some("cache"), "HistoryTextCacheSize"));
        assert!(!rendered.tree().contains(None, "SenderFrequency"));
        for key in ["DBName", "DBPassword", "DBUser", "DBHost", "DBPort"] {
            assert!(rendered.tree().contains(Some("db"), key), "db.{key} missing");
        }
    }

    #[test]
    fn test_proxy_3_2_keeps_trend_cache() {
        let base = tree("[cache]\nTrendCacheSize = 10");
        let rendered = build(&base, &facts(), Version::new(3, 2), Role::Proxy);
        assert!(rendered.tree().contains(Some("cache"), "TrendCacheSize"));
    }

    #[test]
    fn test_output_is_superset_of_base_minus_pruned() {
        let base = tree("Timeout = 4\nLogFileSize = 0\n[workers]\nStartPollers = 5");
        let rendered = build(&base, &facts(), Version::new(5, 0), Role::Proxy);
        for (key, _) in base.as_table() {
            assert!(rendered.tree().as_table().contains_key(key));
        }
        assert!(rendered.tree().contains(Some("workers"), "StartPollers"));
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = tree("SenderFrequency = 5");
        let _ = build(&base, &facts(), Version::new(4, 0), Role::Server);
        assert!(base.contains(None, "SenderFrequency"));
    }

    #[test]
    fn test_debug_and_redacted_hide_password() {
        let rendered = build(&tree(""), &facts(), Version::new(4, 0), Role::Server);
        assert!(!format!("{rendered:?}").contains("pa55word"));

        let redacted = rendered.redacted();
        assert_eq!(
            redacted.get(Some("db"), "DBPassword").unwrap().as_str(),
            Some(REDACTED)
        );
        assert_eq!(
            rendered.tree().get(Some("db"), "DBPassword").unwrap().as_str(),
            Some("pa55word")
        );
    }
}
