//! Database connection facts derived during a run

use crate::config::SecretString;
use crate::domain::tree::ConfigurationTree;
use secrecy::ExposeSecret;
use toml::{Table, Value};

/// Section the facts are injected under
pub const DB_SECTION: &str = "db";

/// Connection settings the Zabbix daemon uses for its database
///
/// Derived from the vendor's configuration and the resolved credential
/// group; never declared by the operator directly.
#[derive(Debug, Clone)]
pub struct DatabaseConnectionFacts {
    /// Database name (`DBName`)
    pub name: String,
    /// Host (`DBHost`)
    pub host: String,
    /// Port (`DBPort`)
    pub port: u16,
    /// User (`DBUser`)
    pub user: String,
    /// Password (`DBPassword`)
    pub password: SecretString,
}

impl DatabaseConnectionFacts {
    /// Builds the `{db: {...}}` subtree merged over the base configuration
    ///
    /// The returned tree holds the plain password; it must only flow into
    /// the rendered configuration, which is itself treated as sensitive.
    pub fn to_tree(&self) -> ConfigurationTree {
        let mut db = Table::new();
        db.insert("DBName".to_string(), Value::String(self.name.clone()));
        db.insert(
            "DBPassword".to_string(),
            Value::String(self.password.expose_secret().as_ref().to_string()),
        );
        db.insert("DBUser".to_string(), Value::String(self.user.clone()));
        db.insert("DBHost".to_string(), Value::String(self.host.clone()));
        db.insert("DBPort".to_string(), Value::Integer(i64::from(self.port)));

        let mut root = Table::new();
        root.insert(DB_SECTION.to_string(), Value::Table(db));
        ConfigurationTree::from_table(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_to_tree_populates_db_section() {
        let facts = DatabaseConnectionFacts {
            name: "zabbix".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5432,
            user: "zabbix".to_string(),
            password: secret_string("s3cret".to_string()),
        };

        let tree = facts.to_tree();
        let db = tree.section(DB_SECTION).unwrap();
        assert_eq!(db.get("DBName").unwrap().as_str(), Some("zabbix"));
        assert_eq!(db.get("DBPassword").unwrap().as_str(), Some("s3cret"));
        assert_eq!(db.get("DBUser").unwrap().as_str(), Some("zabbix"));
        assert_eq!(db.get("DBHost").unwrap().as_str(), Some("127.0.0.1"));
        assert_eq!(db.get("DBPort").unwrap().as_integer(), Some(5432));
    }

    #[test]
    fn test_debug_does_not_leak_password() {
        let facts = DatabaseConnectionFacts {
            name: "zabbix".to_string(),
            host: "db".to_string(),
            port: 3306,
            user: "zabbix".to_string(),
            password: secret_string("s3cret".to_string()),
        };
        assert!(!format!("{facts:?}").contains("s3cret"));
    }
}
