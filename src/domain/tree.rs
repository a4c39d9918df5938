//! Configuration tree
//!
//! A [`ConfigurationTree`] is the nested key/value structure that ends up in
//! `zabbix_server.conf` / `zabbix_proxy.conf`. Top-level scalars are plain
//! settings; top-level tables are sections (`cache`, `workers`, `hk`, `db`,
//! ...) whose keys are rendered in their own block.

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

/// Nested mapping of configuration keys to scalar, array or table values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationTree(Table);

impl ConfigurationTree {
    /// Creates an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing TOML table
    pub fn from_table(table: Table) -> Self {
        Self(table)
    }

    /// Parses a tree from TOML text
    pub fn from_toml_str(input: &str) -> crate::domain::Result<Self> {
        Ok(Self(toml::from_str(input)?))
    }

    /// Borrows the underlying table
    pub fn as_table(&self) -> &Table {
        &self.0
    }

    /// Whether the tree has no keys at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a key, either at the top level or inside `section`
    pub fn get(&self, section: Option<&str>, key: &str) -> Option<&Value> {
        match section {
            None => self.0.get(key),
            Some(section) => self.section(section)?.get(key),
        }
    }

    /// Whether `key` exists (at the top level or inside `section`)
    pub fn contains(&self, section: Option<&str>, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// Borrows a section table
    pub fn section(&self, name: &str) -> Option<&Table> {
        self.0.get(name).and_then(Value::as_table)
    }

    /// Inserts a value at the top level or inside `section`
    ///
    /// The section is created when missing. A scalar occupying the section's
    /// name is replaced by the new table.
    pub fn insert(&mut self, section: Option<&str>, key: impl Into<String>, value: Value) {
        match section {
            None => {
                self.0.insert(key.into(), value);
            }
            Some(section) => {
                let entry = self
                    .0
                    .entry(section.to_string())
                    .or_insert(Value::Table(Table::new()));
                if !entry.is_table() {
                    *entry = Value::Table(Table::new());
                }
                if let Value::Table(table) = entry {
                    table.insert(key.into(), value);
                }
            }
        }
    }

    /// Removes a key, returning its value when present
    ///
    /// A missing key or missing section is not an error.
    pub fn remove(&mut self, section: Option<&str>, key: &str) -> Option<Value> {
        match section {
            None => self.0.remove(key),
            Some(section) => self
                .0
                .get_mut(section)
                .and_then(Value::as_table_mut)
                .and_then(|table| table.remove(key)),
        }
    }

    /// Right-biased deep merge of `other` into `self`
    ///
    /// Scalars and arrays from `other` replace those in `self`; tables on both
    /// sides are merged key by key so neither side wipes out the other.
    ///
    /// # Examples
    ///
    /// ```
    /// use zbx_provision::domain::ConfigurationTree;
    ///
    /// let mut base = ConfigurationTree::from_toml_str(
    ///     "[db]\nDBHost = \"old\"\nDBName = \"zabbix\"",
    /// ).unwrap();
    /// let facts = ConfigurationTree::from_toml_str("[db]\nDBHost = \"new\"").unwrap();
    /// base.deep_merge(facts);
    ///
    /// assert_eq!(base.get(Some("db"), "DBHost").unwrap().as_str(), Some("new"));
    /// assert_eq!(base.get(Some("db"), "DBName").unwrap().as_str(), Some("zabbix"));
    /// ```
    pub fn deep_merge(&mut self, other: ConfigurationTree) {
        merge_tables(&mut self.0, other.0);
    }
}

fn merge_tables(left: &mut Table, right: Table) {
    for (key, right_value) in right {
        let Value::Table(right_table) = right_value else {
            left.insert(key, right_value);
            continue;
        };
        if let Some(Value::Table(left_table)) = left.get_mut(&key) {
            merge_tables(left_table, right_table);
            continue;
        }
        left.insert(key, Value::Table(right_table));
    }
}

impl From<Table> for ConfigurationTree {
    fn from(table: Table) -> Self {
        Self(table)
    }
}
