//! Version rule engine
//!
//! Zabbix drops configuration parameters between releases, and the daemon
//! refuses to start when it meets one it no longer knows. Each removal is a
//! [`VersionRule`] row in [`VERSION_RULES`]; [`apply_rules`] is the only code
//! that interprets them. Adding a rule is a table change.

use crate::domain::{ConfigurationTree, Role, Version};

/// A configuration key that becomes invalid at `min_version`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRule {
    /// First version at which the key is invalid
    pub min_version: Version,
    /// Section holding the key, `None` for top-level keys
    pub section: Option<&'static str>,
    /// Key to remove
    pub key: &'static str,
    /// Restrict the rule to one role, `None` for every role
    pub role: Option<Role>,
}

impl VersionRule {
    const fn any(min_version: Version, section: Option<&'static str>, key: &'static str) -> Self {
        Self {
            min_version,
            section,
            key,
            role: None,
        }
    }

    const fn proxy(min_version: Version, section: &'static str, key: &'static str) -> Self {
        Self {
            min_version,
            section: Some(section),
            key,
            role: Some(Role::Proxy),
        }
    }

    /// Whether the rule removes its key for this version and role
    pub fn applies_to(&self, version: Version, role: Role) -> bool {
        version >= self.min_version && self.role.map_or(true, |r| r == role)
    }

    /// Dotted path of the key, for logging
    pub fn path(&self) -> String {
        match self.section {
            Some(section) => format!("{section}.{}", self.key),
            None => self.key.to_string(),
        }
    }
}

const V3_0: Version = Version::new(3, 0);
const V3_4: Version = Version::new(3, 4);

/// Every known parameter removal
pub const VERSION_RULES: &[VersionRule] = &[
    VersionRule::any(V3_0, Some("cache"), "HistoryTextCacheSize"),
    VersionRule::any(V3_4, None, "SenderFrequency"),
    VersionRule::proxy(V3_4, "cache", "TrendCacheSize"),
    VersionRule::proxy(V3_4, "cache", "ValueCacheSize"),
    VersionRule::proxy(V3_4, "cache", "CacheUpdateFrequency"),
    VersionRule::proxy(V3_4, "cache", "HistoryCacheSize"),
    VersionRule::proxy(V3_4, "cache", "HistoryIndexCacheSize"),
    VersionRule::proxy(V3_4, "workers", "StartProxyPollers"),
    VersionRule::proxy(V3_4, "hk", "MaxHousekeeperDelete"),
];

/// Removes every key [`VERSION_RULES`] marks invalid for `version` and `role`
///
/// Pure: the input tree is consumed and the pruned tree returned. Keys or
/// sections that are already absent are skipped.
///
/// # Examples
///
/// ```
/// use zbx_provision::core::rules::apply_rules;
/// use zbx_provision::domain::{ConfigurationTree, Role, Version};
///
/// let tree = ConfigurationTree::from_toml_str("SenderFrequency = 5").unwrap();
/// let pruned = apply_rules(tree, Version::new(4, 0), Role::Server);
/// assert!(!pruned.contains(None, "SenderFrequency"));
/// ```
pub fn apply_rules(tree: ConfigurationTree, version: Version, role: Role) -> ConfigurationTree {
    apply_rule_set(tree, VERSION_RULES, version, role)
}

/// Same as [`apply_rules`] with an explicit rule table
pub fn apply_rule_set(
    mut tree: ConfigurationTree,
    rules: &[VersionRule],
    version: Version,
    role: Role,
) -> ConfigurationTree {
    for rule in rules.iter().filter(|rule| rule.applies_to(version, role)) {
        if tree.remove(rule.section, rule.key).is_some() {
            tracing::debug!(
                key = %rule.path(),
                min_version = %rule.min_version,
                version = %version,
                "Removed configuration key invalid for this version"
            );
        }
    }
    tree
}
