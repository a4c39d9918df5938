//! Administrative SQL statements that may embed passwords
//!
//! A [`SensitiveStatement`] keeps the executable text behind a secret and
//! carries a separate redacted rendering. `Display` and `Debug` only ever
//! print the redacted form, so a statement can be logged or put into an
//! error message without leaking what it carries.

use crate::config::{secret_string, SecretString};
use secrecy::ExposeSecret;
use std::fmt;

/// SQL statement with an explicit sensitivity marker
#[derive(Clone)]
pub struct SensitiveStatement {
    sql: SecretString,
    redacted: String,
    sensitive: bool,
}

impl SensitiveStatement {
    /// Statement with nothing secret in it
    pub fn plain(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        Self {
            redacted: sql.clone(),
            sql: secret_string(sql),
            sensitive: false,
        }
    }

    /// Statement embedding secrets; `redacted` is what logs will show
    pub fn sensitive(sql: String, redacted: impl Into<String>) -> Self {
        Self {
            sql: secret_string(sql),
            redacted: redacted.into(),
            sensitive: true,
        }
    }

    /// Executable SQL text
    pub fn expose(&self) -> &str {
        self.sql.expose_secret().as_ref()
    }

    /// Whether the statement carries secrets
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Loggable text
    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Display for SensitiveStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

impl fmt::Debug for SensitiveStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensitiveStatement")
            .field("sql", &self.redacted)
            .field("sensitive", &self.sensitive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REDACTED;

    #[test]
    fn test_password_never_displayed() {
        let stmt = SensitiveStatement::sensitive(
            "CREATE USER IF NOT EXISTS 'zabbix'@'%' IDENTIFIED BY 'hunter2'".to_string(),
            format!("CREATE USER IF NOT EXISTS 'zabbix'@'%' IDENTIFIED BY '{REDACTED}'"),
        );

        assert!(stmt.is_sensitive());
        assert!(stmt.expose().contains("hunter2"));
        assert!(!stmt.to_string().contains("hunter2"));
        assert!(!format!("{stmt:?}").contains("hunter2"));
        assert!(stmt.redacted().contains(REDACTED));
    }

    #[test]
    fn test_plain_statement() {
        let stmt = SensitiveStatement::plain("SELECT 1");
        assert!(!stmt.is_sensitive());
        assert_eq!(stmt.expose(), "SELECT 1");
        assert_eq!(stmt.to_string(), "SELECT 1");
    }
}
