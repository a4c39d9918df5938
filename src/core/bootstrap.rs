//! Proxy local database bootstrap
//!
//! Creates the proxy's MySQL database and converges every declared user
//! onto it. Every statement is written so that running it again against an
//! already bootstrapped server is a no-op:
//!
//! 1. `CREATE DATABASE IF NOT EXISTS` with the configured charset/collation
//! 2. per user: `CREATE USER IF NOT EXISTS`, then `ALTER USER` so a changed
//!    password converges, then `GRANT ALL PRIVILEGES ON <db>.*`
//!
//! The administrative user (and `root`) only connects; it is never granted.

use crate::adapters::traits::{AdminConnection, AdminExecutor};
use crate::config::schema::is_identifier;
use crate::config::{SecretString, REDACTED};
use crate::domain::errors::ProvisionError;
use crate::domain::sql::{mysql_identifier, mysql_string, mysql_string_body};
use crate::domain::{Result, SensitiveStatement, UserCredential};
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Users never granted on the local store
const RESERVED_USERS: &[&str] = &["root"];

/// Host part of every created account
const ACCOUNT_HOST: &str = "%";

/// What to bootstrap
#[derive(Debug, Clone)]
pub struct BootstrapRequest<'a> {
    /// Administrative connection
    pub connection: AdminConnection,
    /// Database to create
    pub database: &'a str,
    /// Character set of the database
    pub character_set: &'a str,
    /// Collation of the database
    pub collate: &'a str,
    /// Users of the MySQL credential group, in store order
    pub users: &'a [UserCredential],
}

/// Users a request grants, in store order
pub fn granted_users<'a>(request: &'a BootstrapRequest<'_>) -> Vec<&'a UserCredential> {
    request
        .users
        .iter()
        .filter(|u| !RESERVED_USERS.contains(&u.name.as_str()) && u.name != request.connection.user)
        .collect()
}

/// Statements a bootstrap runs, in order
///
/// # Errors
///
/// [`ProvisionError::Validation`] when the database name, charset or
/// collation is not a plain identifier, or a user name is empty.
pub fn plan(request: &BootstrapRequest<'_>) -> Result<Vec<SensitiveStatement>> {
    let database = mysql_identifier(request.database)?;
    for (what, value) in [
        ("character set", request.character_set),
        ("collation", request.collate),
    ] {
        if !is_identifier(value) {
            return Err(ProvisionError::Validation(format!(
                "invalid {what} '{value}' (expected [A-Za-z0-9_]+)"
            )));
        }
    }

    let mut statements = vec![SensitiveStatement::plain(format!(
        "CREATE DATABASE IF NOT EXISTS {database} CHARACTER SET {} COLLATE {}",
        request.character_set, request.collate
    ))];

    for user in granted_users(request) {
        if user.name.trim().is_empty() {
            return Err(ProvisionError::Validation(
                "credential group contains a user with an empty name".to_string(),
            ));
        }
        let account = format!("{}@{}", mysql_string(&user.name), mysql_string(ACCOUNT_HOST));

        statements.push(identified_by(
            &format!("CREATE USER IF NOT EXISTS {account} IDENTIFIED BY"),
            &user.password,
        ));
        statements.push(identified_by(
            &format!("ALTER USER {account} IDENTIFIED BY"),
            &user.password,
        ));
        statements.push(SensitiveStatement::plain(format!(
            "GRANT ALL PRIVILEGES ON {database}.* TO {account}"
        )));
    }

    Ok(statements)
}

fn identified_by(prefix: &str, password: &SecretString) -> SensitiveStatement {
    let password: &str = password.expose_secret().as_ref();
    SensitiveStatement::sensitive(
        format!("{prefix} '{}'", mysql_string_body(password)),
        format!("{prefix} '{REDACTED}'"),
    )
}

/// Outcome of a bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSummary {
    /// Database ensured
    pub database: String,
    /// Users granted on it
    pub users: Vec<String>,
    /// Statements executed
    pub statements: usize,
}

/// Runs the bootstrap statements through an [`AdminExecutor`]
#[derive(Clone)]
pub struct DatabaseBootstrapper {
    executor: Arc<dyn AdminExecutor>,
}

impl DatabaseBootstrapper {
    pub fn new(executor: Arc<dyn AdminExecutor>) -> Self {
        Self { executor }
    }

    /// Bootstraps the local database
    ///
    /// Statements run one at a time; the first failure aborts the run.
    ///
    /// # Errors
    ///
    /// [`ProvisionError::DatabaseBootstrapFailure`] naming the failing
    /// statement in redacted form. Passwords never appear in the message.
    pub async fn bootstrap(&self, request: &BootstrapRequest<'_>) -> Result<BootstrapSummary> {
        let statements = plan(request)
            .map_err(|e| ProvisionError::DatabaseBootstrapFailure(e.to_string()))?;

        let mut secrets: Vec<&SecretString> = request.users.iter().map(|u| &u.password).collect();
        secrets.push(&request.connection.password);

        tracing::info!(
            database = %request.database,
            host = %request.connection.host,
            statements = statements.len(),
            "Bootstrapping local database"
        );

        for statement in &statements {
            self.executor
                .execute(&request.connection, statement)
                .await
                .map_err(|e| {
                    ProvisionError::DatabaseBootstrapFailure(format!(
                        "{statement}: {}",
                        e.redacted(&secrets)
                    ))
                })?;
        }

        let users: Vec<String> = granted_users(request)
            .into_iter()
            .map(|u| u.name.clone())
            .collect();
        tracing::info!(database = %request.database, users = ?users, "Local database ready");

        Ok(BootstrapSummary {
            database: request.database.to_string(),
            users,
            statements: statements.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn user(name: &str, password: &str) -> UserCredential {
        UserCredential {
            name: name.to_string(),
            password: secret_string(password.to_string()),
            attributes: Default::default(),
        }
    }

    fn request(users: &[UserCredential]) -> BootstrapRequest<'_> {
        BootstrapRequest {
            connection: AdminConnection {
                host: "127.0.0.1".to_string(),
                port: 3306,
                user: "root".to_string(),
                password: secret_string("r00t".to_string()),
            },
            database: "zabbix_proxy",
            character_set: "utf8",
            collate: "utf8_bin",
            users,
        }
    }

    #[test]
    fn test_plan_excludes_root() {
        let users = vec![user("root", "r00t"), user("zabbix", "z"), user("ro", "r")];
        let statements = plan(&request(&users)).unwrap();

        assert_eq!(statements.len(), 1 + 2 * 3);
        assert_eq!(
            statements[0].expose(),
            "CREATE DATABASE IF NOT EXISTS `zabbix_proxy` CHARACTER SET utf8 COLLATE utf8_bin"
        );
        assert!(statements.iter().all(|s| !s.expose().contains("'root'")));
        assert_eq!(
            statements[3].expose(),
            "GRANT ALL PRIVILEGES ON `zabbix_proxy`.* TO 'zabbix'@'%'"
        );
    }

    #[test]
    fn test_plan_is_idempotent_sql() {
        let users = vec![user("zabbix", "z")];
        for statement in plan(&request(&users)).unwrap() {
            let sql = statement.expose();
            assert!(
                sql.contains("IF NOT EXISTS") || sql.starts_with("ALTER") || sql.starts_with("GRANT"),
                "{sql}"
            );
        }
    }

    #[test]
    fn test_passwords_are_escaped_and_redacted() {
        let users = vec![user("zabbix", "it's\\secret")];
        let statements = plan(&request(&users)).unwrap();
        let create = &statements[1];

        assert!(create.is_sensitive());
        assert_eq!(
            create.expose(),
            r"CREATE USER IF NOT EXISTS 'zabbix'@'%' IDENTIFIED BY 'it\'s\\secret'"
        );
        assert!(!create.to_string().contains("secret"));
        assert!(create.to_string().contains(REDACTED));
    }

    #[test]
    fn test_admin_user_never_granted() {
        let req_users = vec![user("dba", "d"), user("zabbix", "z")];
        let mut req = request(&req_users);
        req.connection.user = "dba".to_string();
        let names: Vec<&str> = granted_users(&req).iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["zabbix"]);
    }

    #[test]
    fn test_bad_collation_rejected() {
        let users = vec![user("zabbix", "z")];
        let mut req = request(&users);
        req.collate = "utf8_bin; DROP DATABASE mysql";
        assert!(matches!(plan(&req), Err(ProvisionError::Validation(_))));
    }
}
