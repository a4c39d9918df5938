//! `mysql` command-line client
//!
//! Statements are written to the client's stdin and the password is handed
//! over through `MYSQL_PWD`, so neither appears in the process list.

use crate::adapters::command::{CommandError, CommandRunner, Stdin};
use crate::adapters::traits::{AdminConnection, AdminExecutor};
use crate::config::{redact_all, secret_string, SecretString};
use crate::domain::SensitiveStatement;
use async_trait::async_trait;
use std::path::Path;

/// [`AdminExecutor`] driving the `mysql` binary
#[derive(Debug, Clone)]
pub struct MySqlCliExecutor {
    binary: String,
    runner: CommandRunner,
}

impl MySqlCliExecutor {
    /// Creates an executor running `binary` (usually just `mysql`)
    pub fn new(binary: impl Into<String>, runner: CommandRunner) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    /// Arguments shared by every invocation
    pub(crate) fn base_args(connection: &AdminConnection, database: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "--batch".to_string(),
            "--skip-column-names".to_string(),
            "-h".to_string(),
            connection.host.clone(),
            "-P".to_string(),
            connection.port.to_string(),
            "-u".to_string(),
            connection.user.clone(),
        ];
        if let Some(database) = database {
            args.push("-D".to_string());
            args.push(database.to_string());
        }
        args
    }

    async fn run(
        &self,
        connection: &AdminConnection,
        database: Option<&str>,
        stdin: Stdin,
        statement: Option<&SensitiveStatement>,
    ) -> Result<String, CommandError> {
        let args = Self::base_args(connection, database);
        if let Some(statement) = statement {
            tracing::debug!(
                host = %connection.host,
                user = %connection.user,
                statement = %statement,
                "Executing MySQL statement"
            );
        }

        self.runner
            .run(
                &self.binary,
                &args,
                &[],
                &[("MYSQL_PWD", &connection.password)],
                stdin,
            )
            .await
            .map(|output| output.stdout)
            .map_err(|e| scrub(e, &connection.password))
    }
}

/// Removes the connection password from a failed command's stderr
fn scrub(error: CommandError, password: &SecretString) -> CommandError {
    match error {
        CommandError::Failed {
            program,
            status,
            stderr,
        } => CommandError::Failed {
            program,
            status,
            stderr: redact_all(&stderr, &[password]),
        },
        other => other,
    }
}

fn statement_input(statement: &SensitiveStatement) -> Stdin {
    let mut sql = statement.expose().trim_end().to_string();
    if !sql.ends_with(';') {
        sql.push(';');
    }
    sql.push('\n');
    Stdin::Secret(secret_string(sql))
}

#[async_trait]
impl AdminExecutor for MySqlCliExecutor {
    async fn execute(
        &self,
        connection: &AdminConnection,
        statement: &SensitiveStatement,
    ) -> Result<(), CommandError> {
        self.run(connection, None, statement_input(statement), Some(statement))
            .await
            .map(|_| ())
    }

    async fn query(
        &self,
        connection: &AdminConnection,
        statement: &SensitiveStatement,
    ) -> Result<Vec<String>, CommandError> {
        let stdout = self
            .run(connection, None, statement_input(statement), Some(statement))
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn import_file(
        &self,
        connection: &AdminConnection,
        database: &str,
        path: &Path,
    ) -> Result<(), CommandError> {
        tracing::info!(database = %database, file = %path.display(), "Importing SQL file");
        self.run(
            connection,
            Some(database),
            Stdin::File(path.to_path_buf()),
            None,
        )
        .await
        .map(|_| ())
    }
}
