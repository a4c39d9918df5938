//! External command execution
//!
//! Every host tool (`apt-get`, `yum`, `mysql`, `systemctl`) is run through
//! [`CommandRunner`]. Commands run to completion one at a time; output is
//! captured, never streamed to the log, because it can echo secrets.

use crate::config::SecretString;
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Command execution error
///
/// `stderr` is whatever the tool printed; callers redact it before it
/// reaches a log line or a [`crate::domain::ProvisionError`].
#[derive(Debug, Error)]
pub enum CommandError {
    /// Process could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited unsuccessfully
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// Process did not finish in time and was killed
    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    /// Feeding stdin or collecting output failed
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Message with every secret replaced by the redaction marker
    pub fn redacted(&self, secrets: &[&SecretString]) -> String {
        crate::config::redact_all(&self.to_string(), secrets)
    }
}

/// What a command reads on stdin
pub enum Stdin {
    /// Nothing (`/dev/null`)
    Null,
    /// In-memory bytes that may be secret
    Secret(SecretString),
    /// Contents of a file
    File(PathBuf),
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

/// Runs host commands with a timeout
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

impl CommandRunner {
    /// Creates a runner that kills commands after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Runs `program` with `args`, extra environment and stdin
    ///
    /// `envs` are plain variables; `secret_envs` are only exposed when the
    /// child environment is built.
    ///
    /// # Errors
    ///
    /// [`CommandError::Failed`] for a non-zero exit, [`CommandError::Timeout`]
    /// when the deadline passes, and spawn/I/O errors otherwise.
    pub async fn run(
        &self,
        program: &str,
        args: &[String],
        envs: &[(&str, &str)],
        secret_envs: &[(&str, &SecretString)],
        stdin: Stdin,
    ) -> Result<CommandOutput, CommandError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command.envs(envs.iter().copied());
        for (key, value) in secret_envs {
            let value: &str = value.expose_secret().as_ref();
            command.env(key, value);
        }

        let mut pending_input = None;
        match stdin {
            Stdin::Null => {
                command.stdin(Stdio::null());
            }
            Stdin::Secret(input) => {
                command.stdin(Stdio::piped());
                pending_input = Some(input);
            }
            Stdin::File(path) => {
                let file = std::fs::File::open(&path).map_err(|source| CommandError::Io {
                    program: program.to_string(),
                    source,
                })?;
                command.stdin(Stdio::from(file));
            }
        }

        tracing::trace!(program = %program, args = ?args, "Running command");

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if let Some(input) = pending_input {
            if let Some(mut child_stdin) = child.stdin.take() {
                let bytes: &str = input.expose_secret().as_ref();
                child_stdin
                    .write_all(bytes.as_bytes())
                    .await
                    .map_err(|source| CommandError::Io {
                        program: program.to_string(),
                        source,
                    })?;
                // Closing stdin lets the child see EOF
                drop(child_stdin);
            }
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| CommandError::Io {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(CommandError::Timeout {
                    program: program.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let runner = CommandRunner::default();
        let output = runner
            .run("sh", &["-c".to_string(), "echo hello".to_string()], &[], &[], Stdin::Null)
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_feeds_secret_stdin_and_env() {
        let runner = CommandRunner::default();
        let pw = secret_string("from-env".to_string());
        let output = runner
            .run(
                "sh",
                &["-c".to_string(), "cat; printf ' %s %s' \"$TEST_PW\" \"$TEST_MODE\"".to_string()],
                &[("TEST_MODE", "plain")],
                &[("TEST_PW", &pw)],
                Stdin::Secret(secret_string("from-stdin".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(output.stdout, "from-stdin from-env plain");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failed() {
        let runner = CommandRunner::default();
        let err = runner
            .run(
                "sh",
                &["-c".to_string(), "echo 'bad password s3cret' >&2; exit 3".to_string()],
                &[],
                &[],
                Stdin::Null,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Failed { .. }));

        let secret = secret_string("s3cret".to_string());
        let message = err.redacted(&[&secret]);
        assert!(!message.contains("s3cret"));
        assert!(message.contains("bad password"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = CommandRunner::new(Duration::from_millis(100));
        let err = runner
            .run("sh", &["-c".to_string(), "sleep 5".to_string()], &[], &[], Stdin::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = CommandRunner::default();
        let err = runner
            .run("/nonexistent/zbx-provision-tool", &[], &[], &[], Stdin::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
