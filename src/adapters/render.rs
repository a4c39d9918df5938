//! Zabbix daemon configuration file renderer
//!
//! Output format:
//!
//! ```text
//! # Managed by zbx-provision. Local changes will be overwritten.
//!
//! Timeout=4
//!
//! ### cache
//! CacheSize=32M
//!
//! ### db
//! DBHost=127.0.0.1
//! ```
//!
//! Top-level keys come first, then one block per section. Arrays become
//! repeated keys and booleans become `1`/`0`. The file holds the database
//! password, so the content only lives in zeroized buffers and only its
//! SHA-256 digest is logged.

use crate::adapters::traits::{ConfigRenderer, RenderOutcome};
use crate::core::builder::RenderedConfiguration;
use crate::domain::{ConfigurationTree, ProvisionError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use toml::{Table, Value};
use zeroize::Zeroizing;

const HEADER: &str = "# Managed by zbx-provision. Local changes will be overwritten.\n";

/// Writes configuration trees as Zabbix `Key=Value` files
#[derive(Debug, Clone)]
pub struct ConfFileRenderer {
    mode: u32,
    owner: Option<(u32, u32)>,
}

impl Default for ConfFileRenderer {
    fn default() -> Self {
        Self {
            mode: 0o640,
            owner: Some((0, 0)),
        }
    }
}

impl ConfFileRenderer {
    /// Renderer writing files with `mode`, optionally chowned to `(uid, gid)`
    pub fn new(mode: u32, owner: Option<(u32, u32)>) -> Self {
        Self { mode, owner }
    }

    fn failure(target: &Path, reason: impl std::fmt::Display) -> ProvisionError {
        ProvisionError::RenderFailure {
            path: target.display().to_string(),
            reason: reason.to_string(),
        }
    }

    async fn read_existing(target: &Path) -> Result<Option<Zeroizing<Vec<u8>>>> {
        match tokio::fs::read(target).await {
            Ok(bytes) => Ok(Some(Zeroizing::new(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::failure(target, e)),
        }
    }

    async fn apply_metadata(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(self.mode))
                .await
                .map_err(|e| Self::failure(path, e))?;
            if let Some((uid, gid)) = self.owner {
                std::os::unix::fs::chown(path, Some(uid), Some(gid))
                    .map_err(|e| Self::failure(path, format!("chown {uid}:{gid}: {e}")))?;
            }
        }
        Ok(())
    }

    async fn write_atomically(&self, target: &Path, content: &[u8]) -> Result<()> {
        let file_name = target
            .file_name()
            .ok_or_else(|| Self::failure(target, "target has no file name"))?
            .to_string_lossy();
        let temp: PathBuf = target.with_file_name(format!(
            ".{}.zbx-provision-{}",
            file_name,
            std::process::id()
        ));

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(self.mode);

        let result = async {
            let mut file = options
                .open(&temp)
                .await
                .map_err(|e| Self::failure(&temp, e))?;
            file.write_all(content)
                .await
                .map_err(|e| Self::failure(&temp, e))?;
            file.sync_all().await.map_err(|e| Self::failure(&temp, e))?;
            drop(file);
            self.apply_metadata(&temp).await?;
            tokio::fs::rename(&temp, target)
                .await
                .map_err(|e| Self::failure(target, e))
        }
        .await;

        if result.is_err() {
            let _ = tokio::fs::remove_file(&temp).await;
        }
        result
    }
}

/// Formats a tree as Zabbix configuration text
pub fn format_conf(tree: &ConfigurationTree) -> Zeroizing<String> {
    let mut out = Zeroizing::new(String::from(HEADER));

    let mut top_level = Vec::new();
    let mut sections = Vec::new();
    for (key, value) in tree.as_table() {
        match value {
            Value::Table(section) => sections.push((key, section)),
            other => top_level.push((key, other)),
        }
    }

    if !top_level.is_empty() {
        out.push('\n');
        for (key, value) in top_level {
            push_entry(&mut out, key, value);
        }
    }

    for (name, section) in sections {
        out.push_str("\n### ");
        out.push_str(name);
        out.push('\n');
        push_table(&mut out, section);
    }
    out
}

fn push_table(out: &mut String, table: &Table) {
    for (key, value) in table {
        match value {
            Value::Table(nested) => push_table(out, nested),
            other => push_entry(out, key, other),
        }
    }
}

fn push_entry(out: &mut String, key: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                push_entry(out, key, item);
            }
        }
        Value::Table(nested) => push_table(out, nested),
        scalar => {
            out.push_str(key);
            out.push('=');
            push_scalar(out, scalar);
            out.push('\n');
        }
    }
}

fn push_scalar(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&f.to_string()),
        Value::Boolean(b) => out.push(if *b { '1' } else { '0' }),
        Value::Datetime(d) => out.push_str(&d.to_string()),
        Value::Array(_) | Value::Table(_) => {}
    }
}

/// Hex-encoded SHA-256 of `content`
pub fn digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ConfigRenderer for ConfFileRenderer {
    async fn render(
        &self,
        target: &Path,
        configuration: &RenderedConfiguration,
    ) -> Result<RenderOutcome> {
        let content = format_conf(configuration.tree());
        let digest = digest(content.as_bytes());

        let existing = Self::read_existing(target).await?;
        let changed = existing.as_deref().map(Vec::as_slice) != Some(content.as_bytes());

        if changed {
            self.write_atomically(target, content.as_bytes()).await?;
            tracing::info!(path = %target.display(), sha256 = %digest, "Rendered configuration file");
        } else {
            // Content matches; still converge mode and owner
            self.apply_metadata(target).await?;
            tracing::info!(path = %target.display(), sha256 = %digest, "Configuration file up to date");
        }

        Ok(RenderOutcome { changed, digest })
    }

    async fn is_current(
        &self,
        target: &Path,
        configuration: &RenderedConfiguration,
    ) -> Result<bool> {
        let content = format_conf(configuration.tree());
        let existing = Self::read_existing(target).await?;
        Ok(existing.as_deref().map(Vec::as_slice) == Some(content.as_bytes()))
    }
}
