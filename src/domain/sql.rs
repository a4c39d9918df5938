//! Quoting helpers for administrative SQL
//!
//! Administrative statements (`CREATE DATABASE`, `CREATE USER`, `GRANT`)
//! cannot take bind parameters for identifiers or passwords, so values are
//! validated and quoted here before they are spliced in.

use crate::config::schema::is_identifier;
use crate::domain::errors::ProvisionError;
use crate::domain::result::Result;

/// Backtick-quoted MySQL identifier
///
/// # Errors
///
/// [`ProvisionError::Validation`] unless `name` matches `[A-Za-z0-9_]+`.
pub fn mysql_identifier(name: &str) -> Result<String> {
    ensure_identifier(name)?;
    Ok(format!("`{name}`"))
}

/// Double-quoted PostgreSQL identifier
///
/// # Errors
///
/// [`ProvisionError::Validation`] unless `name` matches `[A-Za-z0-9_]+`.
pub fn pg_identifier(name: &str) -> Result<String> {
    ensure_identifier(name)?;
    Ok(format!("\"{name}\""))
}

/// Escapes the body of a single-quoted MySQL string literal
pub fn mysql_string_body(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Single-quoted MySQL string literal
pub fn mysql_string(value: &str) -> String {
    format!("'{}'", mysql_string_body(value))
}

fn ensure_identifier(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ProvisionError::Validation(format!(
            "'{name}' is not a valid SQL identifier (expected [A-Za-z0-9_]+)"
        )))
    }
}
