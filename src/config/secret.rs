//! Secure credential handling using the secrecy crate
//!
//! Passwords resolved from the credential store travel through the run as
//! [`SecretString`]s. The wrapped value is zeroed on drop, its `Debug`
//! output is redacted, and reading it requires an explicit `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use zbx_provision::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("my-password".to_string());
//! assert_eq!(password.expose_secret(), "my-password");
//!
//! // Debug output is redacted
//! assert!(!format!("{password:?}").contains("my-password"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Marker printed wherever a secret would otherwise appear
pub const REDACTED: &str = "[REDACTED]";

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Replaces every occurrence of each secret in `text` with [`REDACTED`]
///
/// Used on messages that come back from external tools (stderr of `mysql`,
/// database driver errors) before they are logged or wrapped in an error.
pub fn redact_all(text: &str, secrets: &[&SecretString]) -> String {
    use secrecy::ExposeSecret;

    let mut out = text.to_string();
    for secret in secrets {
        let value: &str = secret.expose_secret().as_ref();
        if !value.is_empty() {
            out = out.replace(value, REDACTED);
        }
    }
    out
}
