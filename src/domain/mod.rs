//! Domain models and types.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Closed enums** for the inputs that drive branching ([`Role`], [`DatabaseVendor`], [`PlatformFamily`])
//! - **Configuration data** ([`ConfigurationTree`], [`DatabaseConnectionFacts`], [`Version`])
//! - **Credentials** ([`CredentialGroup`], [`UserCredential`])
//! - **Sensitive values** ([`SensitiveStatement`]) and SQL quoting ([`sql`])
//! - **Error types** ([`ProvisionError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ProvisionError>`]:
//!
//! ```rust
//! use zbx_provision::domain::{Result, Role};
//!
//! fn example() -> Result<Role> {
//!     let role = Role::parse("server")?;
//!     Ok(role)
//! }
//! ```

pub mod credentials;
pub mod errors;
pub mod facts;
pub mod result;
pub mod role;
pub mod sensitive;
pub mod sql;
pub mod tree;
pub mod version;

pub use credentials::{CredentialGroup, UserCredential};
pub use errors::ProvisionError;
pub use facts::{DatabaseConnectionFacts, DB_SECTION};
pub use result::Result;
pub use role::{DatabaseVendor, PlatformFamily, Role};
pub use sensitive::SensitiveStatement;
pub use tree::ConfigurationTree;
pub use version::{ParsedVersion, Version};
