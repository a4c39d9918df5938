//! Credential groups resolved from the external store

use crate::config::SecretString;
use serde_json::{Map, Value};

/// One user entry of a credential group
#[derive(Debug, Clone)]
pub struct UserCredential {
    /// User name
    pub name: String,
    /// Password, never logged
    pub password: SecretString,
    /// Remaining options stored next to the password
    pub attributes: Map<String, Value>,
}

/// Named bundle of user/password pairs, in store order
#[derive(Debug, Clone)]
pub struct CredentialGroup {
    name: String,
    users: Vec<UserCredential>,
}

impl CredentialGroup {
    /// Creates a group from its users
    pub fn new(name: impl Into<String>, users: Vec<UserCredential>) -> Self {
        Self {
            name: name.into(),
            users,
        }
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Users in store order
    pub fn users(&self) -> &[UserCredential] {
        &self.users
    }

    /// First user in store order
    pub fn first(&self) -> Option<&UserCredential> {
        self.users.first()
    }

    /// Looks up a user by name
    pub fn get(&self, user: &str) -> Option<&UserCredential> {
        self.users.iter().find(|u| u.name == user)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}
