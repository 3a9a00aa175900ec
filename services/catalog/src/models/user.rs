//! User model and related functionality

use serde::Serialize;

use crate::password::{CredentialError, CredentialManager, PasswordDigest};

/// User entity
///
/// Only the digest of the password is ever held; there is no accessor that
/// yields a plaintext password.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: PasswordDigest,
}

impl User {
    /// Check a candidate password against the stored digest
    pub fn verify_password(&self, credentials: &CredentialManager, password: &str) -> bool {
        credentials.verify(password, &self.password_hash)
    }
}

/// New user creation payload
///
/// The plaintext password is write-only: it is hashed as soon as it is set.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    password_hash: PasswordDigest,
}

impl NewUser {
    pub fn new(
        credentials: &CredentialManager,
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password_hash: credentials.hash(password)?,
        })
    }

    pub fn password_hash(&self) -> &PasswordDigest {
        &self.password_hash
    }
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
