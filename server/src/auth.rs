//! Minimal identity boundary: the user registry behind `/register` and
//! `/login`.
//!
//! Identity management is an external collaborator from the core's point of
//! view — the ledger only ever sees an already-authenticated
//! `(actor_id, role)` pair. This registry exists so the observed client
//! contract works end to end, and so route handlers can resolve a request's
//! role server-side instead of trusting the client-supplied role string.
//!
//! Passwords are stored as salted SHA-256 digests. Good enough for the
//! demo-grade credential store this is; a production deployment would put a
//! real identity provider in front.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use medledger_contracts::Role;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user id '{user_id}' is already registered")]
    Taken { user_id: String },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user id and password must be non-empty")]
    MissingCredentials,
}

struct StoredUser {
    salt: String,
    password_hash: String,
    role: Role,
}

/// In-memory user store keyed by user id.
pub struct UserRegistry {
    users: Mutex<HashMap<String, StoredUser>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new user. Fails when the id is taken or credentials are
    /// blank.
    pub fn register(&self, user_id: &str, password: &str, role: Role) -> Result<(), AuthError> {
        if user_id.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let mut users = self.users.lock().expect("user registry lock poisoned");
        if users.contains_key(user_id) {
            return Err(AuthError::Taken {
                user_id: user_id.to_string(),
            });
        }

        let salt = make_salt(user_id);
        let password_hash = hash_password(&salt, password);
        users.insert(
            user_id.to_string(),
            StoredUser {
                salt,
                password_hash,
                role,
            },
        );

        info!(user_id, %role, "user registered");
        Ok(())
    }

    /// Verify credentials and return the stored role.
    pub fn login(&self, user_id: &str, password: &str) -> Result<Role, AuthError> {
        let users = self.users.lock().expect("user registry lock poisoned");
        let user = users.get(user_id).ok_or(AuthError::InvalidCredentials)?;
        if hash_password(&user.salt, password) != user.password_hash {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user.role)
    }

    /// The role registered for `user_id`, if any.
    ///
    /// Route handlers use this to derive the caller context server-side —
    /// the client-supplied role string is never the security boundary.
    pub fn resolve(&self, user_id: &str) -> Option<Role> {
        let users = self.users.lock().expect("user registry lock poisoned");
        users.get(user_id).map(|u| u.role)
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn make_salt(user_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(Utc::now().to_rfc3339().as_bytes());
    hex::encode(&hasher.finalize()[..16])
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update([0u8]);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
