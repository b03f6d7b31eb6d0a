//! Admin gate.
//!
//! A single shared password guards every mutating command. There are no users,
//! tokens or expiry: an [`AdminSession`] is an in-memory flag that a new process
//! starts without.

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::app::{Result, SiteError};

#[derive(Clone)]
pub struct Credentials {
    pub password: String,
}

impl Credentials {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &"***")
            .finish()
    }
}

pub trait Authenticator: Send + Sync {
    fn verify(&self, credentials: &Credentials) -> bool;
}

/// Compares the SHA-256 digest of the supplied password with a stored digest.
pub struct PasswordGate {
    digest: String,
}

impl PasswordGate {
    /// `digest` is the lowercase hex SHA-256 of the admin password.
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into().trim().to_lowercase(),
        }
    }

    pub fn from_password(password: &str) -> Self {
        Self {
            digest: hash_password(password),
        }
    }
}

impl Authenticator for PasswordGate {
    fn verify(&self, credentials: &Credentials) -> bool {
        constant_time_eq(
            hash_password(&credentials.password).as_bytes(),
            self.digest.as_bytes(),
        )
    }
}

/// Hex SHA-256 of a password, the format stored in the config file.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Debug, Default)]
pub struct AdminSession {
    authenticated: bool,
}

impl AdminSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the credentials were accepted.
    pub fn login(&mut self, authenticator: &dyn Authenticator, credentials: &Credentials) -> bool {
        self.authenticated = authenticator.verify(credentials);
        if self.authenticated {
            info!("Admin session started");
        } else {
            warn!("Rejected admin login");
        }
        self.authenticated
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn require(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(SiteError::Unauthorized)
        }
    }
}
