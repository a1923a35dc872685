//! Secret ID NewType
//!
//! Type-safe wrapper for the secret identifier. The id doubles as the
//! bearer capability token: it is a hex-encoded SHA-256 digest, so holding
//! it is both necessary and sufficient to attempt a read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier and capability token for a stored secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretId(String);

impl SecretId {
    /// Wrap an existing identifier (e.g. retrieved from the store or
    /// presented by a consumer).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to inner string value
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SecretId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecretId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<SecretId> for String {
    fn from(id: SecretId) -> Self {
        id.0
    }
}
