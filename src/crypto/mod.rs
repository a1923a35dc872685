//! # Identity Derivation and Encryption
//!
//! The cipher side of the secret lifecycle: deriving the capability token
//! from the secret's content and creation time, and sealing the secret for
//! storage at rest.
//!
//! The derived id doubles as the lookup key and as the seed for the
//! symmetric key (a fixed-length prefix of its raw bytes). A party with
//! read access to the store can therefore derive every key; the encryption
//! protects the literal bytes at rest from parties without the token, not
//! from the storage backend itself.

pub mod aead;

pub use aead::AeadSecretCipher;

use chrono::{DateTime, Utc};

use crate::domain::SecretId;
use crate::errors::Result;

/// Identity derivation and sealing port consumed by the lifecycle engine.
pub trait SecretCipher: Send + Sync {
    /// Derive the opaque identifier for a secret. Deterministic and
    /// side-effect free: identical `(secret_text, created_at)` pairs map to
    /// the same id.
    fn derive_id(&self, secret_text: &str, created_at: DateTime<Utc>) -> SecretId;

    /// Encrypt `plaintext` under a key derived from `id`, producing the
    /// at-rest representation. Each call uses a fresh random IV, so
    /// repeated seals of the same input yield different output.
    fn seal(&self, plaintext: &str, id: &SecretId) -> Result<String>;

    /// Reverse of [`seal`](Self::seal): authenticate and decrypt the
    /// stored representation back to the original plaintext.
    fn open(&self, stored_text: &str, id: &SecretId) -> Result<String>;
}
