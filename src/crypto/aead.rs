//! AEAD secret cipher using AES-128-GCM
//!
//! Concrete [`SecretCipher`] implementation. Identifiers are hex-encoded
//! SHA-256 digests of the secret text concatenated with the RFC 3339
//! rendering of the creation time. The AES key is the 16-byte prefix of
//! the id's raw bytes; sealing uses a fresh random 12-byte nonce per call
//! and stores `hex(nonce || ciphertext || tag)`.

use chrono::{DateTime, SecondsFormat, Utc};
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_128_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

use crate::crypto::SecretCipher;
use crate::domain::SecretId;
use crate::errors::{Result, VanishError};

/// Size of the AES-128 key in bytes (prefix of the id's raw bytes)
const KEY_SIZE: usize = 16;

/// Size of the AES-GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
const TAG_SIZE: usize = 16;

/// Single-use nonce sequence for AES-GCM
struct SingleNonce {
    nonce: Option<[u8; NONCE_SIZE]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_SIZE]) -> Self {
        Self { nonce: Some(nonce_bytes) }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.nonce.take().map(Nonce::assume_unique_for_key).ok_or(ring::error::Unspecified)
    }
}

/// AES-128-GCM implementation of the cipher port.
#[derive(Clone)]
pub struct AeadSecretCipher {
    rng: Arc<SystemRandom>,
}

impl AeadSecretCipher {
    pub fn new() -> Self {
        Self { rng: Arc::new(SystemRandom::new()) }
    }

    /// Derive the symmetric key from the id: the first `2 * KEY_SIZE` hex
    /// characters decoded to raw bytes.
    fn derive_key(id: &SecretId) -> Result<[u8; KEY_SIZE]> {
        let hex_prefix = id
            .as_str()
            .get(..KEY_SIZE * 2)
            .ok_or_else(|| VanishError::encryption("identifier too short for key derivation"))?;

        let bytes = hex::decode(hex_prefix)
            .map_err(|_| VanishError::encryption("invalid hex in key derivation"))?;

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&bytes);
        Ok(key)
    }
}

impl Default for AeadSecretCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretCipher for AeadSecretCipher {
    fn derive_id(&self, secret_text: &str, created_at: DateTime<Utc>) -> SecretId {
        let mut hasher = Sha256::new();
        hasher.update(secret_text.as_bytes());
        hasher.update(created_at.to_rfc3339_opts(SecondsFormat::Nanos, true).as_bytes());
        SecretId::from_string(hex::encode(hasher.finalize()))
    }

    fn seal(&self, plaintext: &str, id: &SecretId) -> Result<String> {
        let key_bytes = Self::derive_key(id)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| VanishError::encryption("failed to generate random nonce"))?;

        let unbound_key = UnboundKey::new(&AES_128_GCM, &key_bytes)
            .map_err(|_| VanishError::encryption("failed to create sealing key"))?;
        let mut sealing_key = aead::SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut in_out = plaintext.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| VanishError::encryption("failed to encrypt secret"))?;

        // Nonce is unique but not itself secret, so it rides along at the
        // front of the stored representation.
        let mut stored = Vec::with_capacity(NONCE_SIZE + in_out.len());
        stored.extend_from_slice(&nonce_bytes);
        stored.extend_from_slice(&in_out);

        debug!(stored_len = stored.len(), "sealed secret");
        Ok(hex::encode(stored))
    }

    fn open(&self, stored_text: &str, id: &SecretId) -> Result<String> {
        let key_bytes = Self::derive_key(id)?;

        let stored = hex::decode(stored_text)
            .map_err(|_| VanishError::encryption("stored secret is not valid hex"))?;

        if stored.len() < NONCE_SIZE + TAG_SIZE {
            return Err(VanishError::encryption("stored secret too short"));
        }

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(&stored[..NONCE_SIZE]);

        let unbound_key = UnboundKey::new(&AES_128_GCM, &key_bytes)
            .map_err(|_| VanishError::encryption("failed to create opening key"))?;
        let mut opening_key = aead::OpeningKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut in_out = stored[NONCE_SIZE..].to_vec();
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| VanishError::encryption("failed to decrypt secret: authentication failed"))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| VanishError::encryption("decrypted secret is not valid UTF-8"))
    }
}
