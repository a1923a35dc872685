//! In-memory secret store
//!
//! DashMap-backed [`SecretStore`] adapter. `decrement_views` mutates the
//! entry through an exclusive shard guard, so the decrement-if-positive
//! gate holds under concurrent access just as it does in the SQL adapter.
//! Used by the test suite and suitable for single-process local runs.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::domain::{Secret, SecretId};
use crate::errors::Result;
use crate::storage::SecretStore;

/// In-process implementation of the secret store port.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    entries: Arc<DashMap<String, Secret>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records, for test assertions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn put(&self, secret: &Secret) -> Result<()> {
        self.entries.insert(secret.id.as_str().to_string(), secret.clone());
        Ok(())
    }

    async fn get(&self, id: &SecretId) -> Result<Option<Secret>> {
        Ok(self.entries.get(id.as_str()).map(|entry| entry.clone()))
    }

    async fn decrement_views(&self, id: &SecretId) -> Result<Option<i64>> {
        // get_mut holds the shard write lock for the duration of the
        // mutation, making check-and-decrement atomic per entry.
        match self.entries.get_mut(id.as_str()) {
            Some(mut entry) if entry.remaining_views > 0 => {
                entry.remaining_views -= 1;
                Ok(Some(entry.remaining_views))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: &SecretId) -> Result<()> {
        self.entries.remove(id.as_str());
        Ok(())
    }
}
