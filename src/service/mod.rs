//! # Secret Lifecycle Engine
//!
//! Business logic for creating and consuming secrets. The engine is
//! stateless: one instance per process (or per request) built by plain
//! dependency passing, with all cross-request correctness delegated to the
//! store's atomic conditional decrement.

pub mod requests;

pub use requests::CreateSecretRequest;

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{field, info, instrument, warn};
use validator::Validate;

use crate::crypto::{AeadSecretCipher, SecretCipher};
use crate::domain::{far_future_expiry, Secret, SecretId};
use crate::errors::{Result, VanishError};
use crate::storage::{DbPool, PgSecretStore, SecretStore};

/// Orchestrates the secret lifecycle over the store and cipher ports.
#[derive(Clone)]
pub struct SecretService {
    store: Arc<dyn SecretStore>,
    cipher: Arc<dyn SecretCipher>,
}

impl SecretService {
    pub fn new(store: Arc<dyn SecretStore>, cipher: Arc<dyn SecretCipher>) -> Self {
        Self { store, cipher }
    }

    /// Convenience constructor wiring the PostgreSQL store and the AEAD
    /// cipher.
    pub fn with_pg(pool: DbPool) -> Self {
        Self::new(Arc::new(PgSecretStore::new(pool)), Arc::new(AeadSecretCipher::new()))
    }

    /// Create a secret and return the persisted record.
    ///
    /// The returned record carries the at-rest representation in
    /// `secret_text`; its `id` is the capability token to hand to the
    /// consumer.
    #[instrument(skip(self, payload), fields(correlation_id = field::Empty))]
    pub async fn create(&self, payload: CreateSecretRequest) -> Result<Secret> {
        payload.validate().map_err(VanishError::from)?;
        tracing::Span::current().record("correlation_id", field::display(&uuid::Uuid::new_v4()));

        let now = Utc::now();
        let expires_at = if payload.expire_after_minutes > 0 {
            now + Duration::minutes(payload.expire_after_minutes)
        } else {
            far_future_expiry(now)
        };

        let id = self.cipher.derive_id(&payload.secret_text, now);
        let secret_text = self.cipher.seal(&payload.secret_text, &id)?;

        let secret = Secret {
            id: id.clone(),
            secret_text,
            created_at: now,
            expires_at,
            remaining_views: payload.max_views,
        };

        self.store.put(&secret).await?;

        info!(
            secret_id = %abbrev(&id),
            remaining_views = secret.remaining_views,
            expires_at = %secret.expires_at,
            "secret stored"
        );
        Ok(secret)
    }

    /// Consume one view of a secret.
    ///
    /// Returns the record with the decrypted plaintext in `secret_text`
    /// and the post-decrement view count. Exhaustion (budget spent or
    /// expired) is terminal: the record is burned and every later call
    /// misses.
    #[instrument(skip(self), fields(secret_id = %abbrev(id), correlation_id = field::Empty))]
    pub async fn consume(&self, id: &SecretId) -> Result<Secret> {
        tracing::Span::current().record("correlation_id", field::display(&uuid::Uuid::new_v4()));

        let secret =
            self.store.get(id).await?.ok_or_else(|| VanishError::not_found(id.as_str()))?;

        if !secret.is_consumable_at(Utc::now()) {
            self.burn(id).await;
            return Err(VanishError::exhausted(id.as_str()));
        }

        // The gate, not the read above, decides whether a view is granted:
        // a concurrent consumer may have spent the budget since the fetch.
        let remaining = match self.store.decrement_views(id).await? {
            Some(remaining) => remaining,
            None => return Err(VanishError::exhausted(id.as_str())),
        };

        if remaining == 0 {
            self.burn(id).await;
        }

        let plaintext = self.cipher.open(&secret.secret_text, id)?;

        info!(secret_id = %abbrev(id), remaining_views = remaining, "secret consumed");
        Ok(Secret { secret_text: plaintext, remaining_views: remaining, ..secret })
    }

    /// Best-effort removal of an exhausted record. A failure here cannot
    /// re-grant a view (the decrement gate already refuses), so it is
    /// logged and swallowed.
    async fn burn(&self, id: &SecretId) {
        if let Err(err) = self.store.delete(id).await {
            warn!(secret_id = %abbrev(id), error = %err, "cleanup delete failed");
        }
    }
}

/// The id is the bearer capability; only a prefix ever reaches the logs.
fn abbrev(id: &SecretId) -> &str {
    id.as_str().get(..8).unwrap_or_else(|| id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySecretStore;
    use async_trait::async_trait;
    use chrono::DateTime;

    fn service_with(store: Arc<dyn SecretStore>) -> SecretService {
        SecretService::new(store, Arc::new(AeadSecretCipher::new()))
    }

    fn request(text: &str, ttl: i64, views: i64) -> CreateSecretRequest {
        CreateSecretRequest {
            secret_text: text.to_string(),
            expire_after_minutes: ttl,
            max_views: views,
        }
    }

    /// Store double that fails selected operations, standing in for a
    /// misbehaving backend.
    struct FlakyStore {
        inner: MemorySecretStore,
        fail_get: bool,
        fail_decrement: bool,
        fail_delete: bool,
    }

    impl FlakyStore {
        fn wrapping(inner: MemorySecretStore) -> Self {
            Self { inner, fail_get: false, fail_decrement: false, fail_delete: false }
        }
    }

    #[async_trait]
    impl SecretStore for FlakyStore {
        async fn put(&self, secret: &Secret) -> crate::errors::Result<()> {
            self.inner.put(secret).await
        }

        async fn get(&self, id: &SecretId) -> crate::errors::Result<Option<Secret>> {
            if self.fail_get {
                return Err(VanishError::store("get failed"));
            }
            self.inner.get(id).await
        }

        async fn decrement_views(&self, id: &SecretId) -> crate::errors::Result<Option<i64>> {
            if self.fail_decrement {
                return Err(VanishError::store("decrement failed"));
            }
            self.inner.decrement_views(id).await
        }

        async fn delete(&self, id: &SecretId) -> crate::errors::Result<()> {
            if self.fail_delete {
                return Err(VanishError::store("delete failed"));
            }
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_create_validates_before_store() {
        let store = Arc::new(MemorySecretStore::new());
        let service = service_with(store.clone());

        let result = service.create(request("", 10, 1)).await;
        assert!(matches!(result, Err(VanishError::Validation { .. })));

        let result = service.create(request("x", -1, 1)).await;
        assert!(matches!(result, Err(VanishError::Validation { .. })));

        let result = service.create(request("x", 10, -1)).await;
        assert!(matches!(result, Err(VanishError::Validation { .. })));

        // Nothing reached the store
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_create_stores_ciphertext() {
        let store = Arc::new(MemorySecretStore::new());
        let service = service_with(store.clone());

        let created = service.create(request("my secret", 10, 3)).await.unwrap();
        assert_eq!(created.remaining_views, 3);
        assert_ne!(created.secret_text, "my secret");

        let stored = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.secret_text, created.secret_text);
        assert_ne!(stored.secret_text, "my secret");
    }

    #[tokio::test]
    async fn test_create_without_ttl_uses_far_future_sentinel() {
        let service = service_with(Arc::new(MemorySecretStore::new()));
        let created = service.create(request("eternal", 0, 1)).await.unwrap();
        assert!(created.expires_at > Utc::now() + Duration::days(365 * 99));
    }

    #[tokio::test]
    async fn test_create_with_ttl_sets_expiry() {
        let service = service_with(Arc::new(MemorySecretStore::new()));
        let created = service.create(request("timed", 10, 1)).await.unwrap();
        let expected = created.created_at + Duration::minutes(10);
        assert_eq!(created.expires_at, expected);
    }

    #[tokio::test]
    async fn test_consume_returns_plaintext_and_decrements() {
        let service = service_with(Arc::new(MemorySecretStore::new()));
        let created = service.create(request("round trip", 10, 2)).await.unwrap();

        let consumed = service.consume(&created.id).await.unwrap();
        assert_eq!(consumed.secret_text, "round trip");
        assert_eq!(consumed.remaining_views, 1);
    }

    #[tokio::test]
    async fn test_consume_unknown_id_is_not_found() {
        let service = service_with(Arc::new(MemorySecretStore::new()));
        let result = service.consume(&SecretId::from("no-such-token")).await;
        assert!(matches!(result, Err(VanishError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_consume_expired_burns_record() {
        let store = Arc::new(MemorySecretStore::new());
        let service = service_with(store.clone());

        let id = SecretId::from("a".repeat(64).as_str());
        let expired = Secret {
            id: id.clone(),
            secret_text: "ciphertext".to_string(),
            created_at: DateTime::<Utc>::MIN_UTC,
            expires_at: Utc::now() - Duration::minutes(1),
            remaining_views: 5,
        };
        store.put(&expired).await.unwrap();

        let result = service.consume(&id).await;
        assert!(matches!(result, Err(VanishError::Exhausted { .. })));
        assert_eq!(store.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_consume_zero_budget_burns_record() {
        let store = Arc::new(MemorySecretStore::new());
        let service = service_with(store.clone());

        let id = SecretId::from("b".repeat(64).as_str());
        let spent = Secret {
            id: id.clone(),
            secret_text: "ciphertext".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::minutes(10),
            remaining_views: 0,
        };
        store.put(&spent).await.unwrap();

        let result = service.consume(&id).await;
        assert!(matches!(result, Err(VanishError::Exhausted { .. })));
        assert_eq!(store.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_consume_lost_race_is_exhausted() {
        // The fetch sees a consumable record but the gate refuses: another
        // consumer spent the budget in between.
        struct RacingStore {
            inner: MemorySecretStore,
        }

        #[async_trait]
        impl SecretStore for RacingStore {
            async fn put(&self, secret: &Secret) -> crate::errors::Result<()> {
                self.inner.put(secret).await
            }

            async fn get(&self, id: &SecretId) -> crate::errors::Result<Option<Secret>> {
                self.inner.get(id).await
            }

            async fn decrement_views(
                &self,
                _id: &SecretId,
            ) -> crate::errors::Result<Option<i64>> {
                Ok(None)
            }

            async fn delete(&self, id: &SecretId) -> crate::errors::Result<()> {
                self.inner.delete(id).await
            }
        }

        let inner = MemorySecretStore::new();
        let id = SecretId::from("c".repeat(64).as_str());
        inner
            .put(&Secret {
                id: id.clone(),
                secret_text: "ciphertext".to_string(),
                created_at: Utc::now(),
                expires_at: Utc::now() + Duration::minutes(10),
                remaining_views: 1,
            })
            .await
            .unwrap();

        let service = service_with(Arc::new(RacingStore { inner }));
        let result = service.consume(&id).await;
        assert!(matches!(result, Err(VanishError::Exhausted { .. })));
    }

    #[tokio::test]
    async fn test_last_view_burns_and_still_returns_secret() {
        let store = Arc::new(MemorySecretStore::new());
        let service = service_with(store.clone());

        let created = service.create(request("last one", 10, 1)).await.unwrap();
        let consumed = service.consume(&created.id).await.unwrap();

        assert_eq!(consumed.secret_text, "last one");
        assert_eq!(consumed.remaining_views, 0);
        assert_eq!(store.get(&created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_burn_failure_does_not_mask_the_granted_view() {
        let inner = MemorySecretStore::new();
        let service = service_with(Arc::new(FlakyStore {
            fail_delete: true,
            ..FlakyStore::wrapping(inner)
        }));

        let created = service.create(request("still served", 10, 1)).await.unwrap();
        let consumed = service.consume(&created.id).await.unwrap();
        assert_eq!(consumed.secret_text, "still served");
        assert_eq!(consumed.remaining_views, 0);
    }

    #[tokio::test]
    async fn test_store_failures_surface_as_retryable() {
        let inner = MemorySecretStore::new();
        let service = service_with(Arc::new(FlakyStore {
            fail_get: true,
            ..FlakyStore::wrapping(inner)
        }));

        let result = service.consume(&SecretId::from("d".repeat(64).as_str())).await;
        match result {
            Err(err) => assert!(err.is_retryable()),
            Ok(_) => panic!("expected store error"),
        }
    }

    #[tokio::test]
    async fn test_decrement_failure_surfaces_as_retryable() {
        let inner = MemorySecretStore::new();
        let store = FlakyStore { fail_decrement: true, ..FlakyStore::wrapping(inner) };
        let service = service_with(Arc::new(store));

        let created = service.create(request("flaky", 10, 2)).await.unwrap();
        let result = service.consume(&created.id).await;
        match result {
            Err(err) => assert!(err.is_retryable()),
            Ok(_) => panic!("expected store error"),
        }
    }
}
