//! PostgreSQL secret store
//!
//! Networked [`SecretStore`] adapter backed by sqlx. The conditional
//! decrement is a single UPDATE with a `remaining_views > 0` guard and a
//! RETURNING clause, so the budget check and the mutation are one atomic
//! statement at the database.

use async_trait::async_trait;
use sqlx::FromRow;

use crate::domain::{Secret, SecretId};
use crate::errors::{Result, VanishError};
use crate::storage::{DbPool, SecretStore};

#[derive(Debug, Clone, FromRow)]
struct SecretRow {
    pub id: String,
    pub secret_text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub remaining_views: i64,
}

impl From<SecretRow> for Secret {
    fn from(row: SecretRow) -> Self {
        Secret {
            id: SecretId::from_string(row.id),
            secret_text: row.secret_text,
            created_at: row.created_at,
            expires_at: row.expires_at,
            remaining_views: row.remaining_views,
        }
    }
}

/// sqlx/PostgreSQL implementation of the secret store port.
#[derive(Debug, Clone)]
pub struct PgSecretStore {
    pool: DbPool,
}

impl PgSecretStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecretStore for PgSecretStore {
    async fn put(&self, secret: &Secret) -> Result<()> {
        sqlx::query(
            "INSERT INTO secrets (id, secret_text, created_at, expires_at, remaining_views) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(secret.id.as_str())
        .bind(&secret.secret_text)
        .bind(secret.created_at)
        .bind(secret.expires_at)
        .bind(secret.remaining_views)
        .execute(&self.pool)
        .await
        .map_err(|err| VanishError::Store {
            context: format!("failed to insert secret {}", secret.id),
            source: Some(Box::new(err)),
        })?;

        Ok(())
    }

    async fn get(&self, id: &SecretId) -> Result<Option<Secret>> {
        let row: Option<SecretRow> = sqlx::query_as(
            "SELECT id, secret_text, created_at, expires_at, remaining_views \
             FROM secrets WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| VanishError::Store {
            context: format!("failed to fetch secret {}", id),
            source: Some(Box::new(err)),
        })?;

        Ok(row.map(Secret::from))
    }

    async fn decrement_views(&self, id: &SecretId) -> Result<Option<i64>> {
        // Guard and mutation in one statement; concurrent callers serialize
        // on the row and at most `remaining_views` of them ever succeed.
        let remaining: Option<i64> = sqlx::query_scalar(
            "UPDATE secrets SET remaining_views = remaining_views - 1 \
             WHERE id = $1 AND remaining_views > 0 \
             RETURNING remaining_views",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| VanishError::Store {
            context: format!("failed to decrement views for secret {}", id),
            source: Some(Box::new(err)),
        })?;

        Ok(remaining)
    }

    async fn delete(&self, id: &SecretId) -> Result<()> {
        sqlx::query("DELETE FROM secrets WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| VanishError::Store {
                context: format!("failed to delete secret {}", id),
                source: Some(Box::new(err)),
            })?;

        Ok(())
    }
}
