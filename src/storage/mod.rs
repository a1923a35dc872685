//! # Storage and Persistence
//!
//! The secret store port consumed by the lifecycle engine, plus its two
//! adapters: a PostgreSQL repository for deployment and a DashMap-backed
//! in-process store for tests and local runs.
//!
//! The port deliberately exposes an atomic `decrement_views` instead of a
//! general update: the decrement-if-positive gate at the store is the only
//! synchronization point in the system, and a read-modify-write here would
//! reintroduce the lost-update race on the view budget.

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemorySecretStore;
pub use pool::{create_pool, run_migrations, DbPool};
pub use postgres::PgSecretStore;

use async_trait::async_trait;

use crate::domain::{Secret, SecretId};
use crate::errors::Result;

/// Secret store port.
///
/// Implementations must make `decrement_views` a single atomic operation
/// at the backend; see the method contract.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Unconditional insert. Fails only on transport/backend error.
    async fn put(&self, secret: &Secret) -> Result<()>;

    /// Point lookup. Absence is a miss (`None`), not an error.
    async fn get(&self, id: &SecretId) -> Result<Option<Secret>>;

    /// Atomic conditional decrement of the view budget.
    ///
    /// Succeeds only while the stored `remaining_views` is `> 0`,
    /// decrementing by exactly one and returning the post-decrement value.
    /// Returns `None` without side effects when the record is absent or
    /// the budget is already zero.
    async fn decrement_views(&self, id: &SecretId) -> Result<Option<i64>>;

    /// Idempotent delete; removing an absent id is not an error.
    async fn delete(&self, id: &SecretId) -> Result<()>;
}
