//! # Vanish
//!
//! Core of a one-time secret sharing service: a producer stores a text
//! secret and receives an opaque capability token; holders of the token
//! can read the secret a bounded number of times within a time window,
//! after which it is permanently unavailable.
//!
//! ## Architecture
//!
//! ```text
//! producer text → identity derivation → at-rest encryption → secret store
//! consumer token → lifecycle engine → atomic decrement gate → plaintext or miss
//! ```
//!
//! The lifecycle engine ([`service::SecretService`]) is stateless; the
//! store's conditional decrement is the single synchronization point, so
//! any number of engine instances can run concurrently without
//! coordination.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vanish::crypto::AeadSecretCipher;
//! use vanish::service::{CreateSecretRequest, SecretService};
//! use vanish::storage::MemorySecretStore;
//!
//! # async fn demo() -> vanish::Result<()> {
//! let service = SecretService::new(
//!     Arc::new(MemorySecretStore::new()),
//!     Arc::new(AeadSecretCipher::new()),
//! );
//!
//! let created = service
//!     .create(CreateSecretRequest {
//!         secret_text: "the launch code".into(),
//!         expire_after_minutes: 10,
//!         max_views: 1,
//!     })
//!     .await?;
//!
//! let revealed = service.consume(&created.id).await?;
//! assert_eq!(revealed.secret_text, "the launch code");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod service;
pub mod storage;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Result, VanishError};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
