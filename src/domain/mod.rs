//! Domain layer
//!
//! Pure domain entities with zero infrastructure dependencies: the secret
//! record and its identifier newtype.

pub mod id;
pub mod secret;

pub use id::SecretId;
pub use secret::{far_future_expiry, Secret};
