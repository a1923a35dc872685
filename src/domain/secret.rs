//! Secret record
//!
//! The sole persisted entity of the service. A record is immutable after
//! creation except for `remaining_views`, which only the lifecycle engine
//! mutates, and only through the store's atomic conditional decrement.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::SecretId;

/// A stored secret with its consumption budget and expiry window.
///
/// `secret_text` holds the at-rest representation (hex-encoded
/// `nonce || ciphertext || tag`); the lifecycle engine swaps in the
/// decrypted plaintext before handing a record to a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    /// Lookup key and bearer capability token
    pub id: SecretId,
    /// Persisted representation of the secret
    pub secret_text: String,
    /// Creation time, immutable
    pub created_at: DateTime<Utc>,
    /// Absolute expiry, immutable after creation
    pub expires_at: DateTime<Utc>,
    /// Consumption budget; never negative
    pub remaining_views: i64,
}

impl Secret {
    /// Whether the expiry window has elapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the record can still be served at `now`: inside the expiry
    /// window with budget remaining.
    pub fn is_consumable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && self.remaining_views > 0
    }
}

/// Far-future expiry sentinel for secrets created without a TTL:
/// 31 December 23:59:59 UTC, one hundred years out. Effectively
/// non-expiring within any practical horizon.
pub fn far_future_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    // with_ymd_and_hms is total for this fixed calendar date
    Utc.with_ymd_and_hms(now.year() + 100, 12, 31, 23, 59, 59).unwrap()
}
