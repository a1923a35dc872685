//! Request types accepted by the lifecycle engine.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Parameters for creating a secret.
///
/// `expire_after_minutes == 0` means the secret never expires within any
/// practical horizon; `max_views` is the total number of reads granted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretRequest {
    #[validate(length(min = 1, message = "secret text is required"))]
    pub secret_text: String,

    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    pub expire_after_minutes: i64,

    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    pub max_views: i64,
}
