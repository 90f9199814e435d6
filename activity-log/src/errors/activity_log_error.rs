//! Error type for the activity-log crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityLogError {
    /// Activity type outside the closed enumeration.
    #[error("unknown activity type '{0}'")]
    UnknownActivityType(String),

    /// Quantity must be at least 1.
    #[error("invalid quantity {0}: must be >= 1")]
    InvalidQuantity(u32),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
