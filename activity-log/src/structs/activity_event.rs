use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity_type::ActivityType;
use crate::errors::activity_log_error::ActivityLogError;

/// One recorded user action. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub user_id: u64,
    pub product_id: u64,
    pub activity_type: ActivityType,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
}

fn default_quantity() -> u32 {
    1
}

impl ActivityEvent {
    /// Event stamped with the current time and quantity 1.
    pub fn new(user_id: u64, product_id: u64, activity_type: ActivityType) -> Self {
        Self {
            user_id,
            product_id,
            activity_type,
            quantity: default_quantity(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// # Errors
    /// `InvalidQuantity` when `quantity` is 0.
    pub fn validate(&self) -> Result<(), ActivityLogError> {
        if self.quantity == 0 {
            return Err(ActivityLogError::InvalidQuantity(self.quantity));
        }
        Ok(())
    }
}
