use serde::{Deserialize, Serialize};

/// Storefront metrics attached to a recommended product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductTracking {
    /// Discount in percent.
    pub discount: f32,
    pub quantity_sold: u64,
    pub review_count: u64,
    pub rating_average: f32,
    pub favorite_count: u64,
}
