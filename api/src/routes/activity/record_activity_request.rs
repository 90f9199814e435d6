use serde::{Deserialize, Serialize};

/// Body of `POST /activity`.
#[derive(Debug, Deserialize)]
pub struct RecordActivityRequest {
    pub user_id: u64,
    pub product_id: u64,
    /// One of view, select, purchase, remove_from_cart, favourite, search.
    pub activity_type: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RecordActivityResponse {
    pub recorded: bool,
}
