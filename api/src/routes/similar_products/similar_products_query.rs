use recommender::RecommendedProduct;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct SimilarProductsQuery {
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarProductsResponse {
    pub product_id: u64,
    pub items: Vec<RecommendedProduct>,
}
