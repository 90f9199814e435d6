use recommender::RecommendedProduct;
use serde::Serialize;

/// One page of a user's recommendations.
#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub user_id: u64,
    pub items: Vec<RecommendedProduct>,
    pub page: usize,
    pub per_page: usize,
    /// Length of the full ranked list.
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct HomeFeedResponse {
    pub user_id: u64,
    pub items: Vec<RecommendedProduct>,
}
