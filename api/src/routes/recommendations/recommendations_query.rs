use serde::Deserialize;

pub const DEFAULT_PER_PAGE: usize = 48;

/// Query string of `GET /recommendations/{user_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsQuery {
    /// Cap applied to the ranked list before pagination.
    pub limit: Option<usize>,
    /// 1-based page number (default 1).
    pub page: Option<usize>,
    /// Page size (default 48).
    pub per_page: Option<usize>,
}
