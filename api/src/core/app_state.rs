use std::sync::Arc;

use recommender::RecommendationOrchestrator;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Recommendation engine, built once at startup.
    pub orchestrator: Arc<RecommendationOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<RecommendationOrchestrator>) -> Self {
        Self { orchestrator }
    }
}
