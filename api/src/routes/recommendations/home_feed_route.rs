use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{error, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    middleware_layer::json_extractor::request_id,
    routes::recommendations::recommendations_response::HomeFeedResponse,
};

/// `GET /recommendations/{user_id}/home`: short neighbour feed for a landing page.
pub async fn home_feed_route(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let req_id = request_id(&headers);
    info!(target: "api::home_feed", %req_id, user_id, "request started");

    let items = state.orchestrator.home_feed(user_id).await.map_err(|e| {
        error!(target: "api::home_feed", %req_id, user_id, error = %e, "request failed");
        e
    })?;

    info!(target: "api::home_feed", %req_id, user_id, returned = items.len(), "request succeeded");
    Ok(ApiResponse::success(HomeFeedResponse { user_id, items })
        .into_response_with_status(StatusCode::OK))
}
