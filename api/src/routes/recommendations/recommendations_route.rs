use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{error, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    middleware_layer::json_extractor::request_id,
    routes::recommendations::{
        recommendations_query::{DEFAULT_PER_PAGE, RecommendationsQuery},
        recommendations_response::RecommendationsResponse,
    },
};

/// `GET /recommendations/{user_id}`: paginated personalized recommendations.
///
/// An empty history answers with an empty page, not an error.
pub async fn recommendations_route(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    headers: HeaderMap,
    Query(query): Query<RecommendationsQuery>,
) -> AppResult<Response> {
    let req_id = request_id(&headers);
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if page == 0 || per_page == 0 {
        return Err(AppError::BadRequest("page and per_page must be >= 1".into()));
    }

    info!(target: "api::recommendations", %req_id, user_id, page, per_page, "request started");

    let ranked = match state.orchestrator.get_recommendations(user_id, query.limit).await {
        Ok(r) => r,
        Err(e) => {
            error!(target: "api::recommendations", %req_id, user_id, error = %e, "request failed");
            return Err(e.into());
        }
    };

    let total = ranked.len();
    let items: Vec<_> = ranked
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    info!(
        target: "api::recommendations",
        %req_id,
        user_id,
        total,
        returned = items.len(),
        "request succeeded"
    );

    Ok(ApiResponse::success(RecommendationsResponse {
        user_id,
        items,
        page,
        per_page,
        total,
        total_pages: total.div_ceil(per_page),
    })
    .into_response_with_status(StatusCode::OK))
}
