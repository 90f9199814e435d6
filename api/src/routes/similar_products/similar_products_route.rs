use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::info;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    middleware_layer::json_extractor::request_id,
    routes::similar_products::similar_products_query::{
        DEFAULT_TOP_K, SimilarProductsQuery, SimilarProductsResponse,
    },
};

/// `GET /products/{product_id}/similar`: content-based neighbours.
///
/// Unknown products answer with an empty list.
pub async fn similar_products_route(
    State(state): State<AppState>,
    Path(product_id): Path<u64>,
    headers: HeaderMap,
    Query(query): Query<SimilarProductsQuery>,
) -> AppResult<Response> {
    let req_id = request_id(&headers);
    let top_k = query.top_k.unwrap_or(DEFAULT_TOP_K);

    let items = state.orchestrator.similar_products(product_id, top_k);
    info!(
        target: "api::similar",
        %req_id,
        product_id,
        top_k,
        returned = items.len(),
        "request succeeded"
    );

    Ok(ApiResponse::success(SimilarProductsResponse { product_id, items })
        .into_response_with_status(StatusCode::OK))
}
