use activity_log::{ActivityEvent, ActivityType};
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{error, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    middleware_layer::json_extractor::request_id,
    routes::activity::record_activity_request::{RecordActivityRequest, RecordActivityResponse},
};

/// `POST /activity`: append one event stamped with the current time.
///
/// Activity types outside the closed set are rejected with 422.
pub async fn record_activity_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RecordActivityRequest>,
) -> AppResult<Response> {
    let req_id = request_id(&headers);
    let activity_type: ActivityType = body.activity_type.parse()?;

    let event = ActivityEvent::new(body.user_id, body.product_id, activity_type)
        .with_quantity(body.quantity.unwrap_or(1));

    if let Err(e) = state.orchestrator.record_activity(event).await {
        error!(target: "api::activity", %req_id, user_id = body.user_id, error = %e, "request failed");
        return Err(e.into());
    }

    info!(
        target: "api::activity",
        %req_id,
        user_id = body.user_id,
        product_id = body.product_id,
        activity_type = %activity_type,
        "activity recorded"
    );

    Ok(ApiResponse::success(RecordActivityResponse { recorded: true })
        .into_response_with_status(StatusCode::CREATED))
}
