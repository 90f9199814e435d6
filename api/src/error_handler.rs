use activity_log::ActivityLogError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use recommender::RecommenderError;
use thiserror::Error;

use crate::core::http::response_envelope::{ApiResponse, FieldIssue};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- IO / server ---
    #[error("failed to bind listener on {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
        path: Option<&'static str>,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Bind { .. } | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }

    fn fields(&self) -> Vec<FieldIssue> {
        match self {
            AppError::Http { path: Some(p), .. } => vec![FieldIssue::field(*p)],
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), self.fields())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<ActivityLogError> for AppError {
    fn from(err: ActivityLogError) -> Self {
        match err {
            ActivityLogError::UnknownActivityType(_) => AppError::Http {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "UNKNOWN_ACTIVITY_TYPE",
                message: err.to_string(),
                path: Some("activity_type"),
            },
            ActivityLogError::InvalidQuantity(_) => AppError::Http {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "INVALID_QUANTITY",
                message: err.to_string(),
                path: Some("quantity"),
            },
            ActivityLogError::Io(_) | ActivityLogError::Json(_) => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "ACTIVITY_LOG_ERROR",
                message: err.to_string(),
                path: None,
            },
        }
    }
}

/// Serving paths only surface activity-log failures; everything else is a
/// server fault.
impl From<RecommenderError> for AppError {
    fn from(err: RecommenderError) -> Self {
        match err {
            RecommenderError::ActivityLog(e) => e.into(),
            other => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "RECOMMENDER_ERROR",
                message: other.to_string(),
                path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_activity_type_is_422() {
        let err: AppError = RecommenderError::ActivityLog(ActivityLogError::UnknownActivityType(
            "like".into(),
        ))
        .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "UNKNOWN_ACTIVITY_TYPE");
        assert_eq!(err.fields().len(), 1);
    }

    #[test]
    fn other_recommender_errors_are_500() {
        let err: AppError = RecommenderError::InvalidConfig("x".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let res = AppError::BadRequest("page must be >= 1".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
