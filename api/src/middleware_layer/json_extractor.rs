//! Re-wraps axum's plain-text 400/422 rejections into the JSON envelope.

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::core::http::response_envelope::{ApiResponse, FieldIssue};

const KNOWN_FIELDS: [&str; 7] = [
    "activity_type",
    "product_id",
    "user_id",
    "quantity",
    "per_page",
    "page",
    "top_k",
];

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    KNOWN_FIELDS
        .iter()
        .find(|key| msg.contains(*key))
        .map(|key| key.to_string())
}

/// Reuse the caller's `X-Request-Id` or mint one from the clock.
pub fn request_id(headers: &axum::http::HeaderMap) -> String {
    headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let nanos = Utc::now()
                .timestamp_nanos_opt()
                .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
            format!("req-{nanos}")
        })
}

pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY) {
        return res;
    }

    // Already enveloped by a handler.
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    let id = request_id(&parts.headers);
    if let Ok(v) = HeaderValue::from_str(&id) {
        parts.headers.insert("X-Request-Id", v);
    }

    let hint = if original.contains("invalid digit") || original.contains("invalid type") {
        Some("Identifiers and sizes must be non-negative integers.".to_string())
    } else if original.contains("expected a map") || original.contains("expected struct") {
        Some("Expected a JSON object here (e.g. { \"field\": \"value\" }).".to_string())
    } else {
        None
    };
    let issue = FieldIssue {
        field: guess_path_from_serde_msg(&original),
        ..Default::default()
    }
    .with_hint(hint);

    let envelope = ApiResponse::<()>::error(
        if status == StatusCode::BAD_REQUEST {
            "BAD_REQUEST"
        } else {
            "UNPROCESSABLE_ENTITY"
        },
        original.trim(),
        vec![issue],
    );

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_field_from_message() {
        assert_eq!(
            guess_path_from_serde_msg("Failed to deserialize query string: per_page: invalid digit"),
            Some("per_page".to_string())
        );
        assert_eq!(guess_path_from_serde_msg("something else"), None);
    }

    #[test]
    fn request_id_prefers_header() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("X-Request-Id", HeaderValue::from_static("abc"));
        assert_eq!(request_id(&headers), "abc");
        assert!(request_id(&axum::http::HeaderMap::new()).starts_with("req-"));
    }
}
