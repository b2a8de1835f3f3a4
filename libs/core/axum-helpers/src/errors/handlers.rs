use axum::{http::StatusCode, response::Response};

use super::{ErrorCode, error_response};

/// Router fallback producing a JSON 404.
pub async fn not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "The requested resource was not found".to_string(),
        ErrorCode::NotFound,
    )
}
