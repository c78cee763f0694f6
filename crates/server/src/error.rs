use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// The sole translator between internal states and HTTP status codes.
/// `ProducerFailure` never reaches this type — producers swallow their own
/// errors (see `waypoint::quotes::producer::ProducerError`) — and
/// `FeedUnavailable` is handled upstream as an empty, non-error result.
#[derive(Debug)]
pub enum ApiError {
    InputInvalid(String),
    Unexpected(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InputInvalid(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unexpected(msg) => {
                error!("unexpected error at transport boundary: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
