use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use swachh_sdk::SwachhError;

/// Unified error type that renders as a JSON `{"error": "..."}` response
/// with an appropriate HTTP status code.
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<SwachhError> for AppError {
    fn from(e: SwachhError) -> Self {
        let status = match &e {
            SwachhError::NotFound(_) => StatusCode::NOT_FOUND,
            SwachhError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SwachhError::Auth(_) => StatusCode::UNAUTHORIZED,
            SwachhError::Verification(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SwachhError::VerificationInFlight => StatusCode::CONFLICT,
            SwachhError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %e, "request failed");
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}
