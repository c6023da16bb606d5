use crate::app_error::AppError;
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Every fault renders as 500 with the error's message. Callers tell faults
/// apart by message, not status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Faults are logged at error level where they happen.
        tracing::debug!(error = %self, code = self.code().as_str(), "Request failed");

        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
