use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medibridge_core::BridgeError;
use serde_json::json;

/// Renders a [`BridgeError`] as `{"detail": "..."}` with its mapped status.
#[derive(Debug)]
pub struct ApiError(pub BridgeError);

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let detail = self.0.to_string();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self.0, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), %detail, "request rejected");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Run blocking core work (curl, filesystem, ODBC) off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, BridgeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError(BridgeError::Internal(format!("worker task failed: {}", e))))?
        .map_err(ApiError)
}
