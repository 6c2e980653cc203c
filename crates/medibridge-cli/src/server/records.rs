use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use medibridge_core::records::{save_procedure_records, SaveOutcome};
use medibridge_core::BridgeError;
use serde_json::Value;

use super::error::{blocking, ApiError};
use super::AppState;

/// `POST /guardar`
pub async fn save_records(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveOutcome>, ApiError> {
    let data: Value = serde_json::from_slice(&body)
        .map_err(|e| BridgeError::invalid(format!("request body is not valid JSON: {}", e)))?;

    let outcome = blocking(move || save_procedure_records(&state.client, &state.audit, &data)).await?;
    Ok(Json(outcome))
}
