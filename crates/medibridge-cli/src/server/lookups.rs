//! Read-through proxies to Medihelp plus the HIS sequence lookup.

use axum::extract::{Path, State};
use axum::Json;
use medibridge_core::medihelp::BookingQuery;
use medibridge_core::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{blocking, ApiError};
use super::AppState;

pub async fn capbas(
    State(state): State<AppState>,
    Path((tipo_documento, numero)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let v = blocking(move || state.client.capbas(&tipo_documento, &numero)).await?;
    Ok(Json(v))
}

pub async fn ingresos(
    State(state): State<AppState>,
    Path((hisckey, histipdoc)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let v = blocking(move || state.client.ingresos(&hisckey, &histipdoc)).await?;
    Ok(Json(v))
}

#[derive(Debug, Deserialize)]
pub struct BookingPath {
    histipdoc: String,
    hisckey: String,
    ingresos: String,
    sede: String,
    valor: String,
}

impl From<BookingPath> for BookingQuery {
    fn from(p: BookingPath) -> Self {
        BookingQuery {
            histipdoc: p.histipdoc,
            hisckey: p.hisckey,
            ingresos: p.ingresos,
            sede: p.sede,
            valor: p.valor,
        }
    }
}

pub async fn booking(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
) -> Result<Json<Value>, ApiError> {
    let query = BookingQuery::from(path);
    let v = blocking(move || state.client.booking(&query)).await?;
    Ok(Json(v))
}

pub async fn imahc(
    State(state): State<AppState>,
    Path(s1codima): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let v = blocking(move || state.client.imahc(&s1codima)).await?;
    Ok(Json(v))
}

#[derive(Debug, Serialize)]
pub struct HiscsecReply {
    hisckey: String,
    hiscsec: String,
}

pub async fn hiscsec(
    State(state): State<AppState>,
    Path(hisckey): Path<String>,
) -> Result<Json<HiscsecReply>, ApiError> {
    let key = hisckey.clone();
    let found = blocking(move || state.his.latest_hiscsec(&key)).await?;
    match found {
        Some(hiscsec) => Ok(Json(HiscsecReply { hisckey, hiscsec })),
        None => Err(ApiError(BridgeError::NotFound(format!(
            "no HISCSEC found for hisckey {}",
            hisckey
        )))),
    }
}
