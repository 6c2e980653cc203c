//! Medihelp API client.
//!
//! Uses the curl crate (libcurl). Every call blocks the current thread;
//! async callers go through `tokio::task::spawn_blocking`.

mod response;
mod transport;

pub use response::UpstreamResponse;

use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::config::TimeoutConfig;
use crate::error::{truncate_detail, BridgeError, BridgeResult};
use crate::normalize::ProcedureRecord;
use crate::share_path::clean_rutima;
use transport::{perform, Method};

pub const CREATE_ENDPOINT: &str = "imapronq/create";

/// Defaults the frontend uses for the booking lookup.
pub const DEFAULT_SEDE: &str = "ARH01";
pub const DEFAULT_BOOKING_VALUE: &str = "4";

/// Path parameters of `hccom/v2/booking`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingQuery {
    pub histipdoc: String,
    pub hisckey: String,
    /// Value returned by the ingresos lookup.
    pub ingresos: String,
    pub sede: String,
    pub valor: String,
}

impl BookingQuery {
    pub fn new(histipdoc: &str, hisckey: &str, ingresos: &str) -> Self {
        Self {
            histipdoc: histipdoc.to_string(),
            hisckey: hisckey.to_string(),
            ingresos: ingresos.to_string(),
            sede: DEFAULT_SEDE.to_string(),
            valor: DEFAULT_BOOKING_VALUE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MedihelpClient {
    base: Url,
    timeouts: TimeoutConfig,
}

impl MedihelpClient {
    pub fn new(base_url: &str, timeouts: TimeoutConfig) -> BridgeResult<Self> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| BridgeError::Internal(format!("invalid Medihelp base URL {}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(BridgeError::Internal(format!(
                "Medihelp base URL cannot carry a path: {}",
                base_url
            )));
        }
        Ok(Self { base, timeouts })
    }

    /// Base URL extended with percent-encoded path segments.
    pub fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn call(
        &self,
        endpoint: &str,
        method: Method,
        segments: &[&str],
        timeout: Duration,
    ) -> BridgeResult<UpstreamResponse> {
        let url = self.endpoint_url(segments);
        tracing::debug!(%url, "upstream {}", endpoint);
        perform(&method, url.as_str(), timeout).map_err(|failure| {
            tracing::warn!(%url, error = %failure.error, "upstream {} unreachable", endpoint);
            BridgeError::UpstreamUnreachable {
                endpoint: endpoint.to_string(),
                detail: truncate_detail(&failure.detail()),
            }
        })
    }

    /// GET/PUT with the read timeout; non-2xx is a rejection.
    fn read(&self, endpoint: &str, method: Method, segments: &[&str]) -> BridgeResult<UpstreamResponse> {
        let resp = self.call(endpoint, method, segments, self.timeouts.read())?;
        if !resp.is_success() {
            return Err(rejected(endpoint, &resp));
        }
        Ok(resp)
    }

    /// `POST imapronq/create` with the save timeout. The reply is returned
    /// whatever its status; the caller decides what counts as accepted.
    pub fn create_procedure_records(
        &self,
        records: &[ProcedureRecord],
    ) -> BridgeResult<UpstreamResponse> {
        let payload = serde_json::to_vec(records)
            .map_err(|e| BridgeError::Internal(format!("serialize payload: {}", e)))?;
        tracing::info!(
            url = %self.endpoint_url(&["imapronq", "create"]),
            records = records.len(),
            "posting procedure records"
        );
        self.call(
            CREATE_ENDPOINT,
            Method::PostJson(payload),
            &["imapronq", "create"],
            self.timeouts.save(),
        )
    }

    /// Patient demographics by document type and number.
    pub fn capbas(&self, tipo_documento: &str, numero: &str) -> BridgeResult<Value> {
        let endpoint = "capbas";
        let resp = self.read(endpoint, Method::Get, &["capbas", "get", tipo_documento, numero])?;
        resp.json().map_err(|e| invalid(endpoint, e))
    }

    /// Admissions for a patient.
    pub fn ingresos(&self, hisckey: &str, histipdoc: &str) -> BridgeResult<Value> {
        let endpoint = "ingresos";
        let resp = self.read(endpoint, Method::Get, &["ingresos", "get", hisckey, histipdoc])?;
        json_or_raw(endpoint, &resp)
    }

    /// Booking lookup. The upstream exposes it as a PUT.
    pub fn booking(&self, q: &BookingQuery) -> BridgeResult<Value> {
        let endpoint = "booking";
        let segments = [
            "hccom",
            "v2",
            "booking",
            q.histipdoc.as_str(),
            q.hisckey.as_str(),
            q.ingresos.as_str(),
            q.sede.as_str(),
            q.valor.as_str(),
        ];
        let resp = self.read(endpoint, Method::Put, &segments)?;
        json_or_raw(endpoint, &resp)
    }

    /// Image-type metadata by `S1CODIMA`, with a cleaned `rutima_clean` added.
    pub fn imahc(&self, s1codima: &str) -> BridgeResult<Value> {
        let endpoint = "imahc/get";
        let resp = self.read(endpoint, Method::Get, &["imahc", "get", s1codima])?;
        if !resp.is_json() {
            return Ok(resp.raw());
        }
        let data = resp.json().map_err(|e| invalid(endpoint, e))?;
        Ok(shape_imahc(data))
    }
}

fn rejected(endpoint: &str, resp: &UpstreamResponse) -> BridgeError {
    let body = truncate_detail(&resp.text());
    tracing::warn!(status = resp.status, body = %body, "upstream {} rejected request", endpoint);
    BridgeError::UpstreamRejected {
        endpoint: endpoint.to_string(),
        status: resp.status,
        body,
    }
}

fn invalid(endpoint: &str, e: serde_json::Error) -> BridgeError {
    BridgeError::UpstreamInvalid {
        endpoint: endpoint.to_string(),
        detail: e.to_string(),
    }
}

fn json_or_raw(endpoint: &str, resp: &UpstreamResponse) -> BridgeResult<Value> {
    if resp.is_json() {
        resp.json().map_err(|e| invalid(endpoint, e))
    } else {
        Ok(resp.raw())
    }
}

/// Picks the first element of a list reply; objects get `rutima_clean`,
/// anything else is wrapped as `{"data": ...}`.
pub fn shape_imahc(data: Value) -> Value {
    let target = match &data {
        Value::Array(items) if !items.is_empty() => items[0].clone(),
        _ => data.clone(),
    };
    match target {
        Value::Object(mut obj) => {
            let rutima = crate::normalize::as_str(obj.get("rutima"));
            obj.insert("rutima_clean".to_string(), Value::String(clean_rutima(&rutima)));
            Value::Object(obj)
        }
        _ => serde_json::json!({ "data": data }),
    }
}
