//! Save path: normalize, forward to `imapronq/create`, then back up locally.
//!
//! The audit block is written only when the upstream answers exactly 200.
//! A failed audit write after an accepted save is reported, not escalated.

use serde::Serialize;
use serde_json::Value;

use crate::audit::AuditLog;
use crate::error::{truncate_detail, BridgeError, BridgeResult};
use crate::medihelp::{MedihelpClient, CREATE_ENDPOINT};
use crate::normalize::normalize_payload;

/// Response envelope of a save that the upstream accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
    /// Upstream reply (JSON, or `{"raw": text}`).
    pub api: Value,
    pub backup_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_error: Option<String>,
}

/// Blocking; call from `spawn_blocking` in async code.
pub fn save_procedure_records(
    client: &MedihelpClient,
    audit: &AuditLog,
    data: &Value,
) -> BridgeResult<SaveOutcome> {
    let payload = normalize_payload(data)?;

    let resp = client.create_procedure_records(&payload)?;
    if resp.status != 200 {
        let body = truncate_detail(&resp.text());
        tracing::warn!(status = resp.status, body = %body, "imapronq/create rejected; no backup written");
        return Err(BridgeError::UpstreamRejected {
            endpoint: CREATE_ENDPOINT.to_string(),
            status: resp.status,
            body,
        });
    }
    tracing::info!(records = payload.len(), "imapronq/create accepted");

    // A 200 with an unparseable JSON body still counts as accepted.
    let api = if resp.is_json() {
        resp.json().unwrap_or_else(|_| resp.raw())
    } else {
        resp.raw()
    };

    match audit.append(&payload) {
        Ok(()) => Ok(SaveOutcome {
            api,
            backup_ok: true,
            backup_error: None,
        }),
        Err(e) => {
            tracing::error!(path = %audit.path().display(), error = %e, "audit backup failed after accepted save");
            Ok(SaveOutcome {
                api,
                backup_ok: false,
                backup_error: Some(e.to_string()),
            })
        }
    }
}
