//! Payload normalizer.
//!
//! Turns a loosely structured "save procedure record" request (one object or
//! an array of them) into the rigid schema of `POST /imapronq/create`.
//! Missing or null fields become `""` / `0`; nothing is ever absent.

mod coerce;
mod record;

pub use coerce::{as_int, as_str};
pub use record::{ProcedureKey, ProcedureRecord};

use serde_json::{Map, Value};

use crate::error::{BridgeError, BridgeResult};
use crate::share_path::normalize_share_path;

/// Name of the nested object carrying the composite key.
pub const KEY_OBJECT: &str = "imapronqpk";

/// Logical record fields that are read from the top level of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    RecordType,
    RecordedBy,
    FilePath,
    RecordedAt,
    Observation,
    ProcedureCode,
}

/// Wire names each logical field may arrive under, first-present-wins.
/// Add older client names to the end of a candidate list.
pub const FIELD_ALIASES: &[(RecordField, &[&str])] = &[
    (RecordField::RecordType, &["imatipreg"]),
    (RecordField::RecordedBy, &["imausureg"]),
    (RecordField::FilePath, &["imarutpro", "archivos"]),
    (RecordField::RecordedAt, &["imafechor"]),
    (RecordField::Observation, &["imaobs"]),
    (RecordField::ProcedureCode, &["codpro"]),
];

fn candidates(field: RecordField) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// First candidate present with a non-null value.
fn resolve(item: &Map<String, Value>, field: RecordField) -> Option<&Value> {
    candidates(field)
        .iter()
        .filter_map(|name| item.get(*name))
        .find(|v| !v.is_null())
}

/// Key field lookup: a field present in the nested key object wins (even when
/// null); otherwise the top-level field of the same name is used.
fn key_field<'a>(
    key: Option<&'a Map<String, Value>>,
    item: &'a Map<String, Value>,
    name: &str,
) -> Option<&'a Value> {
    match key.and_then(|k| k.get(name)) {
        Some(v) => Some(v),
        None => item.get(name),
    }
}

/// Normalize a single item. Non-object items are treated as empty objects.
pub fn normalize_record(item: &Value) -> ProcedureRecord {
    let empty = Map::new();
    let item = item.as_object().unwrap_or(&empty);
    let key = item.get(KEY_OBJECT).and_then(Value::as_object);

    let text = |field| as_str(resolve(item, field));

    ProcedureRecord {
        key: ProcedureKey {
            facility_code: as_int(key_field(key, item, "s1CODIMA")),
            record_sequence: as_int(key_field(key, item, "imacnsreg")),
            patient_key: as_str(key_field(key, item, "hisckey")),
            patient_doc_type: as_str(key_field(key, item, "histipdoc")),
            visit_sequence: as_int(key_field(key, item, "hiscsec")),
        },
        record_type: text(RecordField::RecordType),
        recorded_by: text(RecordField::RecordedBy),
        file_path: normalize_share_path(&text(RecordField::FilePath)),
        recorded_at: text(RecordField::RecordedAt),
        observation: text(RecordField::Observation),
        procedure_code: text(RecordField::ProcedureCode),
    }
}

/// Normalize a whole payload. An object is a one-element batch; an array is
/// normalized item by item in order; anything else is rejected.
pub fn normalize_payload(data: &Value) -> BridgeResult<Vec<ProcedureRecord>> {
    match data {
        Value::Object(_) => Ok(vec![normalize_record(data)]),
        Value::Array(items) => Ok(items.iter().map(normalize_record).collect()),
        _ => Err(BridgeError::invalid(
            "invalid payload: expected an object or an array of objects",
        )),
    }
}
