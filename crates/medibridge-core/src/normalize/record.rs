//! Wire schema expected by `POST /imapronq/create`.

use serde::{Deserialize, Serialize};

/// Composite key addressing one procedure record upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureKey {
    #[serde(rename = "s1CODIMA")]
    pub facility_code: i64,
    #[serde(rename = "imacnsreg")]
    pub record_sequence: i64,
    #[serde(rename = "hisckey")]
    pub patient_key: String,
    #[serde(rename = "histipdoc")]
    pub patient_doc_type: String,
    #[serde(rename = "hiscsec")]
    pub visit_sequence: i64,
}

/// One fully-populated procedure record. Every field is always present;
/// missing input becomes `""` or `0`, and `file_path` is in share form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureRecord {
    #[serde(rename = "imapronqpk")]
    pub key: ProcedureKey,
    #[serde(rename = "imatipreg")]
    pub record_type: String,
    #[serde(rename = "imausureg")]
    pub recorded_by: String,
    #[serde(rename = "imarutpro")]
    pub file_path: String,
    #[serde(rename = "imafechor")]
    pub recorded_at: String,
    #[serde(rename = "imaobs")]
    pub observation: String,
    #[serde(rename = "codpro")]
    pub procedure_code: String,
}
