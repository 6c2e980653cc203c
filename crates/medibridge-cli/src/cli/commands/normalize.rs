//! Normalize command: show what would be sent to `imapronq/create`.

use anyhow::{Context, Result};
use medibridge_core::normalize::normalize_payload;
use std::path::Path;

pub fn run_normalize(path: &Path) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_slice(&data).with_context(|| format!("parse JSON in {}", path.display()))?;
    let records = normalize_payload(&value)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
