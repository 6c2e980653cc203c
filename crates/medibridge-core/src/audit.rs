//! Append-only audit log of payloads the upstream accepted.
//!
//! Each entry is a block:
//!
//! ```text
//! ========================================
//! RECORDED AT: 2024-05-02T10:31:07.123456
//! PAYLOAD (imapronq/create):
//! [ ...pretty-printed JSON... ]
//!
//! ```

use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const SEPARATOR_WIDTH: usize = 40;

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory. Called once at startup; `append` itself
    /// never creates directories.
    pub fn ensure_parent(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    /// Append one timestamped block for `payload`.
    pub fn append<T: Serialize + ?Sized>(&self, payload: &T) -> io::Result<()> {
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        self.append_at(&timestamp, payload)
    }

    /// Append with an explicit timestamp.
    pub fn append_at<T: Serialize + ?Sized>(&self, timestamp: &str, payload: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(payload).map_err(io::Error::other)?;
        let block = format!(
            "{}\nRECORDED AT: {}\nPAYLOAD (imapronq/create):\n{}\n\n",
            "=".repeat(SEPARATOR_WIDTH),
            timestamp,
            json
        );

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // Single write per block.
        f.write_all(block.as_bytes())?;
        f.flush()
    }
}
