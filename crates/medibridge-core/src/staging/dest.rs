//! Destination directory resolution and share-to-filesystem mapping.

use std::path::PathBuf;

use crate::error::{BridgeError, BridgeResult};
use crate::share_path::{looks_like_local_drive, normalize_share_path};

/// Client-supplied directory (normalized to share form) or the configured default.
///
/// Blank client values count as absent. Local drive paths (`C:...`) and
/// `..` segments are rejected.
pub fn resolve_dest_dir(client_dir: Option<&str>, default_dir: &str) -> BridgeResult<String> {
    let client_dir = client_dir.map(str::trim).filter(|d| !d.is_empty());

    let resolved = match client_dir {
        Some(dir) => {
            if looks_like_local_drive(dir) {
                return Err(local_drive_error());
            }
            normalize_share_path(dir)
        }
        None => default_dir.trim().to_string(),
    };

    if resolved.is_empty() {
        return Err(BridgeError::invalid("no destination directory configured"));
    }
    if looks_like_local_drive(&resolved) || is_device_or_drive_host(&resolved) {
        return Err(local_drive_error());
    }
    if resolved.split(['\\', '/']).any(|seg| seg == "..") {
        return Err(BridgeError::invalid("dest_dir must not contain '..' segments"));
    }
    Ok(resolved)
}

/// `\\?\...` and `\\.\...` address the local device namespace, and a host
/// segment like `C:` names a drive, not a server.
fn is_device_or_drive_host(share: &str) -> bool {
    match share.split(['\\', '/']).find(|seg| !seg.is_empty()) {
        Some(host) => host == "?" || host == "." || host.contains(':'),
        None => false,
    }
}

fn local_drive_error() -> BridgeError {
    BridgeError::invalid("dest_dir must be a network share path (\\\\server\\share\\...)")
}

/// Share path in response form: `dest_dir\name`.
pub fn share_join(dest_dir: &str, name: &str) -> String {
    format!("{}\\{}", dest_dir.trim_end_matches(['\\', '/']), name)
}

/// Maps share paths onto the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct ShareMount {
    root: Option<PathBuf>,
}

impl ShareMount {
    /// Share paths are used as native paths (Windows hosts).
    pub fn native() -> Self {
        Self { root: None }
    }

    /// `\\host\share\dir` maps to `root/host/share/dir`.
    pub fn mounted_at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn from_config(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn is_native(&self) -> bool {
        self.root.is_none()
    }

    pub fn to_fs_path(&self, share: &str) -> PathBuf {
        match &self.root {
            None => PathBuf::from(share),
            Some(root) => share
                .split(['\\', '/'])
                .filter(|seg| !seg.is_empty() && *seg != ".")
                .fold(root.clone(), |acc, seg| acc.join(seg)),
        }
    }
}
