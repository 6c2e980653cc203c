use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Upstream call timeouts (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout in seconds for the read-through proxies (capbas, ingresos, booking, imahc).
    pub read_secs: u64,
    /// Timeout in seconds for the procedure-record save call.
    pub save_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 10,
            save_secs: 15,
        }
    }
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn save(&self) -> Duration {
        Duration::from_secs(self.save_secs)
    }
}

/// Global configuration loaded from `~/.config/medibridge/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: String,
    /// Base URL of the Medihelp API (no trailing slash needed).
    pub medihelp_base_url: String,
    /// Network share used when an upload names no destination directory.
    pub pdf_dest_dir: String,
    /// Audit log file; defaults to `registros.txt` under the XDG state dir.
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
    /// Directory holding the static frontend (index.html etc.). Not served when unset.
    #[serde(default)]
    pub frontend_dir: Option<PathBuf>,
    /// ODBC connection string for the HIS database.
    pub his_connection: String,
    /// Largest accepted upload request body, in bytes.
    pub max_upload_bytes: usize,
    /// Where `\\host\share` paths are mounted on non-Windows hosts
    /// (`\\host\share\dir` -> `<root>/host/share/dir`). Unset: use share paths natively.
    #[serde(default)]
    pub share_mount_root: Option<PathBuf>,
    /// Optional timeouts; if missing, built-in defaults are used.
    #[serde(default)]
    pub timeouts: Option<TimeoutConfig>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            medihelp_base_url: "http://172.16.2.51:8070/Medihelp-api".to_string(),
            pdf_dest_dir: r"\\filemh01\USERS\gustavob\Documents\GUSTAVO.BLANCO".to_string(),
            audit_log: None,
            frontend_dir: None,
            his_connection: "DSN=HIS;UID=HOSVITAL;PWD=HOSVITAL;".to_string(),
            max_upload_bytes: 100 * 1024 * 1024,
            share_mount_root: None,
            timeouts: None,
        }
    }
}

impl BridgeConfig {
    pub fn timeouts(&self) -> TimeoutConfig {
        self.timeouts.clone().unwrap_or_default()
    }

    /// Resolved audit log path (configured value or the XDG state default).
    pub fn audit_log_path(&self) -> Result<PathBuf> {
        match &self.audit_log {
            Some(p) => Ok(p.clone()),
            None => Ok(state_dir()?.join("registros.txt")),
        }
    }

    /// Apply environment overrides on top of the file values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("PDF_DEST_DIR") {
            self.pdf_dest_dir = v;
        }
        if let Some(v) = get("MEDIHELP_BASE") {
            self.medihelp_base_url = v;
        }
        if let Some(v) = get("MEDIBRIDGE_BIND") {
            self.bind_addr = v;
        }
        if let Some(v) = get("MEDIBRIDGE_AUDIT_LOG") {
            self.audit_log = Some(PathBuf::from(v));
        }
        if let Some(v) = get("MEDIBRIDGE_SHARE_ROOT") {
            self.share_mount_root = Some(PathBuf::from(v));
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("medibridge")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// State directory (`~/.local/state/medibridge`), used for the log and the audit file.
pub fn state_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("medibridge")?;
    Ok(xdg_dirs.get_state_home().join("medibridge"))
}

/// Load configuration from disk, creating a default file if none exists.
/// Environment overrides are applied afterwards.
pub fn load_or_init() -> Result<BridgeConfig> {
    let path = config_path()?;
    let mut cfg = if !path.exists() {
        let default_cfg = BridgeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    } else {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data)?
    };
    cfg.apply_env();
    Ok(cfg)
}
