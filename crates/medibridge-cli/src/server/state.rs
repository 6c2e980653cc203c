use anyhow::Result;
use medibridge_core::audit::AuditLog;
use medibridge_core::config::BridgeConfig;
use medibridge_core::his::HiscsecSource;
use medibridge_core::medihelp::MedihelpClient;
use medibridge_core::staging::{FileStager, ShareMount};
use std::sync::Arc;

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub client: MedihelpClient,
    pub audit: AuditLog,
    pub stager: Arc<FileStager>,
    pub his: Arc<dyn HiscsecSource>,
}

impl AppState {
    pub fn from_config(cfg: &BridgeConfig) -> Result<Self> {
        let client = MedihelpClient::new(&cfg.medihelp_base_url, cfg.timeouts())?;

        let audit = AuditLog::new(cfg.audit_log_path()?);
        // Not fatal: a missing directory shows up later as backup_ok = false.
        if let Err(e) = audit.ensure_parent() {
            tracing::warn!(path = %audit.path().display(), error = %e, "cannot create audit log directory");
        }

        let mount = ShareMount::from_config(cfg.share_mount_root.clone());
        if mount.is_native() && !cfg!(windows) {
            tracing::warn!("share_mount_root is not set; share paths will be used as local paths");
        }
        let stager = Arc::new(FileStager::new(cfg.pdf_dest_dir.clone(), mount));

        Ok(Self {
            client,
            audit,
            stager,
            his: his_source(cfg)?,
        })
    }
}

#[cfg(feature = "odbc")]
fn his_source(cfg: &BridgeConfig) -> Result<Arc<dyn HiscsecSource>> {
    let his = medibridge_core::his::OdbcHis::new(cfg.his_connection.clone())?;
    Ok(Arc::new(his))
}

#[cfg(not(feature = "odbc"))]
fn his_source(_cfg: &BridgeConfig) -> Result<Arc<dyn HiscsecSource>> {
    tracing::warn!("built without ODBC support; /api/hiscsec will answer 500");
    Ok(Arc::new(medibridge_core::his::UnavailableHis))
}
