//! Stage command: copy a local PDF onto the share with the upload rules.

use anyhow::{Context, Result};
use medibridge_core::config::BridgeConfig;
use medibridge_core::staging::{FileStager, ShareMount, UploadReceipt};
use std::fs::File;
use std::path::Path;

pub async fn run_stage(
    cfg: &BridgeConfig,
    path: &Path,
    name: Option<&str>,
    dir: Option<&str>,
) -> Result<()> {
    let name = match name {
        Some(n) => n.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name; pass --name", path.display()))?,
    };
    let dir = dir.map(str::to_string);
    let stager = FileStager::new(
        cfg.pdf_dest_dir.clone(),
        ShareMount::from_config(cfg.share_mount_root.clone()),
    );
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;

    let staged = tokio::task::spawn_blocking(move || stager.stage(&mut file, &name, dir.as_deref()))
        .await??;
    println!("{}", serde_json::to_string_pretty(&UploadReceipt::from(&staged))?);
    Ok(())
}
