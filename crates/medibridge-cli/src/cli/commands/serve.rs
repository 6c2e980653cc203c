//! Serve command: run the HTTP server until Ctrl-C.

use anyhow::Result;
use medibridge_core::config::BridgeConfig;

use crate::server;

pub async fn run_serve(cfg: &BridgeConfig, bind: Option<&str>) -> Result<()> {
    let addr = bind.unwrap_or(&cfg.bind_addr);
    server::serve(cfg, addr).await
}
