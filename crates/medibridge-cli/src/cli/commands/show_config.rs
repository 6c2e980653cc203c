//! Config command: where the config lives and what is in effect.

use anyhow::Result;
use medibridge_core::config::{self, BridgeConfig};

pub fn run_show_config(cfg: &BridgeConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    println!("# audit log: {}", cfg.audit_log_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
