//! CLI for the Medihelp bridge.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use medibridge_core::config;
use std::path::PathBuf;

use commands::{run_normalize, run_serve, run_show_config, run_stage};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "medibridge")]
#[command(about = "Bridge between the clinic frontend, the Medihelp API and the PDF network share", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the HTTP server.
    Serve {
        /// Listen address (overrides `bind_addr` from the config file).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Print the normalized `imapronq/create` payload for a JSON file (no upstream call).
    Normalize {
        /// JSON file holding one record object or an array of them.
        path: PathBuf,
    },

    /// Stage a local PDF onto the network share using the upload rules.
    Stage {
        /// File to copy.
        path: PathBuf,
        /// Final filename (defaults to the source file name).
        #[arg(long)]
        name: Option<String>,
        /// Destination share directory (defaults to `pdf_dest_dir`).
        #[arg(long)]
        dir: Option<String>,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Serve { bind } => run_serve(&cfg, bind.as_deref()).await?,
            CliCommand::Normalize { path } => run_normalize(&path)?,
            CliCommand::Stage { path, name, dir } => {
                run_stage(&cfg, &path, name.as_deref(), dir.as_deref()).await?
            }
            CliCommand::Config => run_show_config(&cfg)?,
        }

        Ok(())
    }
}
