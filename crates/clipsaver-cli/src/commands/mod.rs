//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clipsaver_core::config::OutputKind;
use clipsaver_core::Settings;
use clipsaver_media::EncodeFormat;
use std::path::PathBuf;

pub mod estimate;
pub mod reset;
pub mod stats;
pub mod watch;

/// ClipSaver - clipboard image token savings tracker
#[derive(Parser)]
#[command(name = "clipsaver")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "CLIPSAVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the savings ledger (JSON)
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch the clipboard and estimate savings for each new image
    Watch(watch::WatchArgs),

    /// Show accumulated token savings
    Stats,

    /// Reset token savings to zero
    Reset,

    /// Estimate savings for an image file without touching the ledger
    Estimate(estimate::EstimateArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut settings = Settings::load(self.config.as_deref()).context("Failed to load settings")?;
        if let Some(ledger) = self.ledger {
            settings.ledger_path = ledger;
        }
        tracing::debug!(ledger = %settings.ledger_path.display(), mode = ?settings.mode, "Settings loaded");

        match self.command {
            Commands::Watch(args) => watch::execute(args, settings).await,
            Commands::Stats => stats::execute(&settings),
            Commands::Reset => reset::execute(&settings),
            Commands::Estimate(args) => estimate::execute(args, settings),
        }
    }
}

/// Parse a lossy target format for clap.
pub fn parse_format(s: &str) -> Result<EncodeFormat, String> {
    s.parse::<EncodeFormat>().map_err(|e| e.to_string())
}

/// Parse an output mode for clap.
pub fn parse_mode(s: &str) -> Result<OutputKind, String> {
    s.parse::<OutputKind>().map_err(|e| e.to_string())
}
