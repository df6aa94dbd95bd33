//! Clipboard watch command.

use anyhow::{Context, Result};
use clap::Args;
use clipsaver_core::config::OutputKind;
use clipsaver_core::watch::spawn_line_listener;
use clipsaver_core::{FingerprintKind, Ledger, Settings, Watcher};
use clipsaver_media::{ArboardClipboard, EncodeFormat, ImageCodec};
use clipsaver_store::JsonFileStore;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::output;

#[derive(Args)]
pub struct WatchArgs {
    /// What to do with an optimized image: report, replace, or save
    #[arg(long, value_parser = super::parse_mode)]
    pub mode: Option<OutputKind>,

    /// Folder for optimized files in save mode
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// Lossy quality (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Lossy target format: webp or jpeg
    #[arg(long, value_parser = super::parse_format)]
    pub format: Option<EncodeFormat>,

    /// Clipboard poll interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Minimum milliseconds between accepted images
    #[arg(long)]
    pub cooldown_ms: Option<u64>,

    /// Hash every pixel instead of sampling five points
    #[arg(long)]
    pub full_hash: bool,
}

impl WatchArgs {
    /// Layer the flags over the loaded settings.
    fn apply(self, settings: &mut Settings) {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(folder) = self.folder {
            settings.folder = Some(folder);
            // A folder only makes sense for save mode
            if self.mode.is_none() {
                settings.mode = OutputKind::Save;
            }
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(format) = self.format {
            settings.target_format = format;
        }
        if let Some(interval) = self.interval_ms {
            settings.poll_interval_ms = interval;
        }
        if let Some(cooldown) = self.cooldown_ms {
            settings.cooldown_ms = cooldown;
        }
        if self.full_hash {
            settings.fingerprint = FingerprintKind::Full;
        }
    }
}

pub async fn execute(args: WatchArgs, mut settings: Settings) -> Result<()> {
    args.apply(&mut settings);
    let settings = settings.validate()?;

    let store = Arc::new(JsonFileStore::new(&settings.ledger_path));
    let ledger = Ledger::load(store);
    let clipboard = ArboardClipboard::new().context("Failed to open the system clipboard")?;
    let watcher = Watcher::new(&settings, clipboard, ImageCodec::new(), ledger);

    output::print_banner(&settings, &watcher.ledger().totals());

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    spawn_line_listener(std::io::BufReader::new(std::io::stdin()), tx)
        .context("Failed to start the command listener")?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let cost = settings.cost_model();
    let totals = watcher
        .run(rx, cancel, |event| output::print_event(event, &cost))
        .await;

    println!();
    println!(
        "{} Total saved: {} tokens",
        "Exiting.".dimmed(),
        output::tokens(totals.total_saved()).green()
    );

    Ok(())
}
