//! The clipboard poll loop.
//!
//! Each tick reads the clipboard, fingerprints any image, and, when the
//! change detector accepts it, encodes it twice (lossless reference and
//! lossy target), estimates tokens for both and updates the ledger.
//!
//! All loop state lives in [`Watcher`]; [`Watcher::process`] is a function of
//! (watcher, image, time) so it can be exercised without a real clipboard.

pub mod command;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clipsaver_media::{Clipboard, Codec, EncodeFormat};
use clipsaver_token::{CostModel, SavingsReport, TokenEstimate};
use image::{DynamicImage, GenericImageView};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::detector::ChangeDetector;
use crate::error::SaverResult;
use crate::fingerprint::{Fingerprint, Fingerprinter};
use crate::ledger::{Ledger, SavingsLedger};

pub use command::{spawn_line_listener, Command};

/// Side effect performed after an image with positive savings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Only report; the clipboard is left as is.
    Report,
    /// Replace the clipboard image with the decoded optimized encoding.
    Replace,
    /// Write the optimized encoding into `folder` and copy the file path.
    Save { folder: PathBuf },
}

/// What the output side effect did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    ClipboardReplaced,
    Saved { path: PathBuf },
}

/// Result of one tick.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// The clipboard holds no image.
    Idle,
    /// An image was present but not accepted as a new event.
    Unchanged { fingerprint: Fingerprint },
    /// New image, optimized encoding is smaller; ledger updated.
    Saved {
        fingerprint: Fingerprint,
        report: SavingsReport,
        totals: SavingsLedger,
        effect: Effect,
    },
    /// New image, optimized encoding is not smaller; ledger untouched.
    NoSavings {
        fingerprint: Fingerprint,
        report: SavingsReport,
    },
}

/// Notifications delivered to the caller of [`Watcher::run`].
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Tick(TickOutcome),
    Reset(SavingsLedger),
    Error(String),
}

/// One image encoded both ways, with the token comparison.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub report: SavingsReport,
    /// The lossy target encoding, kept for the output side effect.
    pub optimized: Vec<u8>,
}

/// Encode `image` as lossless PNG and as `format` at `quality`, and estimate
/// tokens for both.
pub fn estimate<K: Codec>(
    codec: &K,
    image: &DynamicImage,
    format: EncodeFormat,
    quality: u8,
) -> SaverResult<Estimate> {
    let (width, height) = image.dimensions();

    let original = codec.encode(image, EncodeFormat::Png, 100)?;
    let optimized = codec.encode(image, format, quality)?;

    debug!(
        original_bytes = original.len(),
        optimized_bytes = optimized.len(),
        %format,
        "Encoded image"
    );

    let report = SavingsReport::new(
        width,
        height,
        TokenEstimate::of(&original),
        TokenEstimate::of(&optimized),
    );
    Ok(Estimate { report, optimized })
}

/// Poll-loop context: collaborators, detector state and the ledger.
pub struct Watcher<C, K> {
    clipboard: C,
    codec: K,
    fingerprinter: Box<dyn Fingerprinter>,
    detector: ChangeDetector,
    ledger: Ledger,
    output: OutputMode,
    target_format: EncodeFormat,
    quality: u8,
    cost: CostModel,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl<C: Clipboard, K: Codec> Watcher<C, K> {
    pub fn new(settings: &Settings, clipboard: C, codec: K, ledger: Ledger) -> Self {
        Self {
            clipboard,
            codec,
            fingerprinter: settings.fingerprint.build(),
            detector: ChangeDetector::new(settings.cooldown()),
            ledger,
            output: settings.output_mode(),
            target_format: settings.target_format,
            quality: settings.quality,
            cost: settings.cost_model(),
            poll_interval: settings.poll_interval(),
            error_backoff: settings.error_backoff(),
        }
    }

    /// Swap the fingerprinting strategy.
    pub fn with_fingerprinter(mut self, fingerprinter: Box<dyn Fingerprinter>) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    pub fn target_format(&self) -> EncodeFormat {
        self.target_format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Read the clipboard once and process whatever image it holds.
    pub fn tick(&mut self, now: Instant) -> SaverResult<TickOutcome> {
        match self.clipboard.read_image()? {
            Some(image) => self.process(&image, now),
            None => Ok(TickOutcome::Idle),
        }
    }

    /// Decide whether `image` is a new event and, if so, estimate and record it.
    ///
    /// Poll state advances for every accepted image, with or without savings,
    /// so a non-improving image is not re-evaluated on the next tick. It is
    /// committed before the ledger write so a failed write cannot lead to the
    /// same image being counted twice.
    pub fn process(&mut self, image: &DynamicImage, now: Instant) -> SaverResult<TickOutcome> {
        let fingerprint = self.fingerprinter.fingerprint(image);

        if !self.detector.is_new(&fingerprint, now) {
            return Ok(TickOutcome::Unchanged { fingerprint });
        }

        let (width, height) = image.dimensions();
        info!(width, height, fingerprint = fingerprint.short(), "New clipboard image");

        let encoded = estimate(&self.codec, image, self.target_format, self.quality)?;
        self.detector.mark(fingerprint.clone(), now);

        let report = encoded.report;
        if !report.is_improvement() {
            info!(
                original = report.original.tokens,
                optimized = report.optimized.tokens,
                format = %self.target_format,
                "No token savings from conversion"
            );
            return Ok(TickOutcome::NoSavings { fingerprint, report });
        }

        let totals = self
            .ledger
            .record(report.original.tokens, report.optimized.tokens)?;
        let effect = self.apply_output(&encoded.optimized, now)?;

        Ok(TickOutcome::Saved {
            fingerprint,
            report,
            totals,
            effect,
        })
    }

    /// Handle an out-of-band command.
    pub fn handle(&mut self, command: Command) -> SaverResult<SavingsLedger> {
        match command {
            Command::Reset => self.ledger.reset(),
        }
    }

    /// Run until `cancel` fires. Commands are drained at the top of every tick.
    ///
    /// A failed tick is reported and followed by the longer backoff sleep; it
    /// never ends the loop. Returns the final ledger totals.
    pub async fn run<F>(
        mut self,
        mut commands: UnboundedReceiver<Command>,
        cancel: CancellationToken,
        mut on_event: F,
    ) -> SavingsLedger
    where
        F: FnMut(&WatchEvent),
    {
        info!(
            format = %self.target_format,
            quality = self.quality,
            interval_ms = self.poll_interval.as_millis() as u64,
            cooldown_ms = self.detector.cooldown().as_millis() as u64,
            "Clipboard watcher started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            while let Ok(command) = commands.try_recv() {
                match self.handle(command) {
                    Ok(totals) => on_event(&WatchEvent::Reset(totals)),
                    Err(e) => {
                        error!(error = %e, ?command, "Command failed");
                        on_event(&WatchEvent::Error(e.to_string()));
                    }
                }
            }

            let delay = match self.tick(Instant::now()) {
                Ok(outcome) => {
                    on_event(&WatchEvent::Tick(outcome));
                    self.poll_interval
                }
                Err(e) => {
                    error!(error = %e, backoff_ms = self.error_backoff.as_millis() as u64, "Tick failed");
                    on_event(&WatchEvent::Error(e.to_string()));
                    self.error_backoff
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(total_saved = self.ledger.total_saved(), "Clipboard watcher stopped");
        self.ledger.totals()
    }

    fn apply_output(&mut self, optimized: &[u8], now: Instant) -> SaverResult<Effect> {
        match self.output.clone() {
            OutputMode::Report => Ok(Effect::None),
            OutputMode::Replace => {
                let decoded = self.codec.decode(optimized)?;
                let stored = self.clipboard.write_image(&decoded)?;
                // The next read returns what we just wrote; remember it in the
                // clipboard's own pixel layout so it is not a fresh copy.
                let written = self.fingerprinter.fingerprint(&stored);
                self.detector.mark(written, now);
                Ok(Effect::ClipboardReplaced)
            }
            OutputMode::Save { folder } => {
                let path = save_optimized(&folder, optimized, self.target_format)?;
                self.clipboard.write_text(&path.display().to_string())?;
                info!(path = %path.display(), "Saved optimized image");
                Ok(Effect::Saved { path })
            }
        }
    }
}

/// Write `bytes` to `folder/clip_<timestamp>.<ext>` and return the path.
fn save_optimized(folder: &Path, bytes: &[u8], format: EncodeFormat) -> SaverResult<PathBuf> {
    std::fs::create_dir_all(folder)?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    let path = folder.join(format!("clip_{}.{}", stamp, format.extension()));
    std::fs::write(&path, bytes)?;
    Ok(std::fs::canonicalize(&path).unwrap_or(path))
}
