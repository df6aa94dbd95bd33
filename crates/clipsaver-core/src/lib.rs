//! ClipSaver Core Library
//!
//! Clipboard image de-duplication, token estimation and the savings ledger.

pub mod config;
pub mod detector;
pub mod error;
pub mod fingerprint;
pub mod ledger;
pub mod watch;

pub use config::Settings;
pub use detector::{ChangeDetector, PollState};
pub use error::{SaverError, SaverResult};
pub use fingerprint::{
    Fingerprint, FingerprintKind, Fingerprinter, FullPixelFingerprinter, SampledFingerprinter,
};
pub use ledger::{Ledger, SavingsLedger};
pub use watch::{estimate, Command, Effect, Estimate, OutputMode, TickOutcome, WatchEvent, Watcher};
