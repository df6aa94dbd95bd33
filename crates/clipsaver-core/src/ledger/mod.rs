//! Savings ledger.
//!
//! Running token totals backed by a [`LedgerStore`]. Every mutation is
//! persisted immediately. Single writer only.

pub mod model;

use std::sync::Arc;

use clipsaver_store::LedgerStore;
use tracing::{debug, info, warn};

use crate::error::SaverResult;
pub use model::SavingsLedger;

/// The ledger bound to its store.
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    totals: SavingsLedger,
}

impl Ledger {
    /// Load persisted totals.
    ///
    /// Never fails. A missing record starts at zero. An unreadable or
    /// corrupt record also starts at zero, with a warning naming the cause;
    /// the bad document is left in place until the next write replaces it.
    pub fn load(store: Arc<dyn LedgerStore>) -> Self {
        let totals = match store.load() {
            Ok(Some(record)) => {
                debug!(location = %store.location(), ?record, "Ledger loaded");
                SavingsLedger::from_record(record)
            }
            Ok(None) => SavingsLedger::default(),
            Err(e) => {
                warn!(
                    location = %store.location(),
                    error = %e,
                    "Could not read savings ledger, starting from zero"
                );
                SavingsLedger::default()
            }
        };

        Self { store, totals }
    }

    /// Add one image's counts and persist the new totals.
    pub fn record(&mut self, original_tokens: u64, optimized_tokens: u64) -> SaverResult<SavingsLedger> {
        self.totals.add(original_tokens, optimized_tokens);
        self.store.save(&self.totals.to_record())?;

        info!(
            original = original_tokens,
            optimized = optimized_tokens,
            total_saved = self.totals.total_saved(),
            "Savings recorded"
        );
        Ok(self.totals)
    }

    /// Zero the totals and persist.
    pub fn reset(&mut self) -> SaverResult<SavingsLedger> {
        self.totals = SavingsLedger::default();
        self.store.save(&self.totals.to_record())?;
        info!(location = %self.store.location(), "Savings ledger reset");
        Ok(self.totals)
    }

    pub fn totals(&self) -> SavingsLedger {
        self.totals
    }

    pub fn total_saved(&self) -> i64 {
        self.totals.total_saved()
    }
}
