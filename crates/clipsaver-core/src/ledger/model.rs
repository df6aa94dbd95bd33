//! Ledger domain models.

use clipsaver_store::LedgerRecord;
use clipsaver_token::LedgerSummary;
use serde::{Deserialize, Serialize};

/// Cumulative original vs. optimized token counts.
///
/// `optimized_tokens <= original_tokens` is expected but not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsLedger {
    pub original_tokens: u64,
    pub optimized_tokens: u64,
}

impl SavingsLedger {
    pub fn new(original_tokens: u64, optimized_tokens: u64) -> Self {
        Self {
            original_tokens,
            optimized_tokens,
        }
    }

    /// Add one image's counts to the totals.
    pub fn add(&mut self, original_tokens: u64, optimized_tokens: u64) {
        self.original_tokens = self.original_tokens.saturating_add(original_tokens);
        self.optimized_tokens = self.optimized_tokens.saturating_add(optimized_tokens);
    }

    /// `original - optimized`; negative if a regression was recorded.
    pub fn total_saved(&self) -> i64 {
        self.original_tokens as i64 - self.optimized_tokens as i64
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            original_tokens: self.original_tokens,
            optimized_tokens: self.optimized_tokens,
        }
    }

    /// Create from a stored record.
    pub fn from_record(record: LedgerRecord) -> Self {
        Self::new(record.original_tokens, record.optimized_tokens)
    }

    pub fn to_record(&self) -> LedgerRecord {
        LedgerRecord::new(self.original_tokens, self.optimized_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_order_independent() {
        let mut first = SavingsLedger::default();
        first.add(100, 40);
        first.add(7, 3);

        let mut second = SavingsLedger::default();
        second.add(7, 3);
        second.add(100, 40);

        assert_eq!(first, second);
        assert_eq!(first, SavingsLedger::new(107, 43));
    }

    #[test]
    fn test_total_saved_can_be_negative() {
        assert_eq!(SavingsLedger::new(10, 25).total_saved(), -15);
        assert_eq!(SavingsLedger::new(25, 10).total_saved(), 15);
    }

    #[test]
    fn test_add_saturates() {
        let mut ledger = SavingsLedger::new(u64::MAX - 1, 0);
        ledger.add(10, 1);
        assert_eq!(ledger.original_tokens, u64::MAX);
        assert_eq!(ledger.optimized_tokens, 1);
    }
}
