//! The persisted ledger document.

use serde::{Deserialize, Serialize};

/// Cumulative token counters as stored on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(default)]
    pub original_tokens: u64,
    #[serde(default)]
    pub optimized_tokens: u64,
}

impl LedgerRecord {
    pub fn new(original_tokens: u64, optimized_tokens: u64) -> Self {
        Self {
            original_tokens,
            optimized_tokens,
        }
    }
}
