//! Token counting for encoded images.
//!
//! The estimate is a pure function of byte length: base64 expansion (4/3)
//! followed by ~4 characters per model token.

use serde::{Deserialize, Serialize};

/// Default price in dollars per 1000 input tokens.
pub const DEFAULT_COST_PER_1K: f64 = 0.003;

/// Estimate input tokens for `byte_len` bytes of encoded image data.
///
/// `floor(floor(n * 4 / 3) / 4)`, computed in integer arithmetic.
pub fn estimate_tokens(byte_len: usize) -> u64 {
    let base64_len = (byte_len as u128) * 4 / 3;
    (base64_len / 4) as u64
}

/// Token estimate for a single encoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenEstimate {
    pub bytes: usize,
    pub tokens: u64,
}

impl TokenEstimate {
    /// Estimate tokens for an encoded buffer.
    pub fn of(encoded: &[u8]) -> Self {
        Self::from_len(encoded.len())
    }

    pub fn from_len(bytes: usize) -> Self {
        Self {
            bytes,
            tokens: estimate_tokens(bytes),
        }
    }
}

/// Dollar pricing for token counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub cost_per_1k: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            cost_per_1k: DEFAULT_COST_PER_1K,
        }
    }
}

impl CostModel {
    pub fn new(cost_per_1k: f64) -> Self {
        Self { cost_per_1k }
    }

    /// Dollar cost of `tokens` input tokens. Negative counts price as a loss.
    pub fn dollars(&self, tokens: i64) -> f64 {
        tokens as f64 / 1000.0 * self.cost_per_1k
    }
}
