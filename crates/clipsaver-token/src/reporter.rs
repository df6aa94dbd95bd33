//! Savings reports.
//!
//! Plain-text renderings of a single image's savings and of the running
//! ledger totals. Colouring is left to the CLI.

use serde::Serialize;

use crate::estimator::{CostModel, TokenEstimate};

/// Savings for one image encoded two ways.
#[derive(Debug, Clone, Serialize)]
pub struct SavingsReport {
    pub width: u32,
    pub height: u32,
    pub original: TokenEstimate,
    pub optimized: TokenEstimate,
}

impl SavingsReport {
    pub fn new(width: u32, height: u32, original: TokenEstimate, optimized: TokenEstimate) -> Self {
        Self {
            width,
            height,
            original,
            optimized,
        }
    }

    /// Tokens saved by sending the optimized encoding. Negative when it is larger.
    pub fn saved_tokens(&self) -> i64 {
        self.original.tokens as i64 - self.optimized.tokens as i64
    }

    pub fn saved_dollars(&self, cost: &CostModel) -> f64 {
        cost.dollars(self.saved_tokens())
    }

    /// True when the optimized encoding is cheaper than the original.
    pub fn is_improvement(&self) -> bool {
        self.saved_tokens() > 0
    }

    /// Format the report as a human-readable string.
    pub fn to_display_string(&self, cost: &CostModel) -> String {
        let mut output = String::new();

        output.push_str(&format!("Image:     {}x{} pixels\n", self.width, self.height));
        output.push_str(&format!(
            "Original:  {:>10} bytes  {:>10} tokens\n",
            group_thousands(self.original.bytes as i64),
            group_thousands(self.original.tokens as i64)
        ));
        output.push_str(&format!(
            "Optimized: {:>10} bytes  {:>10} tokens\n",
            group_thousands(self.optimized.bytes as i64),
            group_thousands(self.optimized.tokens as i64)
        ));
        output.push_str(&format!(
            "Saved:     {} tokens (~${:.4})\n",
            group_thousands(self.saved_tokens()),
            self.saved_dollars(cost)
        ));

        output
    }
}

/// Running totals across the ledger's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub original_tokens: u64,
    pub optimized_tokens: u64,
}

impl LedgerSummary {
    pub fn saved_tokens(&self) -> i64 {
        self.original_tokens as i64 - self.optimized_tokens as i64
    }

    pub fn saved_dollars(&self, cost: &CostModel) -> f64 {
        cost.dollars(self.saved_tokens())
    }

    /// Percentage of original tokens saved, 0 when nothing has been recorded.
    pub fn saved_percent(&self) -> f64 {
        if self.original_tokens == 0 {
            0.0
        } else {
            self.saved_tokens() as f64 / self.original_tokens as f64 * 100.0
        }
    }

    /// Format the totals as a human-readable string.
    pub fn to_display_string(&self, cost: &CostModel) -> String {
        let mut output = String::new();

        output.push_str("Token Savings\n");
        output.push_str(&format!("{}\n", "─".repeat(40)));
        output.push_str(&format!("Original tokens:  {:>12}\n", group_thousands(self.original_tokens as i64)));
        output.push_str(&format!("Optimized tokens: {:>12}\n", group_thousands(self.optimized_tokens as i64)));
        output.push_str(&format!("{}\n", "─".repeat(40)));
        output.push_str(&format!(
            "Total saved: {} tokens (~${:.4}, {:.0}%)\n",
            group_thousands(self.saved_tokens()),
            self.saved_dollars(cost),
            self.saved_percent()
        ));

        output
    }
}

/// Render an integer with comma thousands separators.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
