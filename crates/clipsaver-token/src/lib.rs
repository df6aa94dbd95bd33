//! # ClipSaver Token
//!
//! Token counting and cost estimation for encoded images.
//!
//! Estimates are heuristic: an image sent to a model API travels as base64,
//! so the byte length is expanded by 4/3 and divided by ~4 characters per token.

pub mod estimator;
pub mod reporter;

pub use estimator::{CostModel, TokenEstimate, estimate_tokens, DEFAULT_COST_PER_1K};
pub use reporter::{LedgerSummary, SavingsReport};
