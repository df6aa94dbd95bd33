//! Reset the savings ledger.

use anyhow::{Context, Result};
use clipsaver_core::{Ledger, Settings};
use clipsaver_store::JsonFileStore;
use colored::Colorize;
use std::sync::Arc;

use crate::output;

pub fn execute(settings: &Settings) -> Result<()> {
    let mut ledger = Ledger::load(Arc::new(JsonFileStore::new(&settings.ledger_path)));
    let totals = ledger
        .reset()
        .with_context(|| format!("Failed to reset ledger at {}", settings.ledger_path.display()))?;

    println!("{} Token stats reset to zero", "✓".green());
    println!("  {}", output::total_line(&totals, &settings.cost_model()));

    Ok(())
}
