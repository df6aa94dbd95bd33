//! Savings statistics command.

use anyhow::Result;
use clipsaver_core::{Ledger, Settings};
use clipsaver_store::JsonFileStore;
use colored::Colorize;
use std::sync::Arc;

use crate::output;

pub fn execute(settings: &Settings) -> Result<()> {
    let ledger = Ledger::load(Arc::new(JsonFileStore::new(&settings.ledger_path)));

    output::print_summary(&ledger.totals(), &settings.cost_model());
    println!("{}", format!("Ledger: {}", settings.ledger_path.display()).dimmed());

    Ok(())
}
