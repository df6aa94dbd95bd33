//! Terminal output formatting.

use clipsaver_core::watch::Effect;
use clipsaver_core::{OutputMode, SavingsLedger, Settings, TickOutcome, WatchEvent};
use clipsaver_token::reporter::group_thousands;
use clipsaver_token::{CostModel, SavingsReport};
use colored::Colorize;

/// Format a token count with thousands separators.
pub fn tokens(count: i64) -> String {
    group_thousands(count)
}

/// One-line running total: `Total saved: 1,234 tokens (~$0.0037)`.
pub fn total_line(totals: &SavingsLedger, cost: &CostModel) -> String {
    let saved = totals.total_saved();
    format!(
        "Total saved: {} tokens (~${:.4})",
        tokens(saved).green(),
        cost.dollars(saved)
    )
}

/// Print the startup banner.
pub fn print_banner(settings: &Settings, totals: &SavingsLedger) {
    println!();
    println!("  {} {}", "ClipSaver".cyan().bold(), "clipboard image optimizer".bold());
    println!();
    println!(
        "  {}     {} at quality {}",
        "Target".green(),
        settings.target_format,
        settings.quality
    );
    let mode = match settings.output_mode() {
        OutputMode::Report => "report only (clipboard untouched)".to_string(),
        OutputMode::Replace => "replace clipboard image".to_string(),
        OutputMode::Save { folder } => format!("save to {} and copy path", folder.display()),
    };
    println!("  {}       {}", "Mode".green(), mode);
    println!("  {}     {}", "Ledger".green(), settings.ledger_path.display());
    println!();
    println!("  {}", total_line(totals, &settings.cost_model()));
    println!();
    println!("  {}", "Type 'reset' (or 'r') + Enter to zero the stats".dimmed());
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();
}

/// Print the savings for one image.
pub fn print_report(report: &SavingsReport, cost: &CostModel) {
    println!(
        "  Original:  {} tokens ({} bytes)",
        tokens(report.original.tokens as i64),
        tokens(report.original.bytes as i64)
    );
    println!(
        "  Optimized: {} tokens ({} bytes)",
        tokens(report.optimized.tokens as i64),
        tokens(report.optimized.bytes as i64)
    );

    let saved = report.saved_tokens();
    let saved_str = format!("{} tokens (~${:.4})", tokens(saved), report.saved_dollars(cost));
    if report.is_improvement() {
        println!("  Saves:     {}", saved_str.green());
    } else {
        println!("  Saves:     {}", saved_str.yellow());
    }
}

/// Print accumulated totals.
pub fn print_summary(totals: &SavingsLedger, cost: &CostModel) {
    print!("{}", totals.summary().to_display_string(cost));
}

/// Print one watcher event. Idle and unchanged ticks are silent.
pub fn print_event(event: &WatchEvent, cost: &CostModel) {
    match event {
        WatchEvent::Tick(TickOutcome::Idle) | WatchEvent::Tick(TickOutcome::Unchanged { .. }) => {}
        WatchEvent::Tick(TickOutcome::Saved {
            report,
            totals,
            effect,
            ..
        }) => {
            println!();
            println!(
                "{} New image: {}x{} pixels",
                "→".cyan(),
                report.width,
                report.height
            );
            print_report(report, cost);
            match effect {
                Effect::None => {}
                Effect::ClipboardReplaced => {
                    println!("  {} Clipboard replaced with optimized image", "✓".green())
                }
                Effect::Saved { path } => {
                    println!("  {} Saved {} (path copied)", "✓".green(), path.display())
                }
            }
            println!("  {}", total_line(totals, cost));
        }
        WatchEvent::Tick(TickOutcome::NoSavings { report, .. }) => {
            println!();
            println!(
                "{} New image: {}x{} pixels",
                "→".cyan(),
                report.width,
                report.height
            );
            println!("  {}", "No token savings from conversion".yellow());
        }
        WatchEvent::Reset(totals) => {
            println!();
            println!("{} Token stats reset to zero", "✓".green());
            println!("  {}", total_line(totals, cost));
        }
        WatchEvent::Error(message) => {
            println!("{} {}", "[!] Error:".red(), message);
        }
    }
}
