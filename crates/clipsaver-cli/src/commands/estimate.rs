//! One-shot estimate for an image file.

use anyhow::{Context, Result};
use clap::Args;
use clipsaver_core::{Fingerprinter, SampledFingerprinter, Settings};
use clipsaver_media::{EncodeFormat, ImageCodec};
use colored::Colorize;
use std::path::PathBuf;

use crate::output;

#[derive(Args)]
pub struct EstimateArgs {
    /// Image file to estimate
    pub path: PathBuf,

    /// Lossy quality (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Lossy target format: webp or jpeg
    #[arg(long, value_parser = super::parse_format)]
    pub format: Option<EncodeFormat>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: EstimateArgs, mut settings: Settings) -> Result<()> {
    if let Some(quality) = args.quality {
        settings.quality = quality;
    }
    if let Some(format) = args.format {
        settings.target_format = format;
    }
    let settings = settings.validate()?;

    let image = ImageCodec::open(&args.path)
        .with_context(|| format!("Failed to read image: {}", args.path.display()))?;
    let estimate = clipsaver_core::estimate(&ImageCodec::new(), &image, settings.target_format, settings.quality)?;
    let report = estimate.report;
    let fingerprint = SampledFingerprinter.fingerprint(&image);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Token Estimate".bold());
    println!("{}", "─".repeat(40));
    println!("  File:    {}", args.path.display());
    println!("  Target:  {} {}%", settings.target_format, settings.quality);
    println!("  Hash:    {}", fingerprint.short().dimmed());
    output::print_report(&report, &settings.cost_model());

    Ok(())
}

