//! Analyze command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chaoscrypt_core::metrics;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use tracing::debug;

use crate::utils::read_image;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Original image
    #[arg(value_name = "ORIGINAL")]
    pub original: PathBuf,

    /// Encrypted (or decrypted) image to compare against
    #[arg(value_name = "ENCRYPTED")]
    pub encrypted: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the analyze command.
pub fn execute(args: AnalyzeArgs, quiet: bool) -> Result<()> {
    let mut original = read_image(&args.original)?;
    let encrypted = read_image(&args.encrypted)?;

    // Grayscale ciphertext of a colour image (bulban)
    if encrypted.is_grayscale() && !original.is_grayscale() {
        debug!("Comparing against the grayscale projection of the original");
        original = original.to_grayscale();
    }

    let m = metrics::evaluate(&original, &encrypted).context("Cannot compare images")?;
    let psnr = metrics::psnr(&original, &encrypted)?;
    let correlation = metrics::histogram_correlation(&original, &encrypted)?;

    if args.json {
        // JSON has no infinity
        let psnr = if psnr.is_finite() { json!(psnr) } else { json!(null) };
        let report = json!({
            "geometry": encrypted.geometry(),
            "metrics": m,
            "psnr": psnr,
            "histogram_correlation": correlation,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !quiet {
        println!();
        println!("{}", "Cipher quality".bold());
        println!();
        println!("   {} {}", "Geometry:".dimmed(), encrypted.geometry());
        println!(
            "   {} {:.4} -> {:.4} bits",
            "Entropy:".dimmed(),
            m.entropy_original,
            m.entropy_encrypted
        );
        println!("   {} {:.4}%", "NPCR:".dimmed(), m.npcr);
        println!("   {} {:.4}%", "UACI:".dimmed(), m.uaci);
        if psnr.is_finite() {
            println!("   {} {:.2} dB", "PSNR:".dimmed(), psnr);
        } else {
            println!("   {} {}", "PSNR:".dimmed(), "identical".green());
        }
        println!("   {} {:.4}", "Histogram correlation:".dimmed(), correlation);
    }

    Ok(())
}
