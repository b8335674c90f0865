//! Encrypt command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chaoscrypt_core::{AlgorithmId, EncryptRequest, Engine, EngineConfig};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::utils::{default_output, read_image, save_sidecar, sidecar_path, write_image, Sidecar};

#[derive(Args)]
pub struct EncryptArgs {
    /// Image to encrypt (PNG, JPEG, GIF or WebP)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Secret passphrase
    #[arg(short, long)]
    pub key: String,

    /// Algorithm id (see `chaoscrypt algorithms`)
    #[arg(short, long)]
    pub algorithm: String,

    /// Nonce to use instead of a generated one
    #[arg(short, long)]
    pub nonce: Option<String>,

    /// Output PNG (defaults to <INPUT stem>.enc.png)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the encrypt command.
pub fn execute(args: EncryptArgs, quiet: bool) -> Result<()> {
    let algorithm: AlgorithmId = args.algorithm.parse()?;
    let image = read_image(&args.input)?;

    let config = EngineConfig::from_env();
    debug!(config = ?config, "Engine configuration");
    let engine = Engine::new(config);

    let mut request = EncryptRequest::new(image, args.key, algorithm);
    if let Some(nonce) = args.nonce {
        request = request.with_nonce(nonce);
    }
    let response = engine.encrypt(&request).context("Encryption failed")?;

    let output = args
        .output
        .unwrap_or_else(|| default_output(&args.input, "enc"));

    // A ciphertext on disk never lacks its sidecar.
    let sidecar = Sidecar {
        algorithm,
        nonce: response.nonce.clone(),
        metrics: Some(response.metrics),
    };
    let sidecar_file = sidecar_path(&output);
    save_sidecar(&sidecar_file, &sidecar)?;
    info!(path = %sidecar_file.display(), "Sidecar saved");

    if let Err(err) = write_image(&response.encrypted_image, &output) {
        if let Err(cleanup) = std::fs::remove_file(&sidecar_file) {
            warn!(path = %sidecar_file.display(), error = %cleanup, "Failed to remove orphaned sidecar");
        }
        return Err(err);
    }

    if args.json {
        let report = json!({
            "output": output.display().to_string(),
            "sidecar": sidecar_file.display().to_string(),
            "algorithm": algorithm,
            "nonce": response.nonce,
            "metrics": response.metrics,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !quiet {
        let m = &response.metrics;
        println!();
        println!("{}", "Image encrypted!".green().bold());
        println!();
        println!("   {} {}", "Ciphertext:".dimmed(), output.display());
        println!("   {} {}", "Sidecar:".dimmed(), sidecar_file.display());
        println!("   {} {}", "Algorithm:".dimmed(), algorithm);
        if let Some(nonce) = &response.nonce {
            println!("   {} {}", "Nonce:".dimmed(), nonce.yellow());
        }
        println!(
            "   {} {:.4} -> {:.4} bits",
            "Entropy:".dimmed(),
            m.entropy_original,
            m.entropy_encrypted
        );
        println!("   {} {:.4}%", "NPCR:".dimmed(), m.npcr);
        println!("   {} {:.4}%", "UACI:".dimmed(), m.uaci);
        if algorithm.grayscale_only() {
            println!();
            println!(
                "{}",
                format!("Note: {algorithm} encrypts a grayscale projection of the input.").yellow()
            );
        }
    }

    Ok(())
}
