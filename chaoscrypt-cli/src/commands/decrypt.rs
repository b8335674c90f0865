//! Decrypt command implementation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chaoscrypt_core::{AlgorithmId, DecryptRequest, Engine, EngineConfig};
use clap::Args;
use colored::Colorize;
use tracing::{debug, info};

use crate::utils::{default_output, load_sidecar, read_image, sidecar_path, write_image};

#[derive(Args)]
pub struct DecryptArgs {
    /// Ciphertext PNG
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Secret passphrase
    #[arg(short, long)]
    pub key: String,

    /// Algorithm id (read from the sidecar when omitted)
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Nonce (read from the sidecar when omitted)
    #[arg(short, long)]
    pub nonce: Option<String>,

    /// Output PNG (defaults to <INPUT stem>.dec.png)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute the decrypt command.
pub fn execute(args: DecryptArgs, quiet: bool) -> Result<()> {
    let sidecar_file = sidecar_path(&args.input);
    let sidecar = load_sidecar(&sidecar_file)?;

    let algorithm: AlgorithmId = match (&args.algorithm, &sidecar) {
        (Some(id), _) => id.parse()?,
        (None, Some(sidecar)) => {
            debug!(algorithm = %sidecar.algorithm, "Algorithm from sidecar");
            sidecar.algorithm
        }
        (None, None) => bail!(
            "No algorithm given and no sidecar found at {} (use --algorithm)",
            sidecar_file.display()
        ),
    };
    let nonce = args
        .nonce
        .or_else(|| sidecar.and_then(|s| s.nonce));

    let image = read_image(&args.input)?;
    let engine = Engine::new(EngineConfig::from_env());

    let mut request = DecryptRequest::new(image, args.key, algorithm);
    if let Some(nonce) = nonce {
        request = request.with_nonce(nonce);
    }
    let response = engine.decrypt(&request).context("Decryption failed")?;

    let output = args
        .output
        .unwrap_or_else(|| default_output(&args.input, "dec"));
    write_image(&response.decrypted_image, &output)?;
    info!(path = %output.display(), "Plaintext saved");

    if !quiet {
        println!();
        println!("{}", "Image decrypted!".green().bold());
        println!();
        println!("   {} {}", "Output:".dimmed(), output.display());
        println!("   {} {}", "Algorithm:".dimmed(), algorithm);
        println!("   {} {}", "Geometry:".dimmed(), response.decrypted_image.geometry());
    }

    Ok(())
}
