//! Algorithms command implementation.

use anyhow::Result;
use chaoscrypt_core::AlgorithmId;
use colored::Colorize;

/// Execute the algorithms command.
pub fn execute(quiet: bool) -> Result<()> {
    if quiet {
        for id in AlgorithmId::ALL {
            println!("{id}");
        }
        return Ok(());
    }

    println!();
    let header = format!("{:<10} {:<9} {:<9} {}", "ID", "NONCE", "CHANNELS", "DESCRIPTION");
    println!("   {}", header.bold());
    for id in AlgorithmId::ALL {
        let channels = if id.grayscale_only() { "gray" } else { "gray/rgb" };
        println!(
            "   {} {:<9} {:<9} {}",
            format!("{:<10}", id.as_str()).cyan(),
            id.nonce_requirement().to_string(),
            channels,
            id.description().dimmed()
        );
    }
    Ok(())
}
