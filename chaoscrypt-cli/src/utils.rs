//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chaoscrypt_core::{AlgorithmId, Image, Metrics};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Decryption context written next to every ciphertext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sidecar {
    pub algorithm: AlgorithmId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

/// Default output path next to the input.
///
/// `photo.png` becomes `photo.<tag>.png`; an existing `.enc` or `.dec` tag
/// on the stem is replaced rather than stacked.
pub fn default_output(input: &Path, tag: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let stem = stem
        .strip_suffix(".enc")
        .or_else(|| stem.strip_suffix(".dec"))
        .unwrap_or(stem);
    input.with_file_name(format!("{stem}.{tag}.png"))
}

/// Build the sidecar path from the ciphertext path.
///
/// Transforms `file.png` into `file.png.chaos.json`.
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".chaos.json");
    PathBuf::from(name)
}

/// Read and decode an image file.
pub fn read_image(path: &Path) -> Result<Image> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "Read file");

    let image = Image::decode(&bytes)
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;
    debug!(geometry = %image.geometry(), "Decoded image");
    Ok(image)
}

/// Encode as PNG and write to disk.
pub fn write_image(image: &Image, path: &Path) -> Result<()> {
    let png = image.encode_png().context("Failed to encode PNG")?;
    std::fs::write(path, &png)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    info!(path = %path.display(), bytes = png.len(), "Wrote image");
    Ok(())
}

/// Load a sidecar if one exists.
pub fn load_sidecar(path: &Path) -> Result<Option<Sidecar>> {
    if !path.exists() {
        debug!(path = %path.display(), "No sidecar");
        return Ok(None);
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let sidecar = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse sidecar: {}", path.display()))?;
    debug!(path = %path.display(), "Loaded sidecar");
    Ok(Some(sidecar))
}

pub fn save_sidecar(path: &Path, sidecar: &Sidecar) -> Result<()> {
    let json = serde_json::to_string_pretty(sidecar).context("Failed to serialize sidecar")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write sidecar: {}", path.display()))?;
    Ok(())
}
