//! Statistical quality metrics.
//!
//! Pure, read-only functions over pairs of images of the same geometry.
//! NPCR and UACI count samples (pixel x channel); entropy is the mean of the
//! per-channel Shannon entropies.

use serde::{Deserialize, Serialize};

use crate::error::{CipherError, Result};
use crate::raster::Image;

/// Quality figures reported with every encryption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Bits per sample, 0..=8
    pub entropy_original: f64,
    pub entropy_encrypted: f64,
    /// Percent of differing samples
    pub npcr: f64,
    /// Mean absolute difference as a percent of 255
    pub uaci: f64,
}

impl Metrics {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CipherError::Serialization(e.to_string()))
    }
}

fn same_geometry(a: &Image, b: &Image) -> Result<()> {
    if a.geometry() != b.geometry() {
        return Err(CipherError::dimension_mismatch(a.geometry(), b.geometry()));
    }
    Ok(())
}

/// One 256-bin histogram per channel.
pub fn histogram(image: &Image) -> Vec<[u64; 256]> {
    let c = image.channels() as usize;
    let mut bins = vec![[0u64; 256]; c];
    for px in image.data().chunks_exact(c) {
        for (hist, &v) in bins.iter_mut().zip(px) {
            hist[v as usize] += 1;
        }
    }
    bins
}

fn shannon(hist: &[u64; 256]) -> f64 {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    hist.iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Mean per-channel Shannon entropy in bits.
pub fn entropy(image: &Image) -> f64 {
    let hists = histogram(image);
    hists.iter().map(shannon).sum::<f64>() / hists.len() as f64
}

/// Number of pixel change rate, in percent.
pub fn npcr(a: &Image, b: &Image) -> Result<f64> {
    same_geometry(a, b)?;
    let changed = a.data().iter().zip(b.data()).filter(|(x, y)| x != y).count();
    Ok(100.0 * changed as f64 / a.data().len() as f64)
}

/// Unified average changing intensity, in percent.
pub fn uaci(a: &Image, b: &Image) -> Result<f64> {
    same_geometry(a, b)?;
    let sum: u64 = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum();
    Ok(100.0 * sum as f64 / (a.data().len() as f64 * 255.0))
}

pub fn evaluate(original: &Image, encrypted: &Image) -> Result<Metrics> {
    Ok(Metrics {
        entropy_original: entropy(original),
        entropy_encrypted: entropy(encrypted),
        npcr: npcr(original, encrypted)?,
        uaci: uaci(original, encrypted)?,
    })
}

/// Peak signal-to-noise ratio in dB; infinite for identical images.
pub fn psnr(a: &Image, b: &Image) -> Result<f64> {
    same_geometry(a, b)?;
    let sq: u64 = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| {
            let d = x.abs_diff(y) as u64;
            d * d
        })
        .sum();
    if sq == 0 {
        return Ok(f64::INFINITY);
    }
    let mse = sq as f64 / a.data().len() as f64;
    Ok(20.0 * (255.0 / mse.sqrt()).log10())
}

/// Pearson correlation of the normalised histograms of two images.
///
/// Returns 0 when either histogram is flat.
pub fn histogram_correlation(a: &Image, b: &Image) -> Result<f64> {
    same_geometry(a, b)?;
    let flatten = |img: &Image| -> Vec<f64> {
        let total = img.data().len() as f64;
        histogram(img)
            .iter()
            .flat_map(|h| h.iter().map(move |&n| n as f64 / total))
            .collect()
    };
    let (x, y) = (flatten(a), flatten(b));
    let n = x.len() as f64;
    let (mx, my) = (x.iter().sum::<f64>() / n, y.iter().sum::<f64>() / n);
    let (mut cov, mut vx, mut vy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(&y) {
        cov += (xi - mx) * (yi - my);
        vx += (xi - mx) * (xi - mx);
        vy += (yi - my) * (yi - my);
    }
    if vx == 0.0 || vy == 0.0 {
        return Ok(0.0);
    }
    Ok(cov / (vx.sqrt() * vy.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(data: Vec<u8>) -> Image {
        let n = data.len() as u32;
        Image::new(n, 1, 1, data).unwrap()
    }

    #[test]
    fn test_entropy_bounds() {
        assert_eq!(entropy(&Image::filled(8, 8, 1, 7).unwrap()), 0.0);
        let uniform = gray((0..=255).collect());
        assert!((entropy(&uniform) - 8.0).abs() < 1e-12);
        let halves = gray(vec![0, 0, 255, 255]);
        assert!((entropy(&halves) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_averages_channels() {
        // channel 0 constant, channel 1 two values, channel 2 four values
        let data = vec![0, 0, 0, 0, 0, 1, 0, 1, 2, 0, 1, 3];
        let img = Image::new(4, 1, 3, data).unwrap();
        assert!((entropy(&img) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_npcr_and_uaci() {
        let a = gray(vec![0, 0, 0, 0]);
        let b = gray(vec![255, 0, 255, 0]);
        assert_eq!(npcr(&a, &b).unwrap(), 50.0);
        assert_eq!(uaci(&a, &b).unwrap(), 50.0);
        assert_eq!(npcr(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_psnr() {
        let a = gray(vec![10, 20, 30, 40]);
        assert_eq!(psnr(&a, &a).unwrap(), f64::INFINITY);
        let b = gray(vec![11, 21, 31, 41]);
        // mse = 1
        assert!((psnr(&a, &b).unwrap() - 20.0 * 255f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_correlation() {
        let a = gray((0..64).map(|i| (i % 4) as u8).collect());
        assert!((histogram_correlation(&a, &a).unwrap() - 1.0).abs() < 1e-12);
        let b = Image::filled(64, 1, 1, 9).unwrap();
        assert!(histogram_correlation(&a, &b).unwrap() < 0.5);
    }

    #[test]
    fn test_mismatched_shapes() {
        let a = Image::filled(4, 4, 1, 0).unwrap();
        let b = Image::filled(4, 4, 3, 0).unwrap();
        assert!(matches!(evaluate(&a, &b), Err(CipherError::DimensionMismatch { .. })));
        assert!(matches!(psnr(&a, &b), Err(CipherError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_metrics_json_field_names() {
        let m = evaluate(&gray(vec![0, 1]), &gray(vec![1, 0])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&m.to_json().unwrap()).unwrap();
        for field in ["entropy_original", "entropy_encrypted", "npcr", "uaci"] {
            assert!(json.get(field).is_some(), "{field}");
        }
    }
}
