//! Decoded raster images.
//!
//! The engine works on 8-bit images with one (grayscale) or three (RGB)
//! interleaved channels. Encoded formats are handled at the edges by the
//! optional `codec` feature; everything else sees only [`Image`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CipherError, Result};

/// Width, height and channel count of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl Geometry {
    /// Number of pixel positions (`width * height`).
    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of 8-bit samples (`pixels * channels`).
    pub fn samples(&self) -> usize {
        self.pixels() * self.channels as usize
    }

    /// True when the image is square (needed by the Arnold cat map).
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// An 8-bit raster with 1 or 3 interleaved channels in row-major order.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    geometry: Geometry,
    data: Vec<u8>,
}

impl Image {
    /// Create an image from raw interleaved samples.
    ///
    /// Fails with [`CipherError::InvalidImage`] when a dimension is zero, the
    /// channel count is not 1 or 3, or the buffer length does not match.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CipherError::InvalidImage(format!(
                "image is empty ({width}x{height})"
            )));
        }
        if channels != 1 && channels != 3 {
            return Err(CipherError::InvalidImage(format!(
                "unsupported channel count {channels} (expected 1 or 3)"
            )));
        }
        let geometry = Geometry {
            width,
            height,
            channels,
        };
        if data.len() != geometry.samples() {
            return Err(CipherError::InvalidImage(format!(
                "buffer holds {} samples, {geometry} needs {}",
                data.len(),
                geometry.samples()
            )));
        }
        Ok(Self { geometry, data })
    }

    /// Create an image with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Result<Self> {
        let len = width as usize * height as usize * channels as usize;
        Self::new(width, height, channels, vec![value; len])
    }

    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    pub fn channels(&self) -> u8 {
        self.geometry.channels
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn is_grayscale(&self) -> bool {
        self.geometry.channels == 1
    }

    /// Replace the samples, keeping the geometry.
    pub(crate) fn with_data(&self, data: Vec<u8>) -> Result<Self> {
        Self::new(self.width(), self.height(), self.channels(), data)
    }

    /// Project onto a single luma channel (ITU-R BT.601 weights).
    ///
    /// The projection is lossy: an RGB image cannot be recovered from its
    /// grayscale form. Grayscale input is returned unchanged.
    pub fn to_grayscale(&self) -> Image {
        if self.is_grayscale() {
            return self.clone();
        }
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let luma = 299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32;
                ((luma + 500) / 1000) as u8
            })
            .collect();
        Image {
            geometry: Geometry {
                channels: 1,
                ..self.geometry
            },
            data,
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("geometry", &self.geometry)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(feature = "codec")]
mod codec {
    use std::io::Cursor;
    use std::path::Path;

    use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
    use tracing::debug;

    use super::Image;
    use crate::error::{CipherError, Result};

    impl Image {
        /// Convert a decoded image. Color images become RGB (alpha dropped),
        /// luma images stay single-channel.
        pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
            if img.color().has_color() {
                let rgb = img.to_rgb8();
                let (w, h) = rgb.dimensions();
                Image::new(w, h, 3, rgb.into_raw())
            } else {
                let gray = img.to_luma8();
                let (w, h) = gray.dimensions();
                Image::new(w, h, 1, gray.into_raw())
            }
        }

        pub fn to_dynamic(&self) -> Result<DynamicImage> {
            let (w, h) = (self.width(), self.height());
            let raw = self.data().to_vec();
            let dynamic = if self.is_grayscale() {
                GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8)
            } else {
                RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8)
            };
            dynamic.ok_or_else(|| {
                CipherError::InvalidImage(format!("buffer does not fit {}", self.geometry()))
            })
        }

        /// Decode any supported format (PNG, JPEG, GIF, WebP) from memory.
        pub fn decode(bytes: &[u8]) -> Result<Self> {
            let img = image::load_from_memory(bytes)?;
            debug!(color = ?img.color(), "Decoded image");
            Self::from_dynamic(&img)
        }

        /// Decode an image file from disk.
        pub fn open(path: &Path) -> Result<Self> {
            let img = image::open(path)?;
            Self::from_dynamic(&img)
        }

        /// Encode losslessly as PNG.
        pub fn encode_png(&self) -> Result<Vec<u8>> {
            let mut buf = Cursor::new(Vec::new());
            self.to_dynamic()?.write_to(&mut buf, ImageFormat::Png)?;
            Ok(buf.into_inner())
        }

        pub fn save_png(&self, path: &Path) -> Result<()> {
            self.to_dynamic()?.save_with_format(path, ImageFormat::Png)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_shapes() {
        assert!(matches!(
            Image::new(0, 4, 1, vec![]),
            Err(CipherError::InvalidImage(_))
        ));
        assert!(matches!(
            Image::new(2, 2, 4, vec![0; 16]),
            Err(CipherError::InvalidImage(_))
        ));
        assert!(matches!(
            Image::new(2, 2, 3, vec![0; 11]),
            Err(CipherError::InvalidImage(_))
        ));
        assert!(Image::new(2, 2, 3, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_geometry_counts() {
        let img = Image::filled(5, 3, 3, 7).unwrap();
        let g = img.geometry();
        assert_eq!(g.pixels(), 15);
        assert_eq!(g.samples(), 45);
        assert!(!g.is_square());
        assert_eq!(g.to_string(), "5x3x3");
    }

    #[test]
    fn test_grayscale_projection_uses_bt601() {
        let img = Image::new(3, 1, 3, vec![255, 0, 0, 0, 255, 0, 10, 20, 30]).unwrap();
        let gray = img.to_grayscale();
        assert_eq!(gray.channels(), 1);
        // 0.299*255 = 76.2, 0.587*255 = 149.7, 0.299*10+0.587*20+0.114*30 = 18.15
        assert_eq!(gray.data(), &[76, 150, 18]);
    }

    #[test]
    fn test_grayscale_of_gray_is_identity() {
        let img = Image::new(2, 1, 1, vec![3, 200]).unwrap();
        assert_eq!(img.to_grayscale(), img);
    }

    #[cfg(feature = "codec")]
    #[test]
    fn test_png_encode_decode_preserves_pixels() {
        let data: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 7) as u8).collect();
        let img = Image::new(4, 3, 3, data).unwrap();
        let png = img.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let back = Image::decode(&png).unwrap();
        assert_eq!(back, img, "PNG must be lossless");
    }
}
