//! Input bitmap and exact-equality color.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::TraceError;

/// A 24-bit color compared by exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Gray value from a single-plane bitmap.
    pub const fn gray(v: u8) -> Self {
        Color { r: v, g: v, b: v }
    }

    /// Luminance as `0.30 R + 0.59 G + 0.11 B + 0.5`, truncated.
    pub fn luminance(self) -> u8 {
        (0.30 * self.r as f64 + 0.59 * self.g as f64 + 0.11 * self.b as f64 + 0.5) as u8
    }

    /// Parse `"rrggbb"` hex (with or without a leading `#`).
    pub fn from_hex(s: &str) -> Option<Color> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 {
            return None;
        }
        let v = u32::from_str_radix(s, 16).ok()?;
        Some(Color::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
    }
}

/// A row-major raster with 1 (grayscale) or 3 (RGB) byte planes.
///
/// Row 0 is the top of the image; [`Bitmap::get_color`] addresses pixels as
/// `(row, col)`.
#[derive(Debug, Clone)]
pub struct Bitmap {
    width: u32,
    height: u32,
    planes: u8,
    data: Vec<u8>,
}

impl Bitmap {
    /// Build from raw plane-interleaved bytes.
    pub fn new(width: u32, height: u32, planes: u8, data: Vec<u8>) -> Result<Bitmap, TraceError> {
        if planes != 1 && planes != 3 {
            return Err(TraceError::UnsupportedPlanes(planes));
        }
        for dim in [width, height] {
            if dim > u16::MAX as u32 {
                return Err(TraceError::DimensionTooLarge(dim));
            }
        }
        let expected = width as u64 * height as u64 * planes as u64;
        if data.len() as u64 != expected {
            return Err(TraceError::DataLength { expected, actual: data.len() });
        }
        Ok(Bitmap { width, height, planes, data })
    }

    /// Load from an image file, keeping grayscale images single-plane.
    pub fn load(path: &Path) -> Result<Bitmap, TraceError> {
        let img = image::open(path).map_err(|e| TraceError::ImageLoad(e.to_string()))?;
        match img {
            DynamicImage::ImageLuma8(gray) => Bitmap::from_gray(&gray),
            other => Bitmap::from_rgb(&other.to_rgb8()),
        }
    }

    pub fn from_gray(img: &GrayImage) -> Result<Bitmap, TraceError> {
        let (w, h) = img.dimensions();
        Bitmap::new(w, h, 1, img.as_raw().clone())
    }

    pub fn from_rgb(img: &RgbImage) -> Result<Bitmap, TraceError> {
        let (w, h) = img.dimensions();
        Bitmap::new(w, h, 3, img.as_raw().clone())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn planes(&self) -> u8 {
        self.planes
    }

    pub fn get_color(&self, row: u32, col: u32) -> Color {
        debug_assert!(row < self.height && col < self.width);
        let idx = ((row * self.width + col) * self.planes as u32) as usize;
        match self.planes {
            1 => Color::gray(self.data[idx]),
            _ => Color::new(self.data[idx], self.data[idx + 1], self.data[idx + 2]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_matches_weights() {
        assert_eq!(Color::WHITE.luminance(), 255);
        assert_eq!(Color::BLACK.luminance(), 0);
        // 0.30*255 + 0.5 = 77.0, truncated.
        assert_eq!(Color::new(255, 0, 0).luminance(), 77);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#ff0080"), Some(Color::new(255, 0, 128)));
        assert_eq!(Color::from_hex("ffffff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("xyz"), None);
    }

    #[test]
    fn plane_count_is_validated() {
        assert!(matches!(
            Bitmap::new(1, 1, 2, vec![0, 0]),
            Err(TraceError::UnsupportedPlanes(2))
        ));
    }

    #[test]
    fn data_length_is_validated() {
        // Short buffers are rejected up front, not on first pixel access.
        assert!(matches!(
            Bitmap::new(4, 4, 3, vec![0; 10]),
            Err(TraceError::DataLength { expected: 48, actual: 10 })
        ));
        // The expected size is computed in u64, so maximal dimensions
        // cannot wrap into a small value that a short buffer would match.
        assert!(matches!(
            Bitmap::new(65535, 65535, 3, Vec::new()),
            Err(TraceError::DataLength { expected: 12_884_508_675, actual: 0 })
        ));
    }
}
