//! Shared test utilities for the pic-stitch test suite.
//!
//! Builds in-memory pixel buffers with known contents and writes real
//! encoded files for the backend tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let red = solid(100, 50, [255, 0, 0, 255]);
//! let pattern = checkerboard(8, 6);
//! write_png(&tmp.path().join("pattern.png"), &pattern);
//! ```

use crate::imaging::PixelBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Buffers
// =========================================================================

/// A buffer filled with one colour.
pub fn solid(width: u32, height: u32, color: [u8; 4]) -> PixelBuffer {
    PixelBuffer::new(RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
}

/// A position-dependent pattern where every pixel differs from its
/// neighbours, including in alpha. Handy for catching off-by-one copies.
pub fn checkerboard(width: u32, height: u32) -> PixelBuffer {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let dark = (x + y) % 2 == 0;
        Rgba([
            (x * 37 % 256) as u8,
            (y * 59 % 256) as u8,
            if dark { 20 } else { 230 },
            255 - ((x * 3 + y * 5) % 200) as u8,
        ])
    });
    PixelBuffer::new(image).unwrap()
}

// =========================================================================
// Files
// =========================================================================

/// Write `buffer` to `path` as a lossless PNG.
pub fn write_png(path: &Path, buffer: &PixelBuffer) {
    buffer
        .as_image()
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// Write a `width`x`height` gradient JPEG to `path`.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let rgb = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    JpegEncoder::new_with_quality(file, 90)
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}
