//! Decoded RGBA8 pixel storage.

use image::{DynamicImage, RgbaImage};
use thiserror::Error;

/// An image with no pixels on one of its axes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("image has zero size ({width}x{height})")]
pub struct ZeroSizeError {
    pub width: u32,
    pub height: u32,
}

/// A rectangular grid of RGBA8 pixels with both dimensions non-zero.
///
/// Buffers are moved between pipeline steps rather than shared; nothing
/// mutates one after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    pub fn new(image: RgbaImage) -> Result<Self, ZeroSizeError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ZeroSizeError { width, height });
        }
        Ok(Self { image })
    }

    /// Convert any decoded image into the fixed RGBA8 layout.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, ZeroSizeError> {
        Self::new(image.into_rgba8())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> super::Dimensions {
        super::Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    /// RGBA channels of one pixel. Panics when out of bounds, like indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
