//! Parameter types for image operations.
//!
//! - [`PngCompression`]: effort level for the lossless PNG encoder. Every
//!   level decodes to identical pixels; only size and encode time differ.
//! - [`PixelLimit`]: upper bound on the pixel count of a decoded input or a
//!   composed canvas.

use image::codecs::png::CompressionType;
use serde::{Deserialize, Serialize};

/// PNG encoder effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

impl From<PngCompression> for CompressionType {
    fn from(value: PngCompression) -> Self {
        match value {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

/// Maximum number of pixels (width × height).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLimit(pub u64);

impl PixelLimit {
    pub const UNLIMITED: PixelLimit = PixelLimit(u64::MAX);

    pub fn allows(self, width: u32, height: u32) -> bool {
        u64::from(width) * u64::from(height) <= self.0
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl Default for PixelLimit {
    fn default() -> Self {
        Self::UNLIMITED
    }
}
