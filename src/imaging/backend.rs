//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the pipeline needs
//! from a codec: identify, decode to RGBA8, and encode to PNG.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust codecs. Tests use the recording mock in [`tests`].

use super::buffer::{PixelBuffer, ZeroSizeError};
use super::params::PngCompression;
use crate::types::ImageRef;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("{path} is {width}x{height}, above the {limit} pixel limit")]
    TooLarge {
        path: String,
        width: u32,
        height: u32,
        limit: u64,
    },
    #[error(transparent)]
    ZeroSize(#[from] ZeroSizeError),
    #[error("PNG encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image codec backends.
///
/// `Sync` so the loader can fan decodes out over rayon.
pub trait ImageBackend: Sync {
    /// Read dimensions from the image header without a full decode.
    fn identify(&self, source: &ImageRef) -> Result<Dimensions, BackendError>;

    /// Fully decode an image into RGBA8.
    fn decode(&self, source: &ImageRef) -> Result<PixelBuffer, BackendError>;

    /// Stream a buffer into `writer` as PNG.
    fn encode_png(
        &self,
        buffer: &PixelBuffer,
        compression: PngCompression,
        writer: &mut dyn Write,
    ) -> Result<(), BackendError>;
}
