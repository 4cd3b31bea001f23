//! Strip compositor: paints decoded buffers edge to edge on one canvas.
//!
//! The canvas starts fully transparent (`[0, 0, 0, 0]`). Inputs are copied
//! in order at the offsets from [`placements`], unscaled and uncropped.
//! Inputs that are narrower (vertical) or shorter (horizontal) than the
//! canvas leave the rest of their band transparent.

use super::backend::Dimensions;
use super::buffer::{PixelBuffer, ZeroSizeError};
use super::calculations::{canvas_size, placements};
use super::params::PixelLimit;
use crate::types::Axis;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("nothing to stitch: no input images")]
    NoInputs,
    #[error("input #{index} has zero size ({width}x{height})")]
    ZeroSizeInput { index: usize, width: u32, height: u32 },
    #[error("stitched {axis} extent does not fit in 32 bits")]
    ExtentOverflow { axis: Axis },
    #[error("stitched canvas {width}x{height} exceeds the {limit} pixel limit")]
    CanvasTooLarge { width: u32, height: u32, limit: u64 },
    #[error(transparent)]
    ZeroSize(#[from] ZeroSizeError),
}

/// Concatenate `inputs` along `axis` into a single buffer.
///
/// Consumes the inputs; each one is dropped as soon as it has been painted.
pub fn compose(
    inputs: Vec<PixelBuffer>,
    axis: Axis,
    limit: PixelLimit,
) -> Result<PixelBuffer, ComposeError> {
    let dims: Vec<Dimensions> = inputs.iter().map(PixelBuffer::dimensions).collect();
    let size = canvas_size(&dims, axis)?;
    if !limit.allows(size.width, size.height) {
        return Err(ComposeError::CanvasTooLarge {
            width: size.width,
            height: size.height,
            limit: limit.value(),
        });
    }

    tracing::debug!(
        inputs = inputs.len(),
        %axis,
        width = size.width,
        height = size.height,
        "composing canvas"
    );

    let mut canvas = RgbaImage::new(size.width, size.height);
    for (input, at) in inputs.into_iter().zip(placements(&dims, axis)) {
        image::imageops::replace(
            &mut canvas,
            input.as_image(),
            i64::from(at.x),
            i64::from(at.y),
        );
    }

    Ok(PixelBuffer::new(canvas)?)
}
