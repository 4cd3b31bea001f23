//! Image loader: picked handles in, decoded RGBA8 buffers out.
//!
//! Decoding fans out over the rayon pool, but the result keeps the picked
//! order. One undecodable image fails the whole batch; nothing is skipped
//! or substituted, and no buffers are returned alongside an error.

use crate::imaging::{BackendError, ImageBackend, PixelBuffer};
use crate::types::ImageRef;
use rayon::prelude::*;

/// Decode every reference, preserving order.
pub fn load_all(
    backend: &impl ImageBackend,
    sources: &[ImageRef],
) -> Result<Vec<PixelBuffer>, BackendError> {
    tracing::debug!(count = sources.len(), "decoding selection");
    let buffers = sources
        .par_iter()
        .map(|source| {
            backend.decode(source).inspect_err(|e| {
                tracing::warn!(%source, error = %e, "decode failed");
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(buffers)
}
