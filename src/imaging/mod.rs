//! Image processing on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Decode → RGBA8** | `ImageReader::decode` + `into_rgba8` |
//! | **Compose strip** | `image::imageops::replace` onto a transparent canvas |
//! | **Encode → PNG** | `PngEncoder` (lossless) |
//!
//! The module is split into:
//! - **Buffer**: [`PixelBuffer`], the only pixel type the pipeline passes around
//! - **Calculations**: pure functions for canvas size and placements (unit testable)
//! - **Parameters**: encoder effort and pixel limits
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Compose**: the strip compositor combining calculations + pixel copies

pub mod backend;
pub mod buffer;
pub mod calculations;
pub mod compose;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use buffer::{PixelBuffer, ZeroSizeError};
pub use calculations::{Placement, canvas_size, placements};
pub use compose::{ComposeError, compose};
pub use params::{PixelLimit, PngCompression};
pub use rust_backend::{RustBackend, has_supported_extension, supported_input_extensions};
