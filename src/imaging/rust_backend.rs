//! Pure Rust image backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `ImageReader::decode` → `into_rgba8` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (adaptive filtering) |
//!
//! Formats are sniffed from file content, so a PNG saved as `.jpg` still
//! decodes. The extension list below only drives directory picking.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::buffer::PixelBuffer;
use super::params::{PixelLimit, PngCompression};
use crate::types::ImageRef;
use image::codecs::png::{FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const IMAGE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    IMAGE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [`supported_input_extensions`] (case-insensitive).
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    max_input_pixels: PixelLimit,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            max_input_pixels: PixelLimit::UNLIMITED,
        }
    }

    /// Refuse to decode inputs whose header reports more than `limit` pixels.
    pub fn with_input_limit(limit: PixelLimit) -> Self {
        Self {
            max_input_pixels: limit,
        }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    let open_err = |source| BackendError::Open {
        path: path.display().to_string(),
        source,
    };
    ImageReader::open(path)
        .map_err(open_err)?
        .with_guessed_format()
        .map_err(open_err)
}

fn decode_err(path: &Path, err: ImageError) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, source: &ImageRef) -> Result<Dimensions, BackendError> {
        let path = source.path();
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| decode_err(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, source: &ImageRef) -> Result<PixelBuffer, BackendError> {
        let path = source.path();
        let dims = self.identify(source)?;
        if !self.max_input_pixels.allows(dims.width, dims.height) {
            return Err(BackendError::TooLarge {
                path: path.display().to_string(),
                width: dims.width,
                height: dims.height,
                limit: self.max_input_pixels.value(),
            });
        }

        let image = open_reader(path)?
            .decode()
            .map_err(|e| decode_err(path, e))?;
        Ok(PixelBuffer::from_dynamic(image)?)
    }

    fn encode_png(
        &self,
        buffer: &PixelBuffer,
        compression: PngCompression,
        writer: &mut dyn Write,
    ) -> Result<(), BackendError> {
        let encoder =
            PngEncoder::new_with_quality(writer, compression.into(), FilterType::Adaptive);
        encoder
            .write_image(
                buffer.as_raw(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| match e {
                ImageError::IoError(io) => BackendError::Io(io),
                other => BackendError::Encode(other.to_string()),
            })
    }
}
