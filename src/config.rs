//! Stitch configuration module.
//!
//! Handles loading, validating, and merging `pic-stitch.toml`. Stock defaults
//! are overridden by whatever the user file sets; CLI flags override both.
//!
//! ## Config File Location
//!
//! `pic-stitch.toml` in the working directory, or any file passed with
//! `--config`. A missing default file is not an error; a missing `--config`
//! file is.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! axis = "vertical"          # "vertical" or "horizontal"
//!
//! [gallery]
//! directory = "Pictures"     # Where stitched images are published
//! prefix = "IMG_"            # Filename prefix before the millisecond timestamp
//! compression = "default"    # PNG effort: "fast", "default", "best"
//! discard_failed = true      # Remove the pending entry when a save fails
//!
//! [limits]
//! max_input_pixels = 100000000    # Per decoded input
//! max_canvas_pixels = 400000000   # For the stitched result
//!
//! [processing]
//! max_processes = 4          # Max parallel decoders (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [layout]
//! axis = "horizontal"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::gallery::SaveOptions;
use crate::imaging::{PixelLimit, PngCompression};
use crate::types::Axis;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pic-stitch.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `pic-stitch.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StitchConfig {
    /// Default concatenation direction.
    pub layout: LayoutConfig,
    /// Output location and encoding.
    pub gallery: GalleryConfig,
    /// Resource limits for decode and compose.
    pub limits: LimitsConfig,
    /// Parallel decode settings.
    pub processing: ProcessingConfig,
}

impl StitchConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gallery.directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "gallery.directory must not be empty".into(),
            ));
        }
        if self.gallery.prefix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "gallery.prefix must not contain path separators".into(),
            ));
        }
        if self.gallery.prefix.starts_with('.') {
            return Err(ConfigError::Validation(
                "gallery.prefix must not start with '.'".into(),
            ));
        }
        if self.limits.max_input_pixels == 0 || self.limits.max_canvas_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits must be greater than zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save options derived from the `[gallery]` section.
    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            prefix: self.gallery.prefix.clone(),
            compression: self.gallery.compression,
            discard_failed: self.gallery.discard_failed,
        }
    }
}

/// Layout settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Axis used when the command line does not pick one.
    pub axis: Axis,
}

/// Gallery output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Directory acting as the shared image collection.
    pub directory: String,
    /// Filename prefix; the full name is `<prefix><unix-millis>.png`.
    pub prefix: String,
    /// PNG encoder effort. All levels are lossless.
    pub compression: PngCompression,
    /// Remove the pending entry when encoding or publishing fails.
    pub discard_failed: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            directory: "Pictures".to_string(),
            prefix: "IMG_".to_string(),
            compression: PngCompression::default(),
            discard_failed: true,
        }
    }
}

/// Pixel-count ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest input, in pixels, that will be decoded.
    pub max_input_pixels: u64,
    /// Largest stitched canvas, in pixels, that will be allocated.
    pub max_canvas_pixels: u64,
}

impl LimitsConfig {
    pub fn input_limit(&self) -> PixelLimit {
        PixelLimit(self.max_input_pixels)
    }

    pub fn canvas_limit(&self) -> PixelLimit {
        PixelLimit(self.max_canvas_pixels)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_pixels: 100_000_000,
            max_canvas_pixels: 400_000_000,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel decode workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(StitchConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StitchConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StitchConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// `explicit` is the `--config` path; it must exist. Without it,
/// [`DEFAULT_CONFIG_FILE`] inside `dir` is used when present.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<StitchConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(
            load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?,
        ),
        None => load_raw_config(&dir.join(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `pic-stitch.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pic-stitch Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--horizontal, --vertical, --gallery) override these.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# Concatenation direction when neither --vertical nor --horizontal is given.
#   vertical   : images stacked top to bottom (width = widest image)
#   horizontal : images placed left to right (height = tallest image)
axis = "vertical"

# ---------------------------------------------------------------------------
# Gallery output
# ---------------------------------------------------------------------------
[gallery]
# Directory the stitched images are published into. Created on first save.
directory = "Pictures"

# Filename prefix. Files are named <prefix><unix-millis>.png.
prefix = "IMG_"

# PNG encoder effort: "fast", "default" or "best". Always lossless.
compression = "default"

# Remove the hidden pending file when a save fails part-way.
# Set to false to keep it around for debugging.
discard_failed = true

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Largest input image, in pixels, that will be decoded.
max_input_pixels = 100000000

# Largest stitched canvas, in pixels, that will be allocated.
# RGBA uses 4 bytes per pixel, so the default caps the canvas at ~1.6 GB.
max_canvas_pixels = 400000000

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel decoders.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
