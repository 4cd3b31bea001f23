//! # pic-stitch
//!
//! Pick several images, join them into one strip, and save the strip to a
//! gallery directory as a lossless PNG.
//!
//! # Architecture: One Linear Pipeline
//!
//! ```text
//! permission ─▶ pick ─▶ load ─▶ compose ─▶ save
//!  MediaPermission  ImagePicker  loader  imaging::compose  gallery
//! ```
//!
//! [`stitch::Stitcher`] drives the pipeline for one user action and reduces
//! every path through it to a single [`types::Outcome`]. The stages only meet
//! their collaborators through traits ([`imaging::ImageBackend`],
//! [`gallery::MediaCatalog`], [`selection::ImagePicker`],
//! [`selection::MediaPermission`]), so the same pipeline is tested against
//! in-memory doubles and run from the CLI against the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`stitch`] | Controller: busy guard, stage sequencing, outcome mapping, dry-run plans |
//! | [`selection`] | Picker and permission traits plus the path/directory implementations |
//! | [`loader`] | Parallel, order-preserving decode of the whole selection |
//! | [`imaging`] | Pixel buffers, strip geometry, compositing, PNG encode via the `image` crate |
//! | [`gallery`] | Pending → published save protocol and the directory-backed catalog |
//! | [`config`] | `pic-stitch.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Shared types: `Axis`, `ImageRef`, `Outcome` |
//! | [`output`] | CLI notices and progress lines |
//!
//! # Design Decisions
//!
//! ## Nothing Is Visible Until It Is Complete
//!
//! A gallery entry starts pending and is only published after the PNG stream
//! has been fully written and flushed. A failed save removes the pending entry
//! again, so readers of the gallery never see a half-written image and no
//! orphans pile up.
//!
//! ## Geometry Separate From Pixels
//!
//! Canvas size and placements are pure functions of the input dimensions and
//! the axis ([`imaging::calculations`]). The compositor only copies pixels to
//! the offsets they return, and `check` can show the layout without painting
//! anything.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and PNG encoding use the `image` crate's pure-Rust codecs, so the
//! binary has no system library dependencies.

pub mod config;
pub mod gallery;
pub mod imaging;
pub mod loader;
pub mod output;
pub mod selection;
pub mod stitch;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
