//! Picker and permission boundaries.
//!
//! The controller only sees the two traits. The CLI host supplies:
//!
//! - [`PathPicker`]: the image paths given on the command line, in order.
//! - [`DirectoryPicker`]: the supported images directly inside a directory,
//!   ordered by `NNN-` numeric prefix, then by name.
//! - [`FsPermission`]: "read access to visual media" means every source
//!   directory can be listed. A terminal has no grant dialog, so
//!   [`request`](MediaPermission::request) only checks again.

use crate::imaging::has_supported_extension;
use crate::types::ImageRef;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("cannot list {path}: {source}")]
    Walk {
        path: String,
        source: walkdir::Error,
    },
}

/// Capability check for reading the user's images.
pub trait MediaPermission {
    fn is_granted(&self) -> bool;

    /// Ask for access. Returns whether access is now granted.
    fn request(&self) -> bool;
}

/// Source of the user's selection. Zero images is a normal answer.
pub trait ImagePicker {
    fn pick(&mut self) -> Result<Vec<ImageRef>, SelectionError>;
}

/// Explicit paths, picked in the order given.
#[derive(Debug, Clone, Default)]
pub struct PathPicker {
    paths: Vec<PathBuf>,
}

impl PathPicker {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl ImagePicker for PathPicker {
    fn pick(&mut self) -> Result<Vec<ImageRef>, SelectionError> {
        Ok(self.paths.iter().map(ImageRef::new).collect())
    }
}

/// Every supported image directly inside `dir`.
#[derive(Debug, Clone)]
pub struct DirectoryPicker {
    dir: PathBuf,
}

impl DirectoryPicker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ImagePicker for DirectoryPicker {
    fn pick(&mut self) -> Result<Vec<ImageRef>, SelectionError> {
        let mut found = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| SelectionError::Walk {
                path: self.dir.display().to_string(),
                source,
            })?;
            if entry.file_type().is_file() && has_supported_extension(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort_by_cached_key(|path| order_key(path));
        tracing::debug!(dir = %self.dir.display(), count = found.len(), "picked directory");
        Ok(found.into_iter().map(ImageRef::new).collect())
    }
}

/// Sort key for directory picks: numbered files (`010-beach.jpg`) first by
/// number, then everything else by case-insensitive name.
fn order_key(path: &Path) -> (bool, u32, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let number = name
        .split_once('-')
        .map_or(name.split('.').next().unwrap_or(""), |(prefix, _)| prefix)
        .parse::<u32>()
        .ok();
    (number.is_none(), number.unwrap_or(0), name)
}

/// Filesystem-backed media permission.
#[derive(Debug, Clone)]
pub struct FsPermission {
    roots: Vec<PathBuf>,
}

impl FsPermission {
    /// Access to the directories holding `paths`.
    pub fn for_paths(paths: &[PathBuf]) -> Self {
        let mut roots: Vec<PathBuf> = paths
            .iter()
            .map(|p| match p.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            })
            .collect();
        roots.sort();
        roots.dedup();
        Self { roots }
    }

    /// Access to a single directory.
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![dir.into()],
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl MediaPermission for FsPermission {
    fn is_granted(&self) -> bool {
        self.roots.iter().all(|root| std::fs::read_dir(root).is_ok())
    }

    fn request(&self) -> bool {
        let granted = self.is_granted();
        if !granted {
            for root in self.roots.iter().filter(|r| std::fs::read_dir(r).is_err()) {
                tracing::warn!(root = %root.display(), "no read access");
            }
        }
        granted
    }
}
