//! Gallery writer: persist a composed image as a new catalog entry.
//!
//! # Save protocol
//!
//! ```text
//! name     = <prefix><unix-millis>.png
//! entry    = catalog.allocate(name)      pending, invisible to readers
//!            └─ None → AllocationFailed  nothing written, nothing to clean up
//! writer   = catalog.writer(entry)
//! encode   = backend.encode_png(buffer → writer), flush
//! publish  = catalog.publish(entry)      visible only after a clean encode
//! ```
//!
//! Any failure after allocation discards the pending entry before the error
//! is returned, so an interrupted save never leaves an orphaned record. Set
//! `discard_failed = false` to keep the pending entry for inspection.
//!
//! # Directory catalog
//!
//! [`DirectoryCatalog`] backs the gallery with a plain directory:
//!
//! ```text
//! Pictures/
//! ├── IMG_1760572800123.png          published
//! └── .pending-IMG_1760572801456.png in flight (hidden)
//! ```
//!
//! Pending files are created with create-new semantics and published with a
//! no-clobber hard link, so an existing image is never overwritten. There is
//! no rename fallback, so a gallery on a filesystem without hard links fails
//! to publish. Two saves in the same millisecond collide on the name; the
//! second one is refused at allocation.

use crate::imaging::{BackendError, ImageBackend, PixelBuffer, PngCompression};
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use walkdir::WalkDir;

/// Filename prefix marking an entry as pending in a [`DirectoryCatalog`].
const PENDING_PREFIX: &str = ".pending-";

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("gallery refused a new entry for {0}")]
    AllocationFailed(String),
    #[error("an image named {0} is already in the gallery")]
    NameTaken(String),
    #[error(transparent)]
    Encode(#[from] BackendError),
}

/// A catalog entry that has been allocated but is not yet visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub display_name: String,
    /// Catalog-specific location of the pending data.
    pub handle: PathBuf,
}

/// A catalog entry visible to other readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEntry {
    pub display_name: String,
    pub location: PathBuf,
}

/// Shared media store the gallery writes into.
///
/// Implementations must keep a pending entry invisible until [`publish`]
/// succeeds, and must never replace an existing published entry.
///
/// [`publish`]: MediaCatalog::publish
pub trait MediaCatalog {
    /// Reserve a new pending entry. `None` when the catalog refuses.
    fn allocate(&self, display_name: &str) -> Option<PendingEntry>;

    /// Open a byte sink bound to a pending entry.
    fn writer(&self, entry: &PendingEntry) -> Result<Box<dyn Write + '_>, GalleryError>;

    /// Make a fully written entry visible.
    fn publish(&self, entry: &PendingEntry) -> Result<PublishedEntry, GalleryError>;

    fn discard(&self, entry: PendingEntry) -> Result<(), GalleryError>;
}

/// Options for one save.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub prefix: String,
    pub compression: PngCompression,
    pub discard_failed: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            prefix: "IMG_".to_string(),
            compression: PngCompression::default(),
            discard_failed: true,
        }
    }
}

/// `<prefix><millis>.png`.
pub fn display_name(prefix: &str, millis: u128) -> String {
    format!("{prefix}{millis}.png")
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Save `buffer` into `catalog` as a new PNG entry named from the current time.
///
/// `on_allocated` runs once the catalog has handed out a pending entry and
/// before any bytes are encoded. It is not called when allocation is refused.
pub fn save_to_gallery(
    catalog: &impl MediaCatalog,
    backend: &impl ImageBackend,
    buffer: &PixelBuffer,
    options: &SaveOptions,
    on_allocated: impl FnOnce(&PendingEntry),
) -> Result<PublishedEntry, GalleryError> {
    save_named_with(
        catalog,
        backend,
        buffer,
        &display_name(&options.prefix, now_millis()),
        options,
        on_allocated,
    )
}

/// Save under an explicit display name. See the [module docs](self).
pub fn save_named(
    catalog: &impl MediaCatalog,
    backend: &impl ImageBackend,
    buffer: &PixelBuffer,
    name: &str,
    options: &SaveOptions,
) -> Result<PublishedEntry, GalleryError> {
    save_named_with(catalog, backend, buffer, name, options, |_| {})
}

/// [`save_named`] with a hook that runs right after allocation succeeds.
pub fn save_named_with(
    catalog: &impl MediaCatalog,
    backend: &impl ImageBackend,
    buffer: &PixelBuffer,
    name: &str,
    options: &SaveOptions,
    on_allocated: impl FnOnce(&PendingEntry),
) -> Result<PublishedEntry, GalleryError> {
    let Some(entry) = catalog.allocate(name) else {
        return Err(GalleryError::AllocationFailed(name.to_string()));
    };
    tracing::debug!(
        display_name = name,
        handle = %entry.handle.display(),
        "allocated pending entry"
    );
    on_allocated(&entry);

    let result = write_entry(catalog, backend, buffer, &entry, options.compression)
        .and_then(|()| catalog.publish(&entry));

    match result {
        Ok(published) => {
            tracing::info!(location = %published.location.display(), "published");
            Ok(published)
        }
        Err(err) => {
            if options.discard_failed {
                if let Err(discard_err) = catalog.discard(entry) {
                    tracing::warn!(
                        display_name = name,
                        error = %discard_err,
                        "failed to discard pending entry"
                    );
                }
            } else {
                tracing::warn!(
                    display_name = name,
                    handle = %entry.handle.display(),
                    "left pending entry after failure"
                );
            }
            Err(err)
        }
    }
}

fn write_entry(
    catalog: &impl MediaCatalog,
    backend: &impl ImageBackend,
    buffer: &PixelBuffer,
    entry: &PendingEntry,
    compression: PngCompression,
) -> Result<(), GalleryError> {
    let mut writer = catalog.writer(entry)?;
    backend.encode_png(buffer, compression, &mut *writer)?;
    writer.flush()?;
    Ok(())
}

/// A gallery backed by one directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn visible_path(&self, display_name: &str) -> PathBuf {
        self.root.join(display_name)
    }

    fn pending_path(&self, display_name: &str) -> PathBuf {
        self.root.join(format!("{PENDING_PREFIX}{display_name}"))
    }

    /// Published entries, sorted by name.
    pub fn entries(&self) -> io::Result<Vec<PathBuf>> {
        self.list(|name| !name.starts_with(PENDING_PREFIX))
    }

    /// Pending entries left behind by interrupted saves, sorted by name.
    pub fn pending_entries(&self) -> io::Result<Vec<PathBuf>> {
        self.list(|name| name.starts_with(PENDING_PREFIX))
    }

    fn list(&self, keep: impl Fn(&str) -> bool) -> io::Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() && entry.file_name().to_str().is_some_and(&keep) {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }
}

/// Remove a pending file whose data is already published. Returns whether it
/// is gone; failures are logged, never propagated.
fn release_pending(handle: &Path) -> bool {
    match fs::remove_file(handle) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!(
                handle = %handle.display(),
                error = %e,
                "published, but the pending file could not be removed"
            );
            false
        }
    }
}

impl MediaCatalog for DirectoryCatalog {
    fn allocate(&self, display_name: &str) -> Option<PendingEntry> {
        if let Err(e) = fs::create_dir_all(&self.root) {
            tracing::warn!(
                root = %self.root.display(),
                error = %e,
                "cannot create gallery directory"
            );
            return None;
        }
        if self.visible_path(display_name).exists() {
            tracing::warn!(display_name, "name already taken in gallery");
            return None;
        }

        let handle = self.pending_path(display_name);
        match OpenOptions::new().write(true).create_new(true).open(&handle) {
            Ok(_) => Some(PendingEntry {
                display_name: display_name.to_string(),
                handle,
            }),
            Err(e) => {
                tracing::warn!(display_name, error = %e, "cannot allocate pending entry");
                None
            }
        }
    }

    fn writer(&self, entry: &PendingEntry) -> Result<Box<dyn Write + '_>, GalleryError> {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&entry.handle)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn publish(&self, entry: &PendingEntry) -> Result<PublishedEntry, GalleryError> {
        let visible = self.visible_path(&entry.display_name);
        match fs::hard_link(&entry.handle, &visible) {
            Ok(()) => fs::remove_file(&entry.handle)?,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(GalleryError::NameTaken(entry.display_name.clone()));
            }
            // Filesystems without hard links: fall back to a checked rename.
            Err(_) if !visible.exists() => fs::rename(&entry.handle, &visible)?,
            Err(_) => return Err(GalleryError::NameTaken(entry.display_name.clone())),
        }

        Ok(PublishedEntry {
            display_name: entry.display_name.clone(),
            location: visible,
        })
    }

    fn discard(&self, entry: PendingEntry) -> Result<(), GalleryError> {
        match fs::remove_file(&entry.handle) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
