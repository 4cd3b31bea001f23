//! Stitch controller: one user action from permission check to saved image.
//!
//! ```text
//! Idle ─▶ PermissionCheck ─▶ Picking ─┬─▶ (nothing picked) ─▶ Idle
//!                                     └─▶ Loading ─▶ Composing ─▶ Saving ─▶ Done | Failed
//! ```
//!
//! Every path ends in exactly one [`Outcome`]. Errors from the stages are
//! caught once, here, and mapped:
//!
//! | Stage error | Outcome |
//! |---|---|
//! | permission refused | `PermissionDenied` |
//! | empty pick | `NoSelection` |
//! | catalog refused an entry | `SaveFailed` |
//! | anything else | `Failed { detail }` |
//!
//! A [`Stitcher`] runs at most one action at a time. A second trigger while
//! one is in flight gets `Outcome::Busy` without touching the picker, the
//! backend or the catalog.
//!
//! Progress goes out as [`StitchEvent`]s on an optional channel so the caller
//! can print while the work runs on another thread.

use crate::gallery::{GalleryError, MediaCatalog, SaveOptions, save_to_gallery};
use crate::imaging::{
    BackendError, ComposeError, Dimensions, ImageBackend, PixelLimit, Placement, canvas_size,
    compose, placements,
};
use crate::loader::load_all;
use crate::selection::{ImagePicker, MediaPermission, SelectionError};
use crate::types::{Axis, ImageRef, Outcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StitchError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

impl StitchError {
    /// Map a stage failure to the user-visible outcome.
    pub fn into_outcome(self) -> Outcome {
        match self {
            StitchError::Gallery(GalleryError::AllocationFailed(_)) => Outcome::SaveFailed,
            other => Outcome::Failed {
                detail: other.to_string(),
            },
        }
    }
}

/// Per-action settings.
#[derive(Debug, Clone)]
pub struct StitchOptions {
    pub axis: Axis,
    pub save: SaveOptions,
    pub max_canvas_pixels: PixelLimit,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            axis: Axis::default(),
            save: SaveOptions::default(),
            max_canvas_pixels: PixelLimit::UNLIMITED,
        }
    }
}

/// Progress reported during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StitchEvent {
    /// Access was not held and has been requested.
    PermissionRequested,
    /// The picker returned a non-empty selection.
    Picked { count: usize, axis: Axis },
    /// One input decoded. `index` is 1-based in picked order.
    Loaded {
        index: usize,
        source: String,
        width: u32,
        height: u32,
    },
    /// The strip is composed and ready to save.
    Composed { width: u32, height: u32 },
    /// The gallery accepted a new entry and encoding has started.
    Saving,
    /// The run is over. Sent exactly once per run.
    Finished(Outcome),
}

/// Owns the backend and catalog for a surface and serializes runs on it.
pub struct Stitcher<B, C> {
    backend: B,
    catalog: C,
    busy: AtomicBool,
}

/// Clears the busy flag when the run ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: ImageBackend, C: MediaCatalog> Stitcher<B, C> {
    pub fn new(backend: B, catalog: C) -> Self {
        Self {
            backend,
            catalog,
            busy: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    /// Run one pick → load → compose → save action.
    pub fn run(
        &self,
        permission: &dyn MediaPermission,
        picker: &mut dyn ImagePicker,
        options: &StitchOptions,
        events: Option<Sender<StitchEvent>>,
    ) -> Outcome {
        let outcome = match self.try_begin() {
            Some(_guard) => self.run_exclusive(permission, picker, options, events.as_ref()),
            None => {
                tracing::warn!("stitch already in flight");
                Outcome::Busy
            }
        };
        tracing::debug!(?outcome, "stitch finished");
        emit(events.as_ref(), StitchEvent::Finished(outcome.clone()));
        outcome
    }

    fn run_exclusive(
        &self,
        permission: &dyn MediaPermission,
        picker: &mut dyn ImagePicker,
        options: &StitchOptions,
        events: Option<&Sender<StitchEvent>>,
    ) -> Outcome {
        if !permission.is_granted() {
            emit(events, StitchEvent::PermissionRequested);
            if !permission.request() {
                return Outcome::PermissionDenied;
            }
        }

        let picked = match picker.pick() {
            Ok(picked) => picked,
            Err(e) => return StitchError::from(e).into_outcome(),
        };
        if picked.is_empty() {
            return Outcome::NoSelection;
        }
        emit(
            events,
            StitchEvent::Picked {
                count: picked.len(),
                axis: options.axis,
            },
        );

        self.stitch_picked(&picked, options, events)
            .unwrap_or_else(StitchError::into_outcome)
    }

    fn stitch_picked(
        &self,
        picked: &[ImageRef],
        options: &StitchOptions,
        events: Option<&Sender<StitchEvent>>,
    ) -> Result<Outcome, StitchError> {
        let buffers = load_all(&self.backend, picked)?;
        for (i, (source, buffer)) in picked.iter().zip(&buffers).enumerate() {
            emit(
                events,
                StitchEvent::Loaded {
                    index: i + 1,
                    source: source.to_string(),
                    width: buffer.width(),
                    height: buffer.height(),
                },
            );
        }

        let images = buffers.len();
        let composed = compose(buffers, options.axis, options.max_canvas_pixels)?;
        let (width, height) = (composed.width(), composed.height());
        emit(events, StitchEvent::Composed { width, height });

        let published = save_to_gallery(
            &self.catalog,
            &self.backend,
            &composed,
            &options.save,
            |_| emit(events, StitchEvent::Saving),
        )?;
        Ok(Outcome::Saved {
            path: published.location,
            width,
            height,
            images,
        })
    }
}

fn emit(events: Option<&Sender<StitchEvent>>, event: StitchEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is printing.
        let _ = tx.send(event);
    }
}

/// Dry-run result for the `check` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub axis: Axis,
    pub sources: Vec<(ImageRef, Dimensions)>,
    pub canvas: Dimensions,
    pub placements: Vec<Placement>,
}

/// Decode every source and lay out the strip without painting or saving.
///
/// Fails the same way a real run would for unreadable inputs and for
/// canvases over `canvas_limit`.
pub fn plan(
    backend: &impl ImageBackend,
    sources: &[ImageRef],
    axis: Axis,
    canvas_limit: PixelLimit,
) -> Result<Plan, StitchError> {
    let dims: Vec<Dimensions> = load_all(backend, sources)?
        .iter()
        .map(|b| b.dimensions())
        .collect();
    let canvas = canvas_size(&dims, axis)?;
    if !canvas_limit.allows(canvas.width, canvas.height) {
        return Err(ComposeError::CanvasTooLarge {
            width: canvas.width,
            height: canvas.height,
            limit: canvas_limit.value(),
        }
        .into());
    }
    let placements = placements(&dims, axis);
    Ok(Plan {
        axis,
        sources: sources.iter().cloned().zip(dims).collect(),
        canvas,
        placements,
    })
}
