//! CLI output formatting for stitch runs.
//!
//! # Output Format
//!
//! ## Stitch
//!
//! ```text
//! Stitching 2 images (vertical)
//!     001 a.png (100x50)
//!     002 b.png (80x60)
//! Canvas 100x110
//! processing...
//! saved to gallery: Pictures/IMG_1760572800123.png
//! ```
//!
//! The last line is always the notice for the run's [`Outcome`]:
//!
//! | Outcome | Notice |
//! |---|---|
//! | `PermissionDenied` | `no permission` |
//! | `NoSelection` | `no images selected` |
//! | `Busy` | `already running` |
//! | `Saved` | `saved to gallery: <path>` |
//! | `SaveFailed` | `save failed` |
//! | `Failed` | `processing error: <detail>` |
//!
//! ## Check
//!
//! ```text
//! Plan (vertical)
//!     001 a.png (100x50) at 0,0
//!     002 b.png (80x60) at 0,50
//! Canvas 100x110
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::stitch::{Plan, StitchEvent};
use crate::types::Outcome;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// The one-line notice for an outcome.
pub fn notice(outcome: &Outcome) -> String {
    match outcome {
        Outcome::PermissionDenied => "no permission".to_string(),
        Outcome::NoSelection => "no images selected".to_string(),
        Outcome::Busy => "already running".to_string(),
        Outcome::Saved { path, .. } => format!("saved to gallery: {}", path.display()),
        Outcome::SaveFailed => "save failed".to_string(),
        Outcome::Failed { detail } => format!("processing error: {detail}"),
    }
}

// ============================================================================
// Stitch
// ============================================================================

/// Format a single stitch progress event as display lines.
pub fn format_stitch_event(event: &StitchEvent) -> Vec<String> {
    match event {
        StitchEvent::PermissionRequested => vec!["requesting access to images".to_string()],
        StitchEvent::Picked { count, axis } => {
            let noun = if *count == 1 { "image" } else { "images" };
            vec![format!("Stitching {count} {noun} ({axis})")]
        }
        StitchEvent::Loaded {
            index,
            source,
            width,
            height,
        } => vec![format!(
            "{}{} {} ({}x{})",
            indent(1),
            format_index(*index),
            source,
            width,
            height
        )],
        StitchEvent::Composed { width, height } => vec![format!("Canvas {width}x{height}")],
        StitchEvent::Saving => vec!["processing...".to_string()],
        StitchEvent::Finished(outcome) => vec![notice(outcome)],
    }
}

pub fn print_stitch_event(event: &StitchEvent) {
    for line in format_stitch_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format a dry-run plan: every source with its size and offset, then the canvas.
pub fn format_plan(plan: &Plan) -> Vec<String> {
    let mut lines = vec![format!("Plan ({})", plan.axis)];
    for (i, ((source, dims), at)) in plan.sources.iter().zip(&plan.placements).enumerate() {
        lines.push(format!(
            "{}{} {} ({}x{}) at {},{}",
            indent(1),
            format_index(i + 1),
            source,
            dims.width,
            dims.height,
            at.x,
            at.y
        ));
    }
    lines.push(format!(
        "Canvas {}x{}",
        plan.canvas.width, plan.canvas.height
    ));
    lines
}

pub fn print_plan(plan: &Plan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}
