//! Shared types passed between the picker, the pipeline stages, and the
//! output layer.
//!
//! [`Outcome`] is also serialized as the `--json` report, so its shape is
//! part of the CLI contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Concatenation direction for one stitch.
///
/// Chosen once before picking and fixed for the whole composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Top to bottom: widths are maxed, heights are summed.
    #[default]
    Vertical,
    /// Left to right: widths are summed, heights are maxed.
    Horizontal,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Vertical => f.write_str("vertical"),
            Axis::Horizontal => f.write_str("horizontal"),
        }
    }
}

/// Opaque handle to one picked image.
///
/// The CLI host backs it with a filesystem path; nothing outside the backend
/// and the pickers looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// The single user-visible result of one stitch invocation.
///
/// Every reachable path through the controller ends in exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Read access to the picked media was refused.
    PermissionDenied,
    /// The picker returned nothing. Reported, but not a failure.
    NoSelection,
    /// Another stitch on the same surface was still in flight.
    Busy,
    /// The composed image was published to the gallery.
    Saved {
        path: PathBuf,
        width: u32,
        height: u32,
        images: usize,
    },
    /// The catalog refused to allocate an entry.
    SaveFailed,
    /// Any other failure during load, compose or save.
    Failed { detail: String },
}

impl Outcome {
    /// Whether the invocation should exit non-zero.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Saved { .. } | Outcome::NoSelection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_defaults_to_vertical() {
        assert_eq!(Axis::default(), Axis::Vertical);
    }

    #[test]
    fn axis_parses_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            axis: Axis,
        }
        let w: Wrapper = toml::from_str(r#"axis = "horizontal""#).unwrap();
        assert_eq!(w.axis, Axis::Horizontal);
    }

    #[test]
    fn empty_selection_is_not_a_failure() {
        assert!(!Outcome::NoSelection.is_failure());
        assert!(Outcome::SaveFailed.is_failure());
        assert!(Outcome::Busy.is_failure());
        assert!(Outcome::PermissionDenied.is_failure());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(Outcome::Saved {
            path: PathBuf::from("gallery/IMG_1.png"),
            width: 100,
            height: 110,
            images: 2,
        })
        .unwrap();
        assert_eq!(json["status"], "saved");
        assert_eq!(json["width"], 100);

        let json = serde_json::to_value(Outcome::Failed {
            detail: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["detail"], "boom");
    }
}
