//! Pure functions for strip geometry.
//!
//! Canvas sizing and input placement depend only on the ordered input
//! dimensions and the axis, so they live here apart from pixel work and are
//! tested without allocating a single buffer.

use super::backend::Dimensions;
use super::compose::ComposeError;
use crate::types::Axis;

/// Top-left corner at which one input is painted onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Size of the canvas needed to hold every input along `axis`.
///
/// - Vertical: `max(widths) × sum(heights)`
/// - Horizontal: `sum(widths) × max(heights)`
pub fn canvas_size(inputs: &[Dimensions], axis: Axis) -> Result<Dimensions, ComposeError> {
    if inputs.is_empty() {
        return Err(ComposeError::NoInputs);
    }

    let mut along: u32 = 0;
    let mut across: u32 = 0;
    for (index, dims) in inputs.iter().enumerate() {
        if dims.width == 0 || dims.height == 0 {
            return Err(ComposeError::ZeroSizeInput {
                index,
                width: dims.width,
                height: dims.height,
            });
        }
        let (extent, cross) = split(*dims, axis);
        along = along
            .checked_add(extent)
            .ok_or(ComposeError::ExtentOverflow { axis })?;
        across = across.max(cross);
    }

    Ok(join(along, across, axis))
}

/// Position of each input, in order, with a running offset along `axis`.
///
/// The first input sits at the origin; each following one starts where the
/// previous one ended. Cross-axis coordinates are always 0.
pub fn placements(inputs: &[Dimensions], axis: Axis) -> Vec<Placement> {
    let mut offset: u32 = 0;
    inputs
        .iter()
        .map(|dims| {
            let placement = match axis {
                Axis::Vertical => Placement { x: 0, y: offset },
                Axis::Horizontal => Placement { x: offset, y: 0 },
            };
            offset = offset.saturating_add(split(*dims, axis).0);
            placement
        })
        .collect()
}

/// `(extent along axis, extent across axis)`.
fn split(dims: Dimensions, axis: Axis) -> (u32, u32) {
    match axis {
        Axis::Vertical => (dims.height, dims.width),
        Axis::Horizontal => (dims.width, dims.height),
    }
}

fn join(along: u32, across: u32, axis: Axis) -> Dimensions {
    match axis {
        Axis::Vertical => Dimensions {
            width: across,
            height: along,
        },
        Axis::Horizontal => Dimensions {
            width: along,
            height: across,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    // =========================================================================
    // canvas_size
    // =========================================================================

    #[test]
    fn vertical_takes_max_width_and_sums_heights() {
        let size = canvas_size(&[dims(100, 50), dims(80, 60)], Axis::Vertical).unwrap();
        assert_eq!(size, dims(100, 110));
    }

    #[test]
    fn horizontal_sums_widths_and_takes_max_height() {
        let size = canvas_size(&[dims(100, 50), dims(80, 60)], Axis::Horizontal).unwrap();
        assert_eq!(size, dims(180, 60));
    }

    #[test]
    fn three_equal_squares_horizontal() {
        let size = canvas_size(&[dims(50, 50); 3], Axis::Horizontal).unwrap();
        assert_eq!(size, dims(150, 50));
    }

    #[test]
    fn single_input_keeps_its_size() {
        for axis in [Axis::Vertical, Axis::Horizontal] {
            assert_eq!(canvas_size(&[dims(7, 3)], axis).unwrap(), dims(7, 3));
        }
    }

    #[test]
    fn reversing_inputs_keeps_canvas_size() {
        let forward = [dims(10, 40), dims(30, 5), dims(25, 25)];
        let mut backward = forward;
        backward.reverse();
        for axis in [Axis::Vertical, Axis::Horizontal] {
            assert_eq!(
                canvas_size(&forward, axis).unwrap(),
                canvas_size(&backward, axis).unwrap()
            );
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(
            canvas_size(&[], Axis::Vertical),
            Err(ComposeError::NoInputs)
        );
    }

    #[test]
    fn zero_sized_input_is_rejected() {
        let result = canvas_size(&[dims(10, 10), dims(0, 10)], Axis::Horizontal);
        assert_eq!(
            result,
            Err(ComposeError::ZeroSizeInput {
                index: 1,
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn summed_extent_overflow_is_rejected() {
        let result = canvas_size(&[dims(1, u32::MAX), dims(1, 1)], Axis::Vertical);
        assert_eq!(
            result,
            Err(ComposeError::ExtentOverflow {
                axis: Axis::Vertical
            })
        );
    }

    // =========================================================================
    // placements
    // =========================================================================

    #[test]
    fn vertical_placements_stack_downwards() {
        let p = placements(&[dims(100, 50), dims(80, 60)], Axis::Vertical);
        assert_eq!(p, vec![Placement { x: 0, y: 0 }, Placement { x: 0, y: 50 }]);
    }

    #[test]
    fn horizontal_placements_advance_by_width() {
        let p = placements(&[dims(50, 50); 3], Axis::Horizontal);
        assert_eq!(
            p,
            vec![
                Placement { x: 0, y: 0 },
                Placement { x: 50, y: 0 },
                Placement { x: 100, y: 0 },
            ]
        );
    }

    #[test]
    fn placements_ignore_cross_axis_size() {
        let p = placements(&[dims(5, 200), dims(7, 1), dims(3, 90)], Axis::Horizontal);
        let xs: Vec<u32> = p.iter().map(|pl| pl.x).collect();
        assert_eq!(xs, vec![0, 5, 12]);
        assert!(p.iter().all(|pl| pl.y == 0));
    }
}
