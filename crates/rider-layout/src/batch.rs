#![forbid(unsafe_code)]

use tracing::trace;

use crate::array_type::ArrayType;
use crate::error::{BufferSide, LayoutError};
use crate::{Placement, TransformKind};

/// Distance between consecutive transforms of a batch when none is given:
/// the furthest `stride[i] * extent[i]` reach of one transform.
///
/// For contiguous strides this is the element count of one transform. A
/// reach that overflows `usize` is a [`LayoutError::BufferSizeOverflow`].
pub fn default_distance(
    side: BufferSide,
    stride: &[usize],
    extents: &[usize],
) -> Result<usize, LayoutError> {
    stride
        .iter()
        .zip(extents)
        .try_fold(0usize, |furthest, (&stride, &extent)| {
            stride.checked_mul(extent).map(|reach| furthest.max(reach))
        })
        .ok_or(LayoutError::BufferSizeOverflow { side })
}

/// Fill unset batch distances and check the in-place relationship.
///
/// `default_input` and `default_output` compute the [`default_distance`] of
/// each side over its padded extents; each runs only when that side's
/// distance is unset. An in-place complex-to-complex request that only
/// supplies the input distance reuses it for the output.
pub fn resolve_distances(
    placement: Placement,
    kind: TransformKind,
    input_type: ArrayType,
    input_distance: Option<usize>,
    output_distance: Option<usize>,
    default_input: impl FnOnce() -> Result<usize, LayoutError>,
    default_output: impl FnOnce() -> Result<usize, LayoutError>,
) -> Result<(usize, usize), LayoutError> {
    let output_distance = if placement.is_in_place() && kind.is_complex() {
        output_distance.or(input_distance)
    } else {
        output_distance
    };
    let input = match input_distance {
        Some(distance) => distance,
        None => default_input()?,
    };
    let output = match output_distance {
        Some(distance) => distance,
        None => default_output()?,
    };

    validate_distances(placement, kind, input_type, input, output)?;
    trace!(input, output, "batch distances resolved");
    Ok((input, output))
}

/// In-place transforms share one buffer, so their batch distances must
/// agree: equal for complex-to-complex, 2× between the real and complex
/// views otherwise. Out-of-place distances are unconstrained.
pub fn validate_distances(
    placement: Placement,
    kind: TransformKind,
    input_type: ArrayType,
    input: usize,
    output: usize,
) -> Result<(), LayoutError> {
    if !placement.is_in_place() {
        return Ok(());
    }
    let consistent = if kind.is_complex() {
        input == output
    } else if input_type.is_real() {
        output.checked_mul(2) == Some(input)
    } else {
        input.checked_mul(2) == Some(output)
    };
    if consistent {
        Ok(())
    } else {
        Err(LayoutError::InPlaceDistanceMismatch { input, output })
    }
}
