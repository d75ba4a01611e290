#![forbid(unsafe_code)]

use tracing::trace;

use crate::array_type::ArrayType;
use crate::descriptor::{complex_lengths, validate_lengths};
use crate::error::{BufferSide, LayoutError};
use crate::{Placement, TransformKind};

/// Contiguous strides over `extents`, fastest dimension first.
///
/// `stride[0]` is 1 and each later stride is the previous one times the
/// previous extent. `leading_distance` replaces `extents[0]` in that product;
/// in-place real buffers use it to reserve room for their complex view.
/// Products saturate at `usize::MAX`; descriptors whose element count
/// overflows are rejected before any stride is derived.
#[must_use]
pub fn default_stride(extents: &[usize], leading_distance: Option<usize>) -> Vec<usize> {
    let mut stride = Vec::with_capacity(extents.len());
    let mut next = 1usize;
    for (dimension, &extent) in extents.iter().enumerate() {
        stride.push(next);
        let effective = if dimension == 0 {
            leading_distance.unwrap_or(extent)
        } else {
            extent
        };
        next = next.saturating_mul(effective);
    }
    stride
}

/// Element distance along dimension 0 of an in-place real buffer: room for
/// `lengths[0] / 2 + 1` complex values.
#[must_use]
pub fn in_place_leading_distance(lengths: &[usize]) -> usize {
    lengths
        .first()
        .map_or(0, |&length| (length / 2 + 1).saturating_mul(2))
}

/// Fill unset (empty) strides with contiguous defaults.
///
/// Supplied strides are checked before anything is derived: their
/// dimensionality must match `lengths`, in-place complex-to-complex strides
/// must agree, and in-place real/complex strides must be contiguous in
/// dimension 0 and keep the 2× real/complex relationship in the others.
/// Whether a real/complex transform runs forward is read from
/// `input_type`, not from `kind`. Stride magnitudes are not checked here, so
/// a zero stride passes; only the Hardened overlap check rejects it.
pub fn resolve_strides(
    placement: Placement,
    kind: TransformKind,
    lengths: &[usize],
    input_type: ArrayType,
    input_stride: Vec<usize>,
    output_stride: Vec<usize>,
) -> Result<(Vec<usize>, Vec<usize>), LayoutError> {
    validate_lengths(lengths)?;
    check_supplied_dimension(BufferSide::Input, lengths, &input_stride)?;
    check_supplied_dimension(BufferSide::Output, lengths, &output_stride)?;

    let (input_stride, output_stride) = if kind.is_complex() {
        resolve_complex_strides(placement, lengths, input_stride, output_stride)?
    } else {
        resolve_real_strides(
            placement,
            lengths,
            input_type.is_real(),
            input_stride,
            output_stride,
        )?
    };

    // Unreachable unless the derivation above is wrong.
    ensure_resolved(lengths, &input_stride, &output_stride)?;
    trace!(?input_stride, ?output_stride, "strides resolved");
    Ok((input_stride, output_stride))
}

/// Check fully specified strides without deriving anything.
///
/// Both strides must have one entry per dimension. The in-place rules are
/// the ones [`resolve_strides`] applies to supplied strides.
pub fn validate_strides(
    placement: Placement,
    kind: TransformKind,
    lengths: &[usize],
    input_type: ArrayType,
    input_stride: &[usize],
    output_stride: &[usize],
) -> Result<(), LayoutError> {
    validate_lengths(lengths)?;
    ensure_resolved(lengths, input_stride, output_stride)?;
    if placement.is_in_place() {
        if kind.is_complex() {
            check_in_place_complex(input_stride, output_stride)?;
        } else {
            check_in_place_real(input_type.is_real(), input_stride, output_stride)?;
        }
    }
    Ok(())
}

fn resolve_complex_strides(
    placement: Placement,
    lengths: &[usize],
    mut input_stride: Vec<usize>,
    mut output_stride: Vec<usize>,
) -> Result<(Vec<usize>, Vec<usize>), LayoutError> {
    if placement.is_in_place() {
        check_in_place_complex(&input_stride, &output_stride)?;
        if !input_stride.is_empty() && output_stride.is_empty() {
            output_stride.clone_from(&input_stride);
        }
    }
    if input_stride.is_empty() {
        input_stride = default_stride(lengths, None);
    }
    if output_stride.is_empty() {
        output_stride = default_stride(lengths, None);
    }
    Ok((input_stride, output_stride))
}

fn resolve_real_strides(
    placement: Placement,
    lengths: &[usize],
    forward: bool,
    mut input_stride: Vec<usize>,
    mut output_stride: Vec<usize>,
) -> Result<(Vec<usize>, Vec<usize>), LayoutError> {
    let in_place = placement.is_in_place();
    if in_place {
        check_in_place_real(forward, &input_stride, &output_stride)?;
    }

    let complex = complex_lengths(lengths);
    let real_leading = in_place.then(|| in_place_leading_distance(lengths));
    if input_stride.is_empty() {
        input_stride = if forward {
            default_stride(lengths, real_leading)
        } else {
            default_stride(&complex, None)
        };
    }
    if output_stride.is_empty() {
        output_stride = if forward {
            default_stride(&complex, None)
        } else {
            default_stride(lengths, real_leading)
        };
    }
    Ok((input_stride, output_stride))
}

fn check_supplied_dimension(
    side: BufferSide,
    lengths: &[usize],
    stride: &[usize],
) -> Result<(), LayoutError> {
    if !stride.is_empty() && stride.len() != lengths.len() {
        return Err(LayoutError::StrideLengthMismatch {
            side,
            expected: lengths.len(),
            actual: stride.len(),
        });
    }
    Ok(())
}

fn ensure_resolved(
    lengths: &[usize],
    input_stride: &[usize],
    output_stride: &[usize],
) -> Result<(), LayoutError> {
    for (side, stride) in [
        (BufferSide::Input, input_stride),
        (BufferSide::Output, output_stride),
    ] {
        if stride.len() != lengths.len() {
            return Err(LayoutError::StrideLengthMismatch {
                side,
                expected: lengths.len(),
                actual: stride.len(),
            });
        }
    }
    Ok(())
}

fn check_in_place_complex(
    input_stride: &[usize],
    output_stride: &[usize],
) -> Result<(), LayoutError> {
    if !input_stride.is_empty() && !output_stride.is_empty() && input_stride != output_stride {
        return Err(LayoutError::InPlaceStrideMismatch {
            input: input_stride.to_vec(),
            output: output_stride.to_vec(),
        });
    }
    Ok(())
}

// Each side's leading stride is checked on its own; the scaling rule needs both.
fn check_in_place_real(
    forward: bool,
    input_stride: &[usize],
    output_stride: &[usize],
) -> Result<(), LayoutError> {
    if let Some(&leading) = input_stride.first()
        && leading != 1
    {
        return Err(LayoutError::InPlaceContiguityViolation {
            side: BufferSide::Input,
            leading,
        });
    }
    if let Some(&leading) = output_stride.first()
        && leading != 1
    {
        return Err(LayoutError::InPlaceContiguityViolation {
            side: BufferSide::Output,
            leading,
        });
    }

    if input_stride.is_empty() || output_stride.is_empty() {
        return Ok(());
    }
    for (dimension, (&input, &output)) in input_stride
        .iter()
        .zip(output_stride)
        .enumerate()
        .skip(1)
    {
        let consistent = if forward {
            output.checked_mul(2) == Some(input)
        } else {
            input.checked_mul(2) == Some(output)
        };
        if !consistent {
            return Err(LayoutError::ScalingStrideMismatch {
                forward,
                dimension,
                input,
                output,
            });
        }
    }
    Ok(())
}

/// Reject a layout that addresses some element twice.
///
/// Axes of extent 1 never move, so they are ignored. The remaining
/// `(stride, extent)` pairs, batch included, are sorted by stride and each
/// stride must clear the span of the axes below it. Interleaved layouts
/// that are injective without nesting are rejected as well.
pub(crate) fn check_no_overlap(
    side: BufferSide,
    extents: &[usize],
    stride: &[usize],
    batch: usize,
    distance: usize,
) -> Result<(), LayoutError> {
    let mut axes = extents
        .iter()
        .copied()
        .zip(stride.iter().copied())
        .chain(std::iter::once((batch, distance)))
        .filter(|&(extent, _)| extent > 1)
        .map(|(extent, stride)| (stride, extent))
        .collect::<Vec<_>>();
    axes.sort_unstable();

    let mut reach = 1usize;
    for (stride, extent) in axes {
        if stride < reach {
            return Err(LayoutError::OverlappingStrides { side });
        }
        reach = stride
            .checked_mul(extent)
            .ok_or(LayoutError::BufferSizeOverflow { side })?;
    }
    Ok(())
}
