#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::array_type::ArrayType;
use crate::error::{BufferSide, LayoutError};

/// Floating-point precision of the transform data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    #[default]
    Single,
    Double,
}

impl Precision {
    /// Bytes per real scalar.
    #[must_use]
    pub const fn scalar_bytes(self) -> usize {
        match self {
            Self::Single => 4,
            Self::Double => 8,
        }
    }
}

/// Memory one side of a resolved descriptor addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferFootprint {
    /// 2 for planar storage, 1 otherwise.
    pub buffers: usize,
    /// Elements from the first to the last addressed one, batch included.
    pub elements: usize,
    pub bytes_per_buffer: usize,
    pub total_bytes: usize,
}

pub(crate) fn footprint(
    side: BufferSide,
    array_type: ArrayType,
    extents: &[usize],
    stride: &[usize],
    batch: usize,
    distance: usize,
    precision: Precision,
) -> Result<BufferFootprint, LayoutError> {
    let overflow = || LayoutError::BufferSizeOverflow { side };

    let transform_reach = extents
        .iter()
        .zip(stride)
        .try_fold(0usize, |acc, (&extent, &stride)| {
            extent
                .saturating_sub(1)
                .checked_mul(stride)
                .and_then(|reach| acc.checked_add(reach))
        })
        .ok_or_else(overflow)?;
    let batch_reach = batch
        .saturating_sub(1)
        .checked_mul(distance)
        .ok_or_else(overflow)?;
    let elements = transform_reach
        .checked_add(batch_reach)
        .and_then(|reach| reach.checked_add(1))
        .ok_or_else(overflow)?;

    let (buffers, scalars_per_element) = if array_type.is_planar() {
        (2, 1)
    } else if array_type.is_real() {
        (1, 1)
    } else {
        (1, 2)
    };
    let bytes_per_buffer = elements
        .checked_mul(scalars_per_element)
        .and_then(|scalars| scalars.checked_mul(precision.scalar_bytes()))
        .ok_or_else(overflow)?;
    let total_bytes = bytes_per_buffer.checked_mul(buffers).ok_or_else(overflow)?;

    Ok(BufferFootprint {
        buffers,
        elements,
        bytes_per_buffer,
        total_bytes,
    })
}
