#![forbid(unsafe_code)]

//! Transform descriptor resolution for multidimensional DFT benchmarks.
//!
//! A benchmark request names the transform lengths, placement and kind, and
//! may leave the storage types, strides and batch distances unset. This
//! crate fills in the unset fields with consistent defaults and rejects
//! layouts the execution engine would read or write out of bounds.
//!
//! ## Module layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | `array_type` | [`ArrayType`], storage-type defaults and pair validation  |
//! | `stride`     | [`default_stride`], stride resolution and validation      |
//! | `batch`      | batch distance defaults and in-place distance checks      |
//! | `buffer`     | [`Precision`], per-buffer [`BufferFootprint`]             |
//! | `descriptor` | [`DescriptorRequest`] and the resolved descriptor         |
//! | `pipeline`   | [`resolve_descriptor`], [`LayoutOptions`], evidence       |
//! | `error`      | [`LayoutError`] and its fieldless [`LayoutErrorKind`]     |

pub mod array_type;
pub mod batch;
pub mod buffer;
pub mod descriptor;
pub mod error;
pub mod pipeline;
pub mod stride;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use array_type::{
    ARRAY_TYPE_UNSET_CODE, ArrayType, default_array_types, resolve_array_types,
    validate_array_types,
};
pub use batch::{default_distance, resolve_distances, validate_distances};
pub use buffer::{BufferFootprint, Precision};
pub use descriptor::{
    DescriptorRequest, MAX_DIMENSIONS, TransformDescriptor, complex_lengths, validate_lengths,
};
pub use error::{BufferSide, LayoutError, LayoutErrorKind};
pub use pipeline::{
    DefaultedField, LayoutOptions, ResolutionEvidence, ResolutionOutcome, resolve_descriptor,
    resolve_descriptor_with_evidence,
};
pub use rider_runtime::{EvidenceLedger, RuntimeMode, Sequenced};
pub use stride::{default_stride, in_place_leading_distance, resolve_strides, validate_strides};

/// The four DFT variants the execution engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    ComplexForward,
    ComplexInverse,
    RealForward,
    RealInverse,
}

impl TransformKind {
    pub const ALL: [Self; 4] = [
        Self::ComplexForward,
        Self::ComplexInverse,
        Self::RealForward,
        Self::RealInverse,
    ];

    /// Decode the execution library's numeric transform type.
    pub fn from_code(code: i32) -> Result<Self, LayoutError> {
        match code {
            0 => Ok(Self::ComplexForward),
            1 => Ok(Self::ComplexInverse),
            2 => Ok(Self::RealForward),
            3 => Ok(Self::RealInverse),
            _ => Err(LayoutError::InvalidTransformKind { code }),
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ComplexForward => 0,
            Self::ComplexInverse => 1,
            Self::RealForward => 2,
            Self::RealInverse => 3,
        }
    }

    /// Complex-to-complex, as opposed to real/complex.
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::ComplexForward | Self::ComplexInverse)
    }

    #[must_use]
    pub const fn is_forward(self) -> bool {
        matches!(self, Self::ComplexForward | Self::RealForward)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ComplexForward => "complex-forward",
            Self::ComplexInverse => "complex-inverse",
            Self::RealForward => "real-forward",
            Self::RealInverse => "real-inverse",
        }
    }
}

impl Display for TransformKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether input and output share one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    InPlace,
    OutOfPlace,
}

impl Placement {
    /// Benchmark harnesses carry placement as an out-of-place flag.
    #[must_use]
    pub const fn from_out_of_place(out_of_place: bool) -> Self {
        if out_of_place {
            Self::OutOfPlace
        } else {
            Self::InPlace
        }
    }

    #[must_use]
    pub const fn is_in_place(self) -> bool {
        matches!(self, Self::InPlace)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InPlace => "in-place",
            Self::OutOfPlace => "out-of-place",
        }
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
