#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::TransformKind;
use crate::array_type::ArrayType;

/// Which buffer of the transform a check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferSide {
    Input,
    Output,
}

impl BufferSide {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Every way a descriptor can be rejected. Each one aborts resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    InvalidTransformKind {
        code: i32,
    },
    InvalidArrayType {
        side: BufferSide,
        code: i32,
    },
    IncompatibleArrayTypePair {
        input: ArrayType,
        output: ArrayType,
    },
    InPlaceTypeMismatch {
        input: ArrayType,
        output: ArrayType,
    },
    StrideLengthMismatch {
        side: BufferSide,
        expected: usize,
        actual: usize,
    },
    InPlaceStrideMismatch {
        input: Vec<usize>,
        output: Vec<usize>,
    },
    InPlaceContiguityViolation {
        side: BufferSide,
        leading: usize,
    },
    ScalingStrideMismatch {
        forward: bool,
        dimension: usize,
        input: usize,
        output: usize,
    },
    InvalidShape {
        detail: &'static str,
    },
    InPlaceDistanceMismatch {
        input: usize,
        output: usize,
    },
    BufferSizeOverflow {
        side: BufferSide,
    },
    /// Hardened only.
    TransformTypeMismatch {
        kind: TransformKind,
        input: ArrayType,
        output: ArrayType,
    },
    /// Hardened only.
    OverlappingStrides {
        side: BufferSide,
    },
}

/// Fieldless discriminant of [`LayoutError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutErrorKind {
    InvalidTransformKind,
    InvalidArrayType,
    IncompatibleArrayTypePair,
    InPlaceTypeMismatch,
    StrideLengthMismatch,
    InPlaceStrideMismatch,
    InPlaceContiguityViolation,
    ScalingStrideMismatch,
    InvalidShape,
    InPlaceDistanceMismatch,
    BufferSizeOverflow,
    TransformTypeMismatch,
    OverlappingStrides,
}

impl LayoutErrorKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvalidTransformKind => "invalid_transform_kind",
            Self::InvalidArrayType => "invalid_array_type",
            Self::IncompatibleArrayTypePair => "incompatible_array_type_pair",
            Self::InPlaceTypeMismatch => "in_place_type_mismatch",
            Self::StrideLengthMismatch => "stride_length_mismatch",
            Self::InPlaceStrideMismatch => "in_place_stride_mismatch",
            Self::InPlaceContiguityViolation => "in_place_contiguity_violation",
            Self::ScalingStrideMismatch => "scaling_stride_mismatch",
            Self::InvalidShape => "invalid_shape",
            Self::InPlaceDistanceMismatch => "in_place_distance_mismatch",
            Self::BufferSizeOverflow => "buffer_size_overflow",
            Self::TransformTypeMismatch => "transform_type_mismatch",
            Self::OverlappingStrides => "overlapping_strides",
        }
    }
}

impl Display for LayoutErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl LayoutError {
    #[must_use]
    pub const fn kind(&self) -> LayoutErrorKind {
        match self {
            Self::InvalidTransformKind { .. } => LayoutErrorKind::InvalidTransformKind,
            Self::InvalidArrayType { .. } => LayoutErrorKind::InvalidArrayType,
            Self::IncompatibleArrayTypePair { .. } => LayoutErrorKind::IncompatibleArrayTypePair,
            Self::InPlaceTypeMismatch { .. } => LayoutErrorKind::InPlaceTypeMismatch,
            Self::StrideLengthMismatch { .. } => LayoutErrorKind::StrideLengthMismatch,
            Self::InPlaceStrideMismatch { .. } => LayoutErrorKind::InPlaceStrideMismatch,
            Self::InPlaceContiguityViolation { .. } => {
                LayoutErrorKind::InPlaceContiguityViolation
            }
            Self::ScalingStrideMismatch { .. } => LayoutErrorKind::ScalingStrideMismatch,
            Self::InvalidShape { .. } => LayoutErrorKind::InvalidShape,
            Self::InPlaceDistanceMismatch { .. } => LayoutErrorKind::InPlaceDistanceMismatch,
            Self::BufferSizeOverflow { .. } => LayoutErrorKind::BufferSizeOverflow,
            Self::TransformTypeMismatch { .. } => LayoutErrorKind::TransformTypeMismatch,
            Self::OverlappingStrides { .. } => LayoutErrorKind::OverlappingStrides,
        }
    }
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransformKind { code } => write!(f, "invalid transform type code {code}"),
            Self::InvalidArrayType { side, code } => {
                write!(f, "invalid {} array type code {code}", side.name())
            }
            Self::IncompatibleArrayTypePair { input, output } => write!(
                f,
                "invalid combination of input/output array types: {input} -> {output}"
            ),
            Self::InPlaceTypeMismatch { input, output } => write!(
                f,
                "in-place transforms must have identical input and output types, got {input} and {output}"
            ),
            Self::StrideLengthMismatch {
                side,
                expected,
                actual,
            } => write!(
                f,
                "transform dimension {expected} doesn't match {} stride length {actual}",
                side.name()
            ),
            Self::InPlaceStrideMismatch { input, output } => write!(
                f,
                "in-place transforms require istride == ostride, got {input:?} and {output:?}"
            ),
            Self::InPlaceContiguityViolation { side, leading } => write!(
                f,
                "in-place real/complex transforms require contiguous {} data, got leading stride {leading}",
                side.name()
            ),
            Self::ScalingStrideMismatch {
                forward,
                dimension,
                input,
                output,
            } => {
                let direction = if *forward {
                    "real-to-complex"
                } else {
                    "complex-to-real"
                };
                write!(
                    f,
                    "in-place {direction} transform strides are inconsistent in dimension {dimension}: istride {input}, ostride {output}"
                )
            }
            Self::InvalidShape { detail } => write!(f, "invalid shape: {detail}"),
            Self::InPlaceDistanceMismatch { input, output } => write!(
                f,
                "in-place batch distances are inconsistent: idist {input}, odist {output}"
            ),
            Self::BufferSizeOverflow { side } => {
                write!(f, "{} buffer size overflows usize", side.name())
            }
            Self::TransformTypeMismatch {
                kind,
                input,
                output,
            } => write!(
                f,
                "{kind} transforms cannot read {input} and write {output}"
            ),
            Self::OverlappingStrides { side } => {
                write!(f, "{} layout addresses the same element twice", side.name())
            }
        }
    }
}

impl std::error::Error for LayoutError {}
