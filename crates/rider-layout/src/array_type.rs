#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{BufferSide, LayoutError};
use crate::{Placement, TransformKind};

/// Numeric code the execution library uses for "not set, pick a default".
pub const ARRAY_TYPE_UNSET_CODE: i32 = 5;

/// How one side of the transform is laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayType {
    ComplexInterleaved,
    ComplexPlanar,
    Real,
    HermitianInterleaved,
    HermitianPlanar,
}

impl ArrayType {
    pub const ALL: [Self; 5] = [
        Self::ComplexInterleaved,
        Self::ComplexPlanar,
        Self::Real,
        Self::HermitianInterleaved,
        Self::HermitianPlanar,
    ];

    /// Decode a numeric array type; [`ARRAY_TYPE_UNSET_CODE`] decodes to `None`.
    pub fn from_code(code: i32, side: BufferSide) -> Result<Option<Self>, LayoutError> {
        match code {
            0 => Ok(Some(Self::ComplexInterleaved)),
            1 => Ok(Some(Self::ComplexPlanar)),
            2 => Ok(Some(Self::Real)),
            3 => Ok(Some(Self::HermitianInterleaved)),
            4 => Ok(Some(Self::HermitianPlanar)),
            ARRAY_TYPE_UNSET_CODE => Ok(None),
            _ => Err(LayoutError::InvalidArrayType { side, code }),
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ComplexInterleaved => 0,
            Self::ComplexPlanar => 1,
            Self::Real => 2,
            Self::HermitianInterleaved => 3,
            Self::HermitianPlanar => 4,
        }
    }

    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::ComplexInterleaved | Self::ComplexPlanar)
    }

    #[must_use]
    pub const fn is_hermitian(self) -> bool {
        matches!(self, Self::HermitianInterleaved | Self::HermitianPlanar)
    }

    #[must_use]
    pub const fn is_real(self) -> bool {
        matches!(self, Self::Real)
    }

    /// Planar storage keeps real and imaginary parts in separate buffers.
    #[must_use]
    pub const fn is_planar(self) -> bool {
        matches!(self, Self::ComplexPlanar | Self::HermitianPlanar)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ComplexInterleaved => "complex-interleaved",
            Self::ComplexPlanar => "complex-planar",
            Self::Real => "real",
            Self::HermitianInterleaved => "hermitian-interleaved",
            Self::HermitianPlanar => "hermitian-planar",
        }
    }
}

impl Display for ArrayType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage types a transform kind uses when the request leaves them unset.
#[must_use]
pub const fn default_array_types(kind: TransformKind) -> (ArrayType, ArrayType) {
    match kind {
        TransformKind::ComplexForward | TransformKind::ComplexInverse => {
            (ArrayType::ComplexInterleaved, ArrayType::ComplexInterleaved)
        }
        TransformKind::RealForward => (ArrayType::Real, ArrayType::HermitianInterleaved),
        TransformKind::RealInverse => (ArrayType::HermitianInterleaved, ArrayType::Real),
    }
}

/// Fill unset storage types from the transform kind. Set types are kept.
#[must_use]
pub fn resolve_array_types(
    kind: TransformKind,
    input: Option<ArrayType>,
    output: Option<ArrayType>,
) -> (ArrayType, ArrayType) {
    let (default_input, default_output) = default_array_types(kind);
    let resolved = (
        input.unwrap_or(default_input),
        output.unwrap_or(default_output),
    );
    trace!(%kind, input = %resolved.0, output = %resolved.1, "array types resolved");
    resolved
}

/// Check that the storage types can be paired for this placement and kind.
///
/// Complex-to-complex in-place transforms need identical types. Every
/// transform needs complex → complex, hermitian → real or real → hermitian.
/// The pairing rule does not look at the kind, so a real-forward request
/// with `hermitian → real` storage passes here; `RuntimeMode::Hardened`
/// rejects that later.
pub fn validate_array_types(
    placement: Placement,
    kind: TransformKind,
    input: ArrayType,
    output: ArrayType,
) -> Result<(), LayoutError> {
    if kind.is_complex() && placement.is_in_place() && input != output {
        return Err(LayoutError::InPlaceTypeMismatch { input, output });
    }

    let compatible = match input {
        ArrayType::ComplexInterleaved | ArrayType::ComplexPlanar => output.is_complex(),
        ArrayType::HermitianInterleaved | ArrayType::HermitianPlanar => output.is_real(),
        ArrayType::Real => output.is_hermitian(),
    };
    if !compatible {
        return Err(LayoutError::IncompatibleArrayTypePair { input, output });
    }
    Ok(())
}

/// Hardened check: the storage types belong to the kind's domain.
pub(crate) fn validate_kind_domain(
    kind: TransformKind,
    input: ArrayType,
    output: ArrayType,
) -> Result<(), LayoutError> {
    let matches_kind = match kind {
        TransformKind::ComplexForward | TransformKind::ComplexInverse => {
            input.is_complex() && output.is_complex()
        }
        TransformKind::RealForward => input.is_real() && output.is_hermitian(),
        TransformKind::RealInverse => input.is_hermitian() && output.is_real(),
    };
    if matches_kind {
        Ok(())
    } else {
        Err(LayoutError::TransformTypeMismatch {
            kind,
            input,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ARRAY_TYPE_UNSET_CODE, ArrayType, resolve_array_types, validate_array_types,
        validate_kind_domain,
    };
    use crate::error::{BufferSide, LayoutError};
    use crate::{Placement, TransformKind};

    #[test]
    fn unset_types_take_kind_defaults() {
        assert_eq!(
            resolve_array_types(TransformKind::ComplexInverse, None, None),
            (ArrayType::ComplexInterleaved, ArrayType::ComplexInterleaved)
        );
        assert_eq!(
            resolve_array_types(TransformKind::RealForward, None, None),
            (ArrayType::Real, ArrayType::HermitianInterleaved)
        );
        assert_eq!(
            resolve_array_types(TransformKind::RealInverse, None, None),
            (ArrayType::HermitianInterleaved, ArrayType::Real)
        );
    }

    #[test]
    fn set_types_are_kept() {
        let resolved = resolve_array_types(
            TransformKind::RealForward,
            None,
            Some(ArrayType::HermitianPlanar),
        );
        assert_eq!(resolved, (ArrayType::Real, ArrayType::HermitianPlanar));
    }

    #[test]
    fn array_type_codes_decode() {
        for ty in ArrayType::ALL {
            assert_eq!(ArrayType::from_code(ty.code(), BufferSide::Input), Ok(Some(ty)));
        }
        assert_eq!(
            ArrayType::from_code(ARRAY_TYPE_UNSET_CODE, BufferSide::Output),
            Ok(None)
        );
        assert_eq!(
            ArrayType::from_code(9, BufferSide::Output),
            Err(LayoutError::InvalidArrayType {
                side: BufferSide::Output,
                code: 9
            })
        );
    }

    #[test]
    fn in_place_complex_requires_identical_types() {
        let err = validate_array_types(
            Placement::InPlace,
            TransformKind::ComplexForward,
            ArrayType::ComplexInterleaved,
            ArrayType::ComplexPlanar,
        )
        .expect_err("mixed in-place types must fail");
        assert_eq!(
            err,
            LayoutError::InPlaceTypeMismatch {
                input: ArrayType::ComplexInterleaved,
                output: ArrayType::ComplexPlanar,
            }
        );

        validate_array_types(
            Placement::OutOfPlace,
            TransformKind::ComplexForward,
            ArrayType::ComplexInterleaved,
            ArrayType::ComplexPlanar,
        )
        .expect("out-of-place may mix interleaved and planar");
    }

    #[test]
    fn in_place_real_transforms_may_mix_types() {
        validate_array_types(
            Placement::InPlace,
            TransformKind::RealForward,
            ArrayType::Real,
            ArrayType::HermitianInterleaved,
        )
        .expect("real in-place pairs real with hermitian");
    }

    #[test]
    fn hermitian_to_complex_is_incompatible_for_every_kind() {
        for kind in TransformKind::ALL {
            for placement in [Placement::InPlace, Placement::OutOfPlace] {
                let err = validate_array_types(
                    placement,
                    kind,
                    ArrayType::HermitianInterleaved,
                    ArrayType::ComplexInterleaved,
                )
                .expect_err("hermitian input cannot produce complex output");
                if kind.is_complex() && placement.is_in_place() {
                    assert!(matches!(err, LayoutError::InPlaceTypeMismatch { .. }));
                } else {
                    assert!(matches!(err, LayoutError::IncompatibleArrayTypePair { .. }));
                }
            }
        }
    }

    #[test]
    fn pairing_table_is_exact() {
        for input in ArrayType::ALL {
            for output in ArrayType::ALL {
                let expected = (input.is_complex() && output.is_complex())
                    || (input.is_hermitian() && output.is_real())
                    || (input.is_real() && output.is_hermitian());
                let observed = validate_array_types(
                    Placement::OutOfPlace,
                    TransformKind::RealForward,
                    input,
                    output,
                )
                .is_ok();
                assert_eq!(observed, expected, "{input} -> {output}");
            }
        }
    }

    #[test]
    fn kind_domain_rejects_swapped_real_types() {
        let err = validate_kind_domain(
            TransformKind::RealForward,
            ArrayType::HermitianInterleaved,
            ArrayType::Real,
        )
        .expect_err("real-forward reading hermitian data must fail");
        assert!(matches!(err, LayoutError::TransformTypeMismatch { .. }));
        validate_kind_domain(
            TransformKind::ComplexInverse,
            ArrayType::ComplexPlanar,
            ArrayType::ComplexInterleaved,
        )
        .expect("complex kinds accept any complex storage");
    }
}
