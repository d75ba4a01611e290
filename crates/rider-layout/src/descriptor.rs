#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::array_type::ArrayType;
use crate::buffer::{BufferFootprint, Precision, footprint};
use crate::error::{BufferSide, LayoutError};
use crate::stride::in_place_leading_distance;
use crate::{Placement, TransformKind};

/// Transforms are supported for up to this many dimensions.
pub const MAX_DIMENSIONS: usize = 3;

/// Lengths of the hermitian half-spectrum of a real transform over `lengths`.
///
/// Only dimension 0 shrinks, to `lengths[0] / 2 + 1`.
#[must_use]
pub fn complex_lengths(lengths: &[usize]) -> Vec<usize> {
    let mut complex = lengths.to_vec();
    if let Some(leading) = complex.first_mut() {
        *leading = *leading / 2 + 1;
    }
    complex
}

/// Check dimensionality, positivity and that the padded element count fits.
pub fn validate_lengths(lengths: &[usize]) -> Result<(), LayoutError> {
    if lengths.is_empty() || lengths.len() > MAX_DIMENSIONS {
        return Err(LayoutError::InvalidShape {
            detail: "dimensionality must be 1, 2 or 3",
        });
    }
    if lengths.contains(&0) {
        return Err(LayoutError::InvalidShape {
            detail: "lengths must be greater than zero",
        });
    }
    let leading = (lengths[0] / 2 + 1).checked_mul(2);
    let padded = leading.and_then(|leading| {
        lengths[1..]
            .iter()
            .try_fold(leading, |acc, &next| acc.checked_mul(next))
    });
    if padded.is_none() {
        return Err(LayoutError::InvalidShape {
            detail: "element count overflows usize",
        });
    }
    Ok(())
}

fn default_batch() -> usize {
    1
}

/// A descriptor as the benchmark harness builds it.
///
/// `None` storage types, empty strides and `None` distances are derived by
/// [`crate::resolve_descriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorRequest {
    /// Fastest-varying dimension first.
    pub lengths: Vec<usize>,
    pub placement: Placement,
    pub kind: TransformKind,
    #[serde(default)]
    pub input_type: Option<ArrayType>,
    #[serde(default)]
    pub output_type: Option<ArrayType>,
    #[serde(default)]
    pub input_stride: Vec<usize>,
    #[serde(default)]
    pub output_stride: Vec<usize>,
    #[serde(default = "default_batch")]
    pub batch: usize,
    #[serde(default)]
    pub input_distance: Option<usize>,
    #[serde(default)]
    pub output_distance: Option<usize>,
}

impl DescriptorRequest {
    #[must_use]
    pub fn new(lengths: Vec<usize>, placement: Placement, kind: TransformKind) -> Self {
        Self {
            lengths,
            placement,
            kind,
            input_type: None,
            output_type: None,
            input_stride: Vec::new(),
            output_stride: Vec::new(),
            batch: 1,
            input_distance: None,
            output_distance: None,
        }
    }

    /// Build a request from the execution library's numeric codes.
    ///
    /// The transform code is decoded before either array type code.
    pub fn from_codes(
        lengths: Vec<usize>,
        out_of_place: bool,
        transform_code: i32,
        input_type_code: i32,
        output_type_code: i32,
    ) -> Result<Self, LayoutError> {
        let kind = TransformKind::from_code(transform_code)?;
        let input_type = ArrayType::from_code(input_type_code, BufferSide::Input)?;
        let output_type = ArrayType::from_code(output_type_code, BufferSide::Output)?;
        let mut request = Self::new(lengths, Placement::from_out_of_place(out_of_place), kind);
        request.input_type = input_type;
        request.output_type = output_type;
        Ok(request)
    }

    #[must_use]
    pub fn with_input_type(mut self, input_type: ArrayType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    #[must_use]
    pub fn with_output_type(mut self, output_type: ArrayType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    #[must_use]
    pub fn with_input_stride(mut self, input_stride: Vec<usize>) -> Self {
        self.input_stride = input_stride;
        self
    }

    #[must_use]
    pub fn with_output_stride(mut self, output_stride: Vec<usize>) -> Self {
        self.output_stride = output_stride;
        self
    }

    #[must_use]
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch;
        self
    }

    #[must_use]
    pub fn with_input_distance(mut self, input_distance: usize) -> Self {
        self.input_distance = Some(input_distance);
        self
    }

    #[must_use]
    pub fn with_output_distance(mut self, output_distance: usize) -> Self {
        self.output_distance = Some(output_distance);
        self
    }

    pub fn validate_shape(&self) -> Result<(), LayoutError> {
        validate_lengths(&self.lengths)?;
        if self.batch == 0 {
            return Err(LayoutError::InvalidShape {
                detail: "batch must be greater than zero",
            });
        }
        Ok(())
    }
}

/// A fully resolved descriptor, ready for the execution engine.
///
/// Only [`crate::resolve_descriptor`] builds one, so every value satisfies
/// the layout invariants for its placement and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformDescriptor {
    lengths: Vec<usize>,
    placement: Placement,
    kind: TransformKind,
    input_type: ArrayType,
    output_type: ArrayType,
    input_stride: Vec<usize>,
    output_stride: Vec<usize>,
    batch: usize,
    input_distance: usize,
    output_distance: usize,
}

impl TransformDescriptor {
    pub(crate) fn from_parts(
        request: &DescriptorRequest,
        input_type: ArrayType,
        output_type: ArrayType,
        input_stride: Vec<usize>,
        output_stride: Vec<usize>,
        input_distance: usize,
        output_distance: usize,
    ) -> Self {
        Self {
            lengths: request.lengths.clone(),
            placement: request.placement,
            kind: request.kind,
            input_type,
            output_type,
            input_stride,
            output_stride,
            batch: request.batch,
            input_distance,
            output_distance,
        }
    }

    #[must_use]
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.lengths.len()
    }

    #[must_use]
    pub fn complex_lengths(&self) -> Vec<usize> {
        complex_lengths(&self.lengths)
    }

    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub const fn kind(&self) -> TransformKind {
        self.kind
    }

    #[must_use]
    pub const fn input_type(&self) -> ArrayType {
        self.input_type
    }

    #[must_use]
    pub const fn output_type(&self) -> ArrayType {
        self.output_type
    }

    #[must_use]
    pub fn input_stride(&self) -> &[usize] {
        &self.input_stride
    }

    #[must_use]
    pub fn output_stride(&self) -> &[usize] {
        &self.output_stride
    }

    #[must_use]
    pub const fn batch(&self) -> usize {
        self.batch
    }

    #[must_use]
    pub const fn input_distance(&self) -> usize {
        self.input_distance
    }

    #[must_use]
    pub const fn output_distance(&self) -> usize {
        self.output_distance
    }

    /// Extents the input array is addressed over.
    #[must_use]
    pub fn input_extents(&self) -> Vec<usize> {
        side_extents(
            self.kind,
            self.placement,
            &self.lengths,
            self.input_type,
            BufferSide::Input,
            false,
        )
    }

    /// Extents the output array is addressed over.
    #[must_use]
    pub fn output_extents(&self) -> Vec<usize> {
        side_extents(
            self.kind,
            self.placement,
            &self.lengths,
            self.input_type,
            BufferSide::Output,
            false,
        )
    }

    pub fn input_footprint(&self, precision: Precision) -> Result<BufferFootprint, LayoutError> {
        footprint(
            BufferSide::Input,
            self.input_type,
            &self.input_extents(),
            &self.input_stride,
            self.batch,
            self.input_distance,
            precision,
        )
    }

    pub fn output_footprint(&self, precision: Precision) -> Result<BufferFootprint, LayoutError> {
        footprint(
            BufferSide::Output,
            self.output_type,
            &self.output_extents(),
            &self.output_stride,
            self.batch,
            self.output_distance,
            precision,
        )
    }

    /// Bytes each shared buffer of an in-place transform must hold: the
    /// larger of the input and output views.
    pub fn in_place_bytes(&self, precision: Precision) -> Result<usize, LayoutError> {
        let input = self.input_footprint(precision)?;
        let output = self.output_footprint(precision)?;
        Ok(input.bytes_per_buffer.max(output.bytes_per_buffer))
    }

    /// The same descriptor as a request with every field supplied.
    #[must_use]
    pub fn to_request(&self) -> DescriptorRequest {
        DescriptorRequest {
            lengths: self.lengths.clone(),
            placement: self.placement,
            kind: self.kind,
            input_type: Some(self.input_type),
            output_type: Some(self.output_type),
            input_stride: self.input_stride.clone(),
            output_stride: self.output_stride.clone(),
            batch: self.batch,
            input_distance: Some(self.input_distance),
            output_distance: Some(self.output_distance),
        }
    }
}

/// Extents one side of the transform is addressed over.
///
/// Complex-to-complex sides use `lengths`. For real/complex transforms the
/// real side (input when `input_type` is real, output otherwise) uses
/// `lengths` and the other side the complex lengths. With `padded`, the
/// real side of an in-place transform reports the padded dimension 0 its
/// buffer reserves.
pub(crate) fn side_extents(
    kind: TransformKind,
    placement: Placement,
    lengths: &[usize],
    input_type: ArrayType,
    side: BufferSide,
    padded: bool,
) -> Vec<usize> {
    if kind.is_complex() {
        return lengths.to_vec();
    }
    let forward = input_type.is_real();
    let real_side = match side {
        BufferSide::Input => forward,
        BufferSide::Output => !forward,
    };
    if !real_side {
        return complex_lengths(lengths);
    }
    let mut extents = lengths.to_vec();
    if padded
        && placement.is_in_place()
        && let Some(leading) = extents.first_mut()
    {
        *leading = in_place_leading_distance(lengths);
    }
    extents
}
