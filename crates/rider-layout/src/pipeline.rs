#![forbid(unsafe_code)]

use rider_runtime::{EvidenceLedger, RuntimeMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::array_type::{resolve_array_types, validate_array_types, validate_kind_domain};
use crate::batch::{default_distance, resolve_distances};
use crate::descriptor::{DescriptorRequest, TransformDescriptor, side_extents};
use crate::error::{BufferSide, LayoutError, LayoutErrorKind};
use crate::stride::{check_no_overlap, resolve_strides, validate_strides};
use crate::{Placement, TransformKind};

/// Options shared by every resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutOptions {
    pub mode: RuntimeMode,
}

impl LayoutOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A request field the pipeline had to derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultedField {
    InputType,
    OutputType,
    InputStride,
    OutputStride,
    InputDistance,
    OutputDistance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved {
        descriptor: TransformDescriptor,
    },
    Rejected {
        error: LayoutErrorKind,
        message: String,
    },
}

/// Audit record of one resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionEvidence {
    pub mode: RuntimeMode,
    pub kind: TransformKind,
    pub placement: Placement,
    pub lengths: Vec<usize>,
    pub defaulted: Vec<DefaultedField>,
    pub outcome: ResolutionOutcome,
}

/// Resolve a request into a descriptor the execution engine can run.
///
/// Stages run in order and the first failure aborts: shape check, storage
/// type defaults, storage type validation, stride defaults, stride
/// validation, batch distances, then the Hardened checks when enabled. The
/// request is never modified; a failure leaves nothing half-resolved.
pub fn resolve_descriptor(
    request: &DescriptorRequest,
    options: &LayoutOptions,
) -> Result<TransformDescriptor, LayoutError> {
    match run_pipeline(request, options.mode) {
        Ok(descriptor) => {
            debug!(
                kind = %request.kind,
                placement = %request.placement,
                dims = request.lengths.len(),
                mode = options.mode.name(),
                defaulted = ?defaulted_fields(request),
                "descriptor resolved"
            );
            Ok(descriptor)
        }
        Err(err) => {
            warn!(
                kind = %request.kind,
                placement = %request.placement,
                mode = options.mode.name(),
                error = %err.kind(),
                "descriptor rejected: {err}"
            );
            Err(err)
        }
    }
}

/// [`resolve_descriptor`], recording the outcome in a caller-owned ledger.
pub fn resolve_descriptor_with_evidence(
    request: &DescriptorRequest,
    options: &LayoutOptions,
    ledger: &mut EvidenceLedger<ResolutionEvidence>,
) -> Result<TransformDescriptor, LayoutError> {
    let result = resolve_descriptor(request, options);
    let outcome = match &result {
        Ok(descriptor) => ResolutionOutcome::Resolved {
            descriptor: descriptor.clone(),
        },
        Err(err) => ResolutionOutcome::Rejected {
            error: err.kind(),
            message: err.to_string(),
        },
    };
    ledger.record(ResolutionEvidence {
        mode: options.mode,
        kind: request.kind,
        placement: request.placement,
        lengths: request.lengths.clone(),
        defaulted: defaulted_fields(request),
        outcome,
    });
    result
}

fn run_pipeline(
    request: &DescriptorRequest,
    mode: RuntimeMode,
) -> Result<TransformDescriptor, LayoutError> {
    request.validate_shape()?;
    let DescriptorRequest {
        lengths,
        placement,
        kind,
        ..
    } = request;
    let (placement, kind) = (*placement, *kind);

    let (input_type, output_type) =
        resolve_array_types(kind, request.input_type, request.output_type);
    validate_array_types(placement, kind, input_type, output_type)?;

    let (input_stride, output_stride) = resolve_strides(
        placement,
        kind,
        lengths,
        input_type,
        request.input_stride.clone(),
        request.output_stride.clone(),
    )?;
    validate_strides(
        placement,
        kind,
        lengths,
        input_type,
        &input_stride,
        &output_stride,
    )?;

    let padded_input = side_extents(kind, placement, lengths, input_type, BufferSide::Input, true);
    let padded_output =
        side_extents(kind, placement, lengths, input_type, BufferSide::Output, true);
    let (input_distance, output_distance) = resolve_distances(
        placement,
        kind,
        input_type,
        request.input_distance,
        request.output_distance,
        || default_distance(BufferSide::Input, &input_stride, &padded_input),
        || default_distance(BufferSide::Output, &output_stride, &padded_output),
    )?;

    let descriptor = TransformDescriptor::from_parts(
        request,
        input_type,
        output_type,
        input_stride,
        output_stride,
        input_distance,
        output_distance,
    );
    if mode.is_hardened() {
        check_hardened(&descriptor)?;
    }
    Ok(descriptor)
}

// For in-place transforms the output view is the shared buffer.
fn check_hardened(descriptor: &TransformDescriptor) -> Result<(), LayoutError> {
    validate_kind_domain(
        descriptor.kind(),
        descriptor.input_type(),
        descriptor.output_type(),
    )?;
    check_no_overlap(
        BufferSide::Output,
        &descriptor.output_extents(),
        descriptor.output_stride(),
        descriptor.batch(),
        descriptor.output_distance(),
    )
}

fn defaulted_fields(request: &DescriptorRequest) -> Vec<DefaultedField> {
    [
        (request.input_type.is_none(), DefaultedField::InputType),
        (request.output_type.is_none(), DefaultedField::OutputType),
        (request.input_stride.is_empty(), DefaultedField::InputStride),
        (request.output_stride.is_empty(), DefaultedField::OutputStride),
        (request.input_distance.is_none(), DefaultedField::InputDistance),
        (request.output_distance.is_none(), DefaultedField::OutputDistance),
    ]
    .into_iter()
    .filter_map(|(unset, field)| unset.then_some(field))
    .collect()
}
