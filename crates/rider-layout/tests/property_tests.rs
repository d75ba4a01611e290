//! Property tests for rider-layout descriptor resolution.
//!
//! Convention: test_{module}_{function}_{scenario}
//!
//! Seed replay: `PROPTEST_CASES=1000 cargo test -p rider-layout --test property_tests`
//! Reproduce: `PROPTEST_SEED=<seed> cargo test -p rider-layout --test property_tests`

use proptest::prelude::*;
use rider_layout::{
    ArrayType, DescriptorRequest, LayoutOptions, Placement, RuntimeMode, TransformDescriptor,
    TransformKind, default_stride, resolve_descriptor,
};

fn kind_strategy() -> impl Strategy<Value = TransformKind> {
    prop::sample::select(TransformKind::ALL.to_vec())
}

fn placement_strategy() -> impl Strategy<Value = Placement> {
    prop::sample::select(vec![Placement::InPlace, Placement::OutOfPlace])
}

fn lengths_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..48, 1..=3)
}

fn array_type_strategy() -> impl Strategy<Value = Option<ArrayType>> {
    prop::option::of(prop::sample::select(ArrayType::ALL.to_vec()))
}

/// Requests with every optional field either unset or drawn at random.
fn request_strategy() -> impl Strategy<Value = DescriptorRequest> {
    (
        lengths_strategy(),
        placement_strategy(),
        kind_strategy(),
        array_type_strategy(),
        array_type_strategy(),
        prop::collection::vec(1usize..256, 0..=3),
        prop::collection::vec(1usize..256, 0..=3),
        1usize..5,
        prop::option::of(1usize..4096),
        prop::option::of(1usize..4096),
    )
        .prop_map(
            |(
                lengths,
                placement,
                kind,
                input_type,
                output_type,
                input_stride,
                output_stride,
                batch,
                input_distance,
                output_distance,
            )| DescriptorRequest {
                lengths,
                placement,
                kind,
                input_type,
                output_type,
                input_stride,
                output_stride,
                batch,
                input_distance,
                output_distance,
            },
        )
}

fn hardened() -> LayoutOptions {
    LayoutOptions::default().with_mode(RuntimeMode::Hardened)
}

fn assert_descriptor_invariants(descriptor: &TransformDescriptor) -> Result<(), TestCaseError> {
    let dims = descriptor.dimensionality();
    prop_assert!((1..=3).contains(&dims));
    prop_assert!(descriptor.lengths().iter().all(|&length| length > 0));
    prop_assert_eq!(descriptor.input_stride().len(), dims);
    prop_assert_eq!(descriptor.output_stride().len(), dims);
    if descriptor.placement().is_in_place() {
        if descriptor.kind().is_complex() {
            prop_assert_eq!(descriptor.input_type(), descriptor.output_type());
            prop_assert_eq!(descriptor.input_stride(), descriptor.output_stride());
            prop_assert_eq!(descriptor.input_distance(), descriptor.output_distance());
        } else {
            prop_assert_eq!(descriptor.input_stride()[0], 1);
            prop_assert_eq!(descriptor.output_stride()[0], 1);
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// Property 1: resolution is a deterministic function of the request
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn test_pipeline_resolve_descriptor_is_deterministic(request in request_strategy()) {
        let options = LayoutOptions::default();
        let first = resolve_descriptor(&request, &options);
        let second = resolve_descriptor(&request, &options);
        prop_assert_eq!(first, second);
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 2: resolving a resolved descriptor returns it unchanged
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn test_pipeline_resolve_descriptor_is_idempotent(
        request in request_strategy(),
        hardened_mode in any::<bool>(),
    ) {
        let options = if hardened_mode { hardened() } else { LayoutOptions::default() };
        if let Ok(descriptor) = resolve_descriptor(&request, &options) {
            let again = resolve_descriptor(&descriptor.to_request(), &options)
                .expect("resolved descriptor must resolve again");
            prop_assert_eq!(again, descriptor);
        }
    }

    #[test]
    fn test_pipeline_default_request_is_idempotent(
        lengths in lengths_strategy(),
        placement in placement_strategy(),
        kind in kind_strategy(),
        batch in 1usize..8,
    ) {
        let request = DescriptorRequest::new(lengths, placement, kind).with_batch(batch);
        let descriptor = resolve_descriptor(&request, &LayoutOptions::default())
            .expect("defaults always resolve");
        let again = resolve_descriptor(&descriptor.to_request(), &LayoutOptions::default())
            .expect("second pass resolves");
        prop_assert_eq!(again, descriptor);
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 3: default strides obey the contiguity law
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn test_stride_default_stride_contiguity_law(
        extents in prop::collection::vec(1usize..512, 0..=3),
    ) {
        let stride = default_stride(&extents, None);
        prop_assert_eq!(stride.len(), extents.len());
        if let Some(&first) = stride.first() {
            prop_assert_eq!(first, 1);
        }
        for i in 1..stride.len() {
            prop_assert_eq!(stride[i], stride[i - 1] * extents[i - 1]);
        }
    }

    #[test]
    fn test_stride_default_stride_override_only_touches_dimension_zero(
        extents in prop::collection::vec(1usize..512, 2..=3),
        leading in 1usize..1024,
    ) {
        let stride = default_stride(&extents, Some(leading));
        prop_assert_eq!(stride[0], 1);
        prop_assert_eq!(stride[1], leading);
        for i in 2..stride.len() {
            prop_assert_eq!(stride[i], stride[i - 1] * extents[i - 1]);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 4: every accepted descriptor satisfies the layout invariants
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn test_pipeline_accepted_descriptors_hold_invariants(request in request_strategy()) {
        if let Ok(descriptor) = resolve_descriptor(&request, &LayoutOptions::default()) {
            assert_descriptor_invariants(&descriptor)?;
        }
    }

    #[test]
    fn test_pipeline_in_place_complex_types_and_strides_agree(
        lengths in lengths_strategy(),
        kind in prop::sample::select(vec![
            TransformKind::ComplexForward,
            TransformKind::ComplexInverse,
        ]),
        input_type in array_type_strategy(),
        output_type in array_type_strategy(),
        input_stride in prop::collection::vec(1usize..64, 0..=3),
        output_stride in prop::collection::vec(1usize..64, 0..=3),
    ) {
        let mut request = DescriptorRequest::new(lengths, Placement::InPlace, kind)
            .with_input_stride(input_stride)
            .with_output_stride(output_stride);
        request.input_type = input_type;
        request.output_type = output_type;
        if let Ok(descriptor) = resolve_descriptor(&request, &LayoutOptions::default()) {
            prop_assert_eq!(descriptor.input_type(), descriptor.output_type());
            prop_assert_eq!(descriptor.input_stride(), descriptor.output_stride());
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 5: in-place real/complex strides keep the 2× relationship
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn test_pipeline_in_place_real_scaling_invariant(
        lengths in lengths_strategy(),
        kind in prop::sample::select(vec![TransformKind::RealForward, TransformKind::RealInverse]),
        input_stride in prop::collection::vec(1usize..128, 0..=3),
        output_stride in prop::collection::vec(1usize..128, 0..=3),
        batch in 1usize..4,
    ) {
        let request = DescriptorRequest::new(lengths, Placement::InPlace, kind)
            .with_input_stride(input_stride)
            .with_output_stride(output_stride)
            .with_batch(batch);
        if let Ok(descriptor) = resolve_descriptor(&request, &hardened()) {
            let input = descriptor.input_stride();
            let output = descriptor.output_stride();
            for i in 1..descriptor.dimensionality() {
                if kind == TransformKind::RealForward {
                    prop_assert_eq!(input[i], 2 * output[i]);
                } else {
                    prop_assert_eq!(2 * input[i], output[i]);
                }
            }
            if kind == TransformKind::RealForward {
                prop_assert_eq!(descriptor.input_distance(), 2 * descriptor.output_distance());
            } else {
                prop_assert_eq!(2 * descriptor.input_distance(), descriptor.output_distance());
            }
        }
    }

    #[test]
    fn test_pipeline_in_place_real_defaults_always_resolve(
        lengths in lengths_strategy(),
        kind in prop::sample::select(vec![TransformKind::RealForward, TransformKind::RealInverse]),
    ) {
        let request = DescriptorRequest::new(lengths.clone(), Placement::InPlace, kind);
        let descriptor = resolve_descriptor(&request, &hardened())
            .expect("default in-place real layout resolves under hardened checks");
        let padded = (lengths[0] / 2 + 1) * 2;
        let real_stride = if kind == TransformKind::RealForward {
            descriptor.input_stride()
        } else {
            descriptor.output_stride()
        };
        if lengths.len() > 1 {
            prop_assert_eq!(real_stride[1], padded);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 6: footprints cover every addressed element
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_buffer_footprint_covers_last_element(
        lengths in lengths_strategy(),
        placement in placement_strategy(),
        kind in kind_strategy(),
        batch in 1usize..6,
    ) {
        let request = DescriptorRequest::new(lengths, placement, kind).with_batch(batch);
        let descriptor = resolve_descriptor(&request, &LayoutOptions::default())
            .expect("defaults resolve");
        let footprint = descriptor
            .output_footprint(rider_layout::Precision::Single)
            .expect("small footprint");
        let last = descriptor
            .output_extents()
            .iter()
            .zip(descriptor.output_stride())
            .map(|(&extent, &stride)| (extent - 1) * stride)
            .sum::<usize>()
            + (batch - 1) * descriptor.output_distance();
        prop_assert_eq!(footprint.elements, last + 1);
        if placement.is_in_place() {
            let shared = descriptor
                .in_place_bytes(rider_layout::Precision::Single)
                .expect("small footprint");
            prop_assert!(shared >= footprint.bytes_per_buffer);
        }
    }
}
