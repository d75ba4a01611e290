#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rider_layout::{
    DescriptorRequest, LayoutOptions, RuntimeMode, TransformDescriptor, resolve_descriptor,
};

#[derive(Debug, Arbitrary)]
struct CodesInput {
    lengths: Vec<u16>,
    out_of_place: bool,
    transform_code: i32,
    input_type_code: i32,
    output_type_code: i32,
    input_stride: Vec<u16>,
    output_stride: Vec<u16>,
    batch: u8,
    input_distance: Option<u32>,
    output_distance: Option<u32>,
    hardened: bool,
}

fn widen(values: &[u16]) -> Vec<usize> {
    values.iter().map(|&value| usize::from(value)).collect()
}

fn check_invariants(descriptor: &TransformDescriptor) {
    let dims = descriptor.dimensionality();
    if descriptor.input_stride().len() != dims || descriptor.output_stride().len() != dims {
        panic!("resolved stride dimensionality disagrees with lengths");
    }
    if !descriptor.placement().is_in_place() {
        return;
    }
    if descriptor.kind().is_complex() {
        if descriptor.input_type() != descriptor.output_type() {
            panic!("in-place complex descriptor with differing storage types");
        }
        if descriptor.input_stride() != descriptor.output_stride() {
            panic!("in-place complex descriptor with differing strides");
        }
    } else if descriptor.input_stride()[0] != 1 || descriptor.output_stride()[0] != 1 {
        panic!("in-place real descriptor with strided leading dimension");
    }
}

fuzz_target!(|input: CodesInput| {
    let Ok(request) = DescriptorRequest::from_codes(
        widen(&input.lengths),
        input.out_of_place,
        input.transform_code,
        input.input_type_code,
        input.output_type_code,
    ) else {
        return;
    };
    let mut request = request
        .with_input_stride(widen(&input.input_stride))
        .with_output_stride(widen(&input.output_stride))
        .with_batch(usize::from(input.batch));
    request.input_distance = input.input_distance.map(|d| d as usize);
    request.output_distance = input.output_distance.map(|d| d as usize);

    let mode = if input.hardened {
        RuntimeMode::Hardened
    } else {
        RuntimeMode::Strict
    };
    let options = LayoutOptions::default().with_mode(mode);
    if let Ok(descriptor) = resolve_descriptor(&request, &options) {
        check_invariants(&descriptor);
        match resolve_descriptor(&descriptor.to_request(), &options) {
            Ok(again) if again == descriptor => {}
            other => panic!("re-resolution changed the descriptor: {other:?}"),
        }
    }
});
