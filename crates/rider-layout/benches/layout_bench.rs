use criterion::{Criterion, criterion_group, criterion_main};
use rider_layout::{
    DescriptorRequest, LayoutOptions, Placement, RuntimeMode, TransformKind, default_stride,
    resolve_descriptor,
};

fn bench_default_stride(c: &mut Criterion) {
    let extents = [1024, 512, 64];
    c.bench_function("default_stride_3d", |b| {
        b.iter(|| default_stride(&extents, None));
    });
    c.bench_function("default_stride_3d_padded", |b| {
        b.iter(|| default_stride(&extents, Some(1026)));
    });
}

fn bench_resolve_defaults(c: &mut Criterion) {
    for kind in TransformKind::ALL {
        for placement in [Placement::InPlace, Placement::OutOfPlace] {
            let request = DescriptorRequest::new(vec![256, 128, 16], placement, kind).with_batch(4);
            let name = format!("resolve_{kind}_{placement}");
            c.bench_function(&name, |b| {
                b.iter(|| resolve_descriptor(&request, &LayoutOptions::default()));
            });
        }
    }
}

fn bench_resolve_hardened(c: &mut Criterion) {
    let options = LayoutOptions::default().with_mode(RuntimeMode::Hardened);
    let request = DescriptorRequest::new(
        vec![256, 128, 16],
        Placement::InPlace,
        TransformKind::RealForward,
    )
    .with_batch(4);
    c.bench_function("resolve_real_forward_in_place_hardened", |b| {
        b.iter(|| resolve_descriptor(&request, &options));
    });
}

fn bench_resolve_rejection(c: &mut Criterion) {
    let request =
        DescriptorRequest::new(vec![16], Placement::InPlace, TransformKind::ComplexForward)
            .with_input_stride(vec![1])
            .with_output_stride(vec![2]);
    c.bench_function("resolve_in_place_stride_mismatch", |b| {
        b.iter(|| resolve_descriptor(&request, &LayoutOptions::default()));
    });
}

criterion_group!(
    benches,
    bench_default_stride,
    bench_resolve_defaults,
    bench_resolve_hardened,
    bench_resolve_rejection
);
criterion_main!(benches);
