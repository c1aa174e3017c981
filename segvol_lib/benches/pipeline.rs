use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use nalgebra::vector;
use segvol_lib::{
    common::{merge_intervals, Interval, LabelRange},
    test_helpers::striped_volume,
    transfer_function::{TfMode, TransferFunction},
    vcfg::read_parameters,
};

const INTERVALS: usize = 10_000;
const MAX_LABEL: u32 = 1_000_000;

fn random_intervals(count: usize) -> Vec<Interval> {
    (0..count)
        .map(|_| {
            let start = fastrand::u32(0..MAX_LABEL);
            let len = fastrand::u32(0..200);
            Interval::new(start, (start + len).min(MAX_LABEL))
        })
        .collect()
}

const CAMERA_BLOCK: &str = "Version 0.9.1
[Camera]
orbital: 1
position: 0 0 1
lookat: 0 0 0
rotation: 0.5 4 1.5
";

fn vcfg_text(materials: usize) -> String {
    let mut text = String::from(CAMERA_BLOCK);
    text.push_str(&format!("Materials: {materials}"));
    for _ in 0..materials {
        let start = fastrand::u32(0..MAX_LABEL);
        text.push_str(&format!(
            " m 0 {start} {} 0 0 1 1 0 0 1 0.5 0.5 0.5 -1 0",
            start + 10
        ));
    }
    text.push_str("\nAxis_Order: ZYX\nX_Axis: 1\n");
    text
}

fn merge(c: &mut Criterion) {
    fastrand::seed(7);
    c.bench_function("merge intervals", |b| {
        b.iter_batched(
            || random_intervals(INTERVALS),
            |intervals| black_box(merge_intervals(intervals)),
            BatchSize::SmallInput,
        )
    });
}

fn transfer_function(c: &mut Criterion) {
    fastrand::seed(7);
    let merged = merge_intervals(random_intervals(INTERVALS));
    let labels = LabelRange::from(0..=MAX_LABEL);

    c.bench_function("tf normalized", |b| {
        b.iter(|| {
            TransferFunction::build(black_box(&merged), labels, TfMode::Normalized)
        })
    });
    c.bench_function("tf native", |b| {
        b.iter(|| {
            TransferFunction::build(black_box(&merged), labels, TfMode::Native)
        })
    });
}

fn parse(c: &mut Criterion) {
    fastrand::seed(7);
    let text = vcfg_text(2_000);

    c.bench_function("parse vcfg", |b| {
        b.iter(|| read_parameters(black_box(&text)))
    });
}

fn label_range(c: &mut Criterion) {
    let volume = striped_volume(vector![256, 256, 128]);

    c.bench_function("label range", |b| {
        b.iter(|| black_box(&volume).label_range())
    });
}

criterion_group!(benches, merge, transfer_function, parse, label_range);
criterion_main!(benches);
