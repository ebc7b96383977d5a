//! Equal-work strided walks: every stride touches the same number of bytes.

use cache_effects::stride::{DEFAULT_PASSES, DEFAULT_STRIDES, StrideConfig, walk};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn bench_strides(c: &mut Criterion) {
    let mut group = c.benchmark_group("stride_walk");
    group.throughput(Throughput::Elements(DEFAULT_PASSES as u64));

    for stride in DEFAULT_STRIDES {
        let config = StrideConfig::new(stride, DEFAULT_PASSES).expect("default stride is valid");
        group.bench_with_input(BenchmarkId::from_parameter(stride), &config, |b, config| {
            b.iter_batched_ref(
                || vec![0u8; config.buffer_len()],
                |buffer| walk(buffer, config.stride()),
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strides);
criterion_main!(benches);
