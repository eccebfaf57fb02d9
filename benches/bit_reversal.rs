use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use p2fft::bit_reverse::bit_reverse_in_place;
use p2fft::BitReverseAlgorithm;

pub fn bit_reversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_reverse_in_place");

    for log_n in 10..=16 {
        let big_n = 1 << log_n;
        let mut v: Vec<f64> = (0..big_n).map(|i| i as f64).collect();
        for algorithm in [
            BitReverseAlgorithm::SwapTable,
            BitReverseAlgorithm::Gray,
            BitReverseAlgorithm::Cobra,
        ] {
            let id = BenchmarkId::new(format!("{algorithm:?}"), log_n);
            group.bench_with_input(id, &log_n, |b, log_n| {
                b.iter(|| bit_reverse_in_place(black_box(&mut v), black_box(*log_n), algorithm))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bit_reversal);
criterion_main!(benches);
