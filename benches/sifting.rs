//! Benchmarks for sieve decision throughput

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sieve::{Sample, Sieve, SieveConfig, Timestamp};
use std::time::Duration;

fn generate_samples(count: usize, noisy: bool) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let value = if noisy {
                20.0 + (i as f64 * 0.37).sin() * 5.0
            } else {
                20.0
            };
            Sample::new(Timestamp::from_secs(i as u64 * 10), value)
        })
        .collect()
}

fn bench_sifting(c: &mut Criterion) {
    let mut group = c.benchmark_group("sifting");
    let config = SieveConfig {
        min_point_accumulation_time: Duration::from_secs(60),
        ..Default::default()
    };

    group.throughput(Throughput::Elements(1000));

    let constant = generate_samples(1000, false);
    group.bench_function("constant_1000_samples", |b| {
        b.iter(|| {
            let mut sieve = Sieve::new(config.clone()).unwrap();
            for sample in &constant {
                black_box(sieve.sift("constant", *sample));
            }
        })
    });

    let noisy = generate_samples(1000, true);
    group.bench_function("noisy_1000_samples", |b| {
        b.iter(|| {
            let mut sieve = Sieve::new(config.clone()).unwrap();
            for sample in &noisy {
                black_box(sieve.sift("noisy", *sample));
            }
        })
    });

    group.finish();
}

fn bench_many_identities(c: &mut Criterion) {
    let mut group = c.benchmark_group("identities");
    let identities: Vec<String> = (0..1000).map(|i| format!("metric.{}", i)).collect();

    group.throughput(Throughput::Elements(identities.len() as u64 * 10));
    group.bench_function("1000_identities_10_rounds", |b| {
        b.iter(|| {
            let mut sieve = Sieve::with_defaults();
            for round in 0..10u64 {
                for identity in &identities {
                    black_box(sieve.sift(identity, Sample::at_secs(round * 30, round as f64)));
                }
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sifting, bench_many_identities);
criterion_main!(benches);
