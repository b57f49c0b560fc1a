use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dcviz_core::Replay;
use dcviz_trace::{
    closest_pair::{self, ClosestPair, POINTS},
    generator::{random_operands, random_points, random_values, rng_from},
    inversions::{self, CountingStrategy, InversionInput, SIZE},
    karatsuba::{self, DIGITS},
};

fn bench_builders(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_build");

    // Inputs are seeded so runs are comparable.
    let points = random_points(POINTS.max, &mut rng_from(Some(2024)));
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function(BenchmarkId::new("closest_pair", points.len()), |b| {
        b.iter(|| black_box(closest_pair::build_trace(black_box(&points))));
    });

    let values = random_values(SIZE.max, &mut rng_from(Some(2024)));
    for strategy in [CountingStrategy::Direct, CountingStrategy::Rank] {
        let input = InversionInput::new(values.clone(), strategy);
        group.bench_function(BenchmarkId::new("inversions", strategy), |b| {
            b.iter(|| black_box(inversions::build_trace(black_box(&input))));
        });
    }

    for digits in [DIGITS.default, DIGITS.max] {
        let input = random_operands(digits, &mut rng_from(Some(2024)));
        group.bench_function(BenchmarkId::new("karatsuba", format!("{digits}d")), |b| {
            b.iter(|| black_box(karatsuba::build_trace(black_box(&input))));
        });
    }

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let points = random_points(POINTS.max, &mut rng_from(Some(7)));
    c.bench_function("replay_closest_pair_to_end", |b| {
        b.iter_batched(
            || Replay::<ClosestPair>::new(points.clone()),
            |mut r| black_box(r.run_to_end()),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_builders, bench_replay);
criterion_main!(benches);
