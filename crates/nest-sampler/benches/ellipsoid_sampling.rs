//! Throughput of the geometric primitives on the draw hot path.

use criterion::{Criterion, criterion_group, criterion_main};
use nest_sampler::Ellipsoid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

fn cloud(rng: &mut StdRng, n: usize, dim: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|_| (0..dim).map(|_| 0.4 + 0.2 * rng.random::<f64>()).collect())
        .collect()
}

fn bench_ellipsoid(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let points = cloud(&mut rng, 400, 8);
    let mut ell = Ellipsoid::from_points(&points).unwrap();
    ell.enlarge(ell.max_mahalanobis_sq(&points));

    c.bench_function("ellipsoid_from_points_d8_n400", |b| {
        b.iter(|| Ellipsoid::from_points(black_box(&points)).unwrap())
    });

    c.bench_function("ellipsoid_sample_uniform_d8", |b| {
        b.iter(|| black_box(ell.sample_uniform(&mut rng)))
    });

    let probe = ell.sample_uniform(&mut rng);
    c.bench_function("ellipsoid_contains_d8", |b| {
        b.iter(|| black_box(ell.contains(black_box(&probe))))
    });
}

criterion_group!(benches, bench_ellipsoid);
criterion_main!(benches);
