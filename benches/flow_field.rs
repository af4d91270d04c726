//! Benchmarks for noise generation, field sampling and simulation frames.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flowswarm::noise::{generate_perlin_noise_3d, generate_random_noise_3d, seeded_rng};
use flowswarm::prelude::*;

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("noise");
    group.sample_size(20);

    for dim in [32u32, 64] {
        group.bench_with_input(BenchmarkId::new("perlin", dim), &dim, |b, &dim| {
            let mut rng = seeded_rng(1);
            b.iter(|| black_box(generate_perlin_noise_3d(UVec3::splat(dim), UVec3::splat(8), &mut rng)))
        });
        group.bench_with_input(BenchmarkId::new("uniform", dim), &dim, |b, &dim| {
            let mut rng = seeded_rng(1);
            b.iter(|| black_box(generate_random_noise_3d(UVec3::splat(dim), -1.0..1.0, &mut rng)))
        });
    }

    group.finish();
}

fn perlin_field(dim: u32) -> VelocityField {
    let mut rng = seeded_rng(2);
    let bounds = UVec3::splat(dim);
    let res = UVec3::splat(4);
    VelocityField::new(
        generate_perlin_noise_3d(bounds, res, &mut rng),
        generate_perlin_noise_3d(bounds, res, &mut rng),
        generate_perlin_noise_3d(bounds, res, &mut rng),
        FieldParams::default(),
    )
    .unwrap()
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("field");
    let field = perlin_field(32);

    group.bench_function("sample_1k", |b| {
        let cells: Vec<UVec3> = (0..1000u32)
            .map(|i| UVec3::new(i % 32, (i / 32) % 32, (i * 7) % 32))
            .collect();
        b.iter(|| {
            let mut sum = Vec3::ZERO;
            for &cell in &cells {
                sum += field.sample(black_box(cell));
            }
            black_box(sum)
        })
    });

    group.bench_function("vector_samples_stride_4", |b| {
        b.iter(|| black_box(field.vector_samples(4)))
    });

    group.finish();
}

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");

    for bugs in [10usize, 1_000] {
        group.bench_with_input(BenchmarkId::new("frame", bugs), &bugs, |b, &bugs| {
            let config = SimConfig::new()
                .with_frames(u32::MAX)
                .with_bounds(UVec3::splat(32))
                .with_noise_resolution(UVec3::splat(4))
                .with_bugs(bugs)
                .with_seed(3);
            let mut sim = Simulation::from_config(config).unwrap();
            b.iter(|| black_box(sim.step()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_noise, bench_sampling, bench_simulation);
criterion_main!(benches);
