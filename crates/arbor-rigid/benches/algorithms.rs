//! Criterion benchmarks for the recursive algorithms on chains and a
//! floating-base tree.

use arbor_math::{DVec, Inertia, Symmetric3, Vec3, SE3, STANDARD_GRAVITY};
use arbor_model::{JointKind, Model, ModelBuilder};
use arbor_rigid::{forward_dynamics, forward_kinematics, inverse_dynamics, mass_matrix, random_configuration};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ---------------------------------------------------------------------------
// Model builders
// ---------------------------------------------------------------------------

fn link_inertia(mass: f64, length: f64) -> Inertia {
    Inertia::new(
        mass,
        Vec3::new(0.0, -length / 2.0, 0.0),
        Symmetric3::from_diagonal(&Vec3::new(
            mass * length * length / 12.0,
            0.0,
            mass * length * length / 12.0,
        )),
    )
}

/// Chain of N revolute links hanging vertically.
fn make_chain(n: usize) -> Model {
    let length = 1.0;
    let rz = JointKind::revolute(Vec3::z()).unwrap();
    let mut builder = ModelBuilder::new().gravity(Vec3::new(0.0, -STANDARD_GRAVITY, 0.0));
    for i in 0..n {
        let placement = if i == 0 {
            SE3::identity()
        } else {
            SE3::from_translation(Vec3::new(0.0, -length, 0.0))
        };
        builder = builder.add_body(&format!("link{}", i + 1), i, rz, placement, link_inertia(1.0, length));
    }
    builder.build().unwrap()
}

/// Floating torso with four 3-link legs.
fn make_quadruped() -> Model {
    let mut builder = ModelBuilder::new().add_body(
        "torso",
        0,
        JointKind::Free,
        SE3::identity(),
        Inertia::from_box(10.0, 0.6, 0.3, 0.15).unwrap(),
    );
    let hips = [(0.3, 0.15), (0.3, -0.15), (-0.3, 0.15), (-0.3, -0.15)];
    let mut next = 2;
    for (leg, (x, y)) in hips.iter().enumerate() {
        builder = builder
            .add_body(
                &format!("hip{leg}"),
                1,
                JointKind::Spherical,
                SE3::from_translation(Vec3::new(*x, *y, 0.0)),
                link_inertia(1.0, 0.3),
            )
            .add_body(
                &format!("knee{leg}"),
                next,
                JointKind::revolute(Vec3::y()).unwrap(),
                SE3::from_translation(Vec3::new(0.0, -0.3, 0.0)),
                link_inertia(0.8, 0.3),
            )
            .add_body(
                &format!("ankle{leg}"),
                next + 1,
                JointKind::revolute(Vec3::y()).unwrap(),
                SE3::from_translation(Vec3::new(0.0, -0.3, 0.0)),
                link_inertia(0.2, 0.1),
            );
        next += 3;
    }
    builder.build().unwrap()
}

fn inputs(model: &Model) -> (DVec, DVec, DVec) {
    let mut rng = StdRng::seed_from_u64(0);
    let q = random_configuration(model, &mut rng);
    let v = DVec::from_fn(model.nv, |i, _| 0.1 - 0.05 * i as f64);
    let a = DVec::from_fn(model.nv, |i, _| 0.2 * (i as f64).cos());
    (q, v, a)
}

// ---------------------------------------------------------------------------
// Benchmark 1: Chain scaling (n = 1, 4, 16, 64)
// ---------------------------------------------------------------------------

fn bench_chain_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_scaling");

    for &n in &[1, 4, 16, 64] {
        let model = make_chain(n);
        let mut data = model.create_data();
        let (q, v, a) = inputs(&model);

        group.bench_with_input(BenchmarkId::new("forward_kinematics", n), &n, |b, _| {
            b.iter(|| forward_kinematics(&model, &mut data, black_box(&q), Some(&v), Some(&a)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("rnea", n), &n, |b, _| {
            b.iter(|| {
                inverse_dynamics(&model, &mut data, black_box(&q), &v, &a).unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("aba", n), &n, |b, _| {
            b.iter(|| {
                forward_dynamics(&model, &mut data, black_box(&q), &v, &a).unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("crba", n), &n, |b, _| {
            b.iter(|| {
                mass_matrix(&model, &mut data, black_box(&q)).unwrap();
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 2: Floating-base tree
// ---------------------------------------------------------------------------

fn bench_quadruped(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadruped");
    let model = make_quadruped();
    let mut data = model.create_data();
    let (q, v, tau) = inputs(&model);

    group.bench_function("rnea", |b| {
        b.iter(|| {
            inverse_dynamics(&model, &mut data, black_box(&q), &v, &tau).unwrap();
        });
    });
    group.bench_function("aba", |b| {
        b.iter(|| {
            forward_dynamics(&model, &mut data, black_box(&q), &v, &tau).unwrap();
        });
    });
    group.bench_function("crba", |b| {
        b.iter(|| {
            mass_matrix(&model, &mut data, black_box(&q)).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_chain_scaling, bench_quadruped);
criterion_main!(benches);
