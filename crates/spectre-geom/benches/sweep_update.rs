// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Benchmark: incremental sweep-and-prune update cost under coherent motion.
//!
//! Each iteration nudges every box by a small random offset and re-sweeps,
//! then reads the collision list. The all-pairs baseline is measured on the
//! same scene for comparison.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spectre_geom::broad::all_pairs::AllPairs;
use spectre_geom::{Aabb, BroadPhase, SweepAndPrune, Vec3};

fn scene(n: usize, rng: &mut StdRng) -> Vec<Vec3> {
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-100.0..100.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-100.0..100.0),
            )
        })
        .collect()
}

fn boxes(centers: &[Vec3]) -> Vec<Aabb> {
    centers
        .iter()
        .map(|c| Aabb::from_center_half_extents(*c, Vec3::splat(1.0)))
        .collect()
}

fn jitter(centers: &mut [Vec3], rng: &mut StdRng) {
    for c in centers {
        *c += Vec3::new(rng.gen_range(-0.1..0.1), 0.0, rng.gen_range(-0.1..0.1));
    }
}

fn bench_sweep_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_update");
    for &n in &[100usize, 1_000, 5_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("sweep_and_prune", n), &n, |b, &n| {
            let mut rng = StdRng::seed_from_u64(0x5eed);
            let mut centers = scene(n, &mut rng);
            let mut sap = SweepAndPrune::new();
            for (id, bb) in (0_u64..).zip(boxes(&centers)) {
                sap.add_object(id, &[bb]).expect("add");
            }
            b.iter(|| {
                jitter(&mut centers, &mut rng);
                for (id, bb) in (0_u64..).zip(boxes(&centers)) {
                    sap.update_object(id, &[bb]).expect("update");
                }
                criterion::black_box(sap.true_collisions());
            });
        });
        if n <= 1_000 {
            group.bench_with_input(BenchmarkId::new("all_pairs", n), &n, |b, &n| {
                let mut rng = StdRng::seed_from_u64(0x5eed);
                let centers = scene(n, &mut rng);
                b.iter_batched(
                    || {
                        let mut centers = centers.clone();
                        jitter(&mut centers, &mut rng);
                        boxes(&centers)
                    },
                    |bbs| {
                        let mut oracle = AllPairs::new();
                        for (id, bb) in (0_u64..).zip(bbs) {
                            oracle.upsert(id, bb);
                        }
                        criterion::black_box(oracle.pairs());
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_sweep_update);
criterion_main!(benches);
