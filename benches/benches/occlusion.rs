// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use kurbo::{Affine, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use umbra_level::{Level, LevelLine, build_tree, extract_occluders};
use umbra_tree::OcclusionTree;

/// Grid of rooms: each cell gets two walls with a gap, plus one movable door
/// every `door_every` cells.
fn gen_rooms(n: usize, cell: f64, door_every: usize) -> (Level, Vec<usize>) {
    let mut level = Level::new();
    let mut doors = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            level.push(LevelLine::solid((x0, y0), (x0 + cell * 0.4, y0)));
            level.push(LevelLine::solid((x0, y0), (x0, y0 + cell * 0.4)));
            level.push(LevelLine::two_sided((x0 + cell * 0.4, y0), (x0 + cell, y0)));
            if (x + y * n) % door_every == 0 {
                doors.push(level.push(LevelLine::movable(
                    (x0 + cell * 0.4, y0),
                    (x0 + cell * 0.6, y0),
                )));
            }
        }
    }
    (level, doors)
}

fn gen_rays(count: usize, extent: f64, max_len: f64) -> Vec<(DVec3, DVec3)> {
    let mut rng = StdRng::seed_from_u64(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let a = DVec3::new(
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..128.0),
            );
            let d = DVec3::new(
                rng.gen_range(-max_len..max_len),
                rng.gen_range(-max_len..max_len),
                0.0,
            );
            (a, a + d)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[16_usize, 64, 128] {
        let (level, _) = gen_rooms(n, 128.0, 7);
        let occluders = extract_occluders(level.lines());
        group.throughput(Throughput::Elements(occluders.len() as u64));
        group.bench_function(format!("rooms_n{n}"), |b| {
            b.iter(|| {
                let tree = OcclusionTree::build(&occluders.fixed, &occluders.movable);
                black_box(tree.node_count());
            });
        });
    }
    group.finish();
}

fn bench_ray_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray_test");
    for &n in &[16_usize, 64, 128] {
        let (level, _) = gen_rooms(n, 128.0, 7);
        let tree = build_tree(&level);
        let extent = n as f64 * 128.0;
        // Short rays model light radii; long rays stress traversal.
        for (label, max_len) in [("short", 256.0), ("long", extent)] {
            let rays = gen_rays(1024, extent, max_len);
            group.throughput(Throughput::Elements(rays.len() as u64));
            group.bench_function(format!("{label}_n{n}"), |b| {
                b.iter(|| {
                    let blocked = rays
                        .iter()
                        .filter(|(a, e)| tree.is_occluded(*a, *e))
                        .count();
                    black_box(blocked);
                });
            });
        }
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    for &n in &[16_usize, 64, 128] {
        let (level, doors) = gen_rooms(n, 128.0, 7);
        let tree = build_tree(&level);
        group.throughput(Throughput::Elements(doors.len() as u64));
        group.bench_function(format!("all_doors_move_n{n}"), |b| {
            b.iter_batched(
                || {
                    let mut moved = level.clone();
                    moved.transform_lines(
                        doors.iter().copied(),
                        Affine::translate(Vec2::new(8.0, 0.0)),
                    );
                    (tree.clone(), moved)
                },
                |(mut tree, moved)| black_box(tree.update(&moved)),
                BatchSize::LargeInput,
            );
        });
        group.bench_function(format!("no_motion_n{n}"), |b| {
            let mut tree = tree.clone();
            b.iter(|| black_box(tree.update(&level)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_ray_test, bench_update);
criterion_main!(benches);
