// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Door shadow.
//!
//! A light sits in one room and a sample point in the next. A sliding door
//! between them opens over a few frames; each frame refits the tree and
//! re-tests the light ray.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p umbra_demos --example door_shadow`

use glam::DVec3;
use kurbo::{Affine, Vec2};
use umbra_level::{Level, LevelLine, build_tree};
use umbra_tree::TreeStats;

fn report(label: &str, stats: &TreeStats) {
    println!(
        "{label}: {} nodes, {} leaves, depth {}",
        stats.nodes, stats.leaves, stats.max_depth
    );
}

fn main() {
    env_logger::init();

    // Two rooms sharing the wall x = 0, with a doorway from y = 40 to y = 60.
    let mut level = Level::new();
    level.push(LevelLine::solid((0.0, 0.0), (0.0, 40.0)));
    level.push(LevelLine::solid((0.0, 60.0), (0.0, 100.0)));
    level.push(LevelLine::solid((-100.0, 0.0), (100.0, 0.0)));
    level.push(LevelLine::solid((-100.0, 100.0), (100.0, 100.0)));
    let door = level.push(LevelLine::movable((0.0, 40.0), (0.0, 60.0)));

    let mut tree = build_tree(&level);
    report("built", &tree.stats());

    let light = DVec3::new(-50.0, 50.0, 32.0);
    let sample = DVec3::new(50.0, 50.0, 32.0);

    for frame in 0..6 {
        let t = tree.ray_test(light, sample);
        let dynamic = tree.dynamic_nodes();
        println!(
            "frame {frame}: hit fraction {t:.3} ({}), dynamic upload {} bytes",
            if t < 1.0 { "shadowed" } else { "lit" },
            dynamic.size
        );

        // Slide the door 5 units up per frame.
        level.transform_lines([door], Affine::translate(Vec2::new(0.0, 5.0)));
        if !tree.update(&level) {
            println!("frame {frame}: nothing moved");
        }
    }

    report("after refits", &tree.stats());
    if let Err(err) = tree.validate() {
        log::error!("tree invariants broken: {err}");
    }
}
