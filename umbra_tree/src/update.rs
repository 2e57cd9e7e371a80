// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame refit of the movable half.
//!
//! Only bounding boxes change here. Segments keep the leaf they were built into, so
//! after large movements boxes can grow loose; queries stay correct, just slower.

use alloc::vec::Vec;

use glam::{DVec2, Vec2};

use crate::tree::OcclusionTree;
use crate::types::{NodeIndex, NodeKind, Occluder};

/// Live geometry the movable segments are read back from.
pub trait OccluderSource {
    /// Current endpoints of level line `line`, or `None` if the line no longer exists.
    fn endpoints(&self, line: u32) -> Option<(DVec2, DVec2)>;
}

impl<F> OccluderSource for F
where
    F: Fn(u32) -> Option<(DVec2, DVec2)>,
{
    fn endpoints(&self, line: u32) -> Option<(DVec2, DVec2)> {
        self(line)
    }
}

impl OcclusionTree {
    /// Re-read every movable segment from `source` and refit the boxes above the
    /// ones that moved. Returns `true` if anything changed.
    ///
    /// Must not run concurrently with [`ray_test`](Self::ray_test); the borrow
    /// checker enforces this for safe callers.
    pub fn update<S: OccluderSource + ?Sized>(&mut self, source: &S) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let mut changed = false;
        let mut path = Vec::new();
        for slot in self.dynamic_segment_start..self.segments.len() {
            let line = self.sources[slot];
            let Some((start, end)) = source.endpoints(line) else {
                log::warn!("movable line {line} is gone; keeping its last position");
                continue;
            };
            if !(start.is_finite() && end.is_finite()) {
                log::warn!("movable line {line} has non-finite endpoints; skipped");
                continue;
            }
            let occluder = Occluder::new(start, end, line);
            let fresh = occluder.segment();
            let cached = self.segments[slot];
            if fresh == cached {
                continue;
            }

            // The boxes still enclose the cached position, not the new one.
            path.clear();
            let found = self.find_path(root, slot, cached.origin(), &mut path);
            debug_assert!(found, "segment slot {slot} is not reachable from the root");
            let Some((&leaf, ancestors)) = path.split_last().filter(|_| found) else {
                log::warn!("segment slot {slot} is not reachable from the root; skipped");
                continue;
            };

            self.nodes[leaf.get()].set_bounds(occluder.bounds());
            for &index in ancestors.iter().rev() {
                if let Some(NodeKind::Internal { left, right }) = self.nodes[index.get()].kind() {
                    let bounds = self.nodes[left.get()]
                        .bounds()
                        .union(&self.nodes[right.get()].bounds());
                    self.nodes[index.get()].set_bounds(bounds);
                }
            }
            self.segments[slot] = fresh;
            log::trace!(
                "refit segment slot {slot} (line {line}) through {} nodes",
                path.len()
            );
            changed = true;
        }
        changed
    }

    /// Collect the node path from `index` down to the leaf holding `slot`, only
    /// descending into boxes that contain `point`.
    fn find_path(
        &self,
        index: NodeIndex,
        slot: usize,
        point: Vec2,
        path: &mut Vec<NodeIndex>,
    ) -> bool {
        let Some(node) = self.nodes.get(index.get()) else {
            return false;
        };
        if path.len() >= self.nodes.len() || !node.bounds().contains_point(point) {
            return false;
        }
        path.push(index);
        match node.kind() {
            Some(NodeKind::Leaf { segment }) if segment == slot => return true,
            Some(NodeKind::Internal { left, right }) => {
                if self.find_path(left, slot, point, path)
                    || self.find_path(right, slot, point, path)
                {
                    return true;
                }
            }
            _ => {}
        }
        path.pop();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use glam::DVec3;

    fn wall(x0: f64, y0: f64, x1: f64, y1: f64, source: u32) -> Occluder {
        Occluder::new(DVec2::new(x0, y0), DVec2::new(x1, y1), source)
    }

    fn p(x: f64, y: f64) -> DVec3 {
        DVec3::new(x, y, 0.0)
    }

    /// A level with two static walls and a two-part door, all indexed by line.
    struct Lines(Vec<(DVec2, DVec2)>);

    impl OccluderSource for Lines {
        fn endpoints(&self, line: u32) -> Option<(DVec2, DVec2)> {
            self.0.get(line as usize).copied()
        }
    }

    impl Lines {
        fn occluder(&self, line: u32) -> Occluder {
            let (a, b) = self.0[line as usize];
            Occluder::new(a, b, line)
        }
    }

    fn door_level() -> (Lines, OcclusionTree) {
        let lines = Lines(vec![
            (DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0)),
            (DVec2::new(0.0, 100.0), DVec2::new(100.0, 100.0)),
            (DVec2::new(40.0, 50.0), DVec2::new(50.0, 50.0)),
            (DVec2::new(50.0, 50.0), DVec2::new(60.0, 50.0)),
        ]);
        let fixed = [lines.occluder(0), lines.occluder(1)];
        let movable = [lines.occluder(2), lines.occluder(3)];
        let tree = OcclusionTree::build(&fixed, &movable);
        (lines, tree)
    }

    fn assert_refit(tree: &OcclusionTree) {
        for node in tree.nodes() {
            if let Some(NodeKind::Internal { left, right }) = node.kind() {
                let l = tree.nodes()[left.get()].bounds();
                let r = tree.nodes()[right.get()].bounds();
                assert_eq!(node.bounds(), l.union(&r), "stale internal box");
            }
        }
    }

    #[test]
    fn unchanged_source_reports_no_change() {
        let (lines, mut tree) = door_level();
        let before = tree.nodes().to_vec();
        assert!(!tree.update(&lines));
        assert_eq!(tree.nodes(), &before[..]);
    }

    #[test]
    fn moving_door_out_of_the_way_clears_the_ray() {
        let (mut lines, mut tree) = door_level();
        let (from, to) = (p(45.0, 20.0), p(45.0, 80.0));
        assert!(tree.ray_test(from, to) < 1.0);

        for line in &mut lines.0[2..] {
            line.0.x += 30.0;
            line.1.x += 30.0;
        }
        assert!(tree.update(&lines));
        assert_eq!(tree.ray_test(from, to), 1.0);
        assert_refit(&tree);

        // Moving it back blocks the ray again.
        for line in &mut lines.0[2..] {
            line.0.x -= 30.0;
            line.1.x -= 30.0;
        }
        assert!(tree.update(&lines));
        assert!(tree.ray_test(from, to) < 1.0);
        assert_refit(&tree);
    }

    #[test]
    fn moving_door_into_the_ray_blocks_it() {
        let (mut lines, mut tree) = door_level();
        let (from, to) = (p(200.0, 20.0), p(200.0, 80.0));
        assert_eq!(tree.ray_test(from, to), 1.0);

        lines.0[3] = (DVec2::new(190.0, 40.0), DVec2::new(210.0, 40.0));
        assert!(tree.update(&lines));
        let t = tree.ray_test(from, to);
        assert!((t - 1.0 / 3.0).abs() < 1e-6, "t = {t}");
        assert_eq!(tree.segment(3).unwrap().origin(), Vec2::new(190.0, 40.0));
        assert_refit(&tree);

        // A second pass with the same positions is a no-op.
        assert!(!tree.update(&lines));
    }

    #[test]
    fn static_segments_are_never_reread() {
        let (mut lines, mut tree) = door_level();
        lines.0[0] = (DVec2::new(500.0, 500.0), DVec2::new(600.0, 500.0));
        assert!(!tree.update(&lines));
        assert!(tree.ray_test(p(50.0, -10.0), p(50.0, 10.0)) < 1.0);
    }

    #[test]
    fn missing_or_invalid_lines_are_skipped() {
        let (_, mut tree) = door_level();
        let gone = |_line: u32| -> Option<(DVec2, DVec2)> { None };
        assert!(!tree.update(&gone));
        let nan = |_line: u32| Some((DVec2::new(f64::NAN, 0.0), DVec2::ZERO));
        assert!(!tree.update(&nan));
        assert!(tree.ray_test(p(45.0, 20.0), p(45.0, 80.0)) < 1.0);
    }

    #[test]
    fn repeated_updates_keep_boxes_consistent() {
        let movable: Vec<_> = (0..16)
            .map(|i| {
                let x = f64::from(i) * 10.0;
                wall(x, 0.0, x + 5.0, 5.0, i)
            })
            .collect();
        let mut tree = OcclusionTree::build(&[wall(-50.0, -50.0, -40.0, -50.0, 99)], &movable);
        for frame in 0..10_u32 {
            let shift = f64::from(frame) * 3.0;
            let source = |line: u32| {
                let x = f64::from(line) * 10.0 + shift;
                Some((DVec2::new(x, shift), DVec2::new(x + 5.0, 5.0 + shift)))
            };
            assert_eq!(tree.update(&source), frame != 0);
            assert_refit(&tree);
        }
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not reachable from the root")]
    fn unreachable_leaf_asserts_in_debug() {
        let (mut lines, mut tree) = door_level();
        // Corrupt the cached origin so the pruned search cannot find the leaf.
        tree.segments[2].x = 1.0e6;
        lines.0[2].0.x += 1.0;
        tree.update(&lines);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn unreachable_leaf_is_skipped_in_release() {
        let (mut lines, mut tree) = door_level();
        // Corrupt the cached origin so the pruned search cannot find the leaf.
        tree.segments[2].x = 1.0e6;
        lines.0[2].0.x += 1.0;
        lines.0[3].0.x += 1.0;
        assert!(tree.update(&lines), "the intact door segment still updates");
        assert_eq!(tree.segments[2].x, 1.0e6);
    }
}
