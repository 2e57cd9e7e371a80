// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning level lines into tree occluders.

use alloc::vec::Vec;

use umbra_tree::{Occluder, OcclusionTree};

use crate::level::Level;
use crate::types::LevelLine;
use crate::util::{line_endpoints, line_is_finite};

/// Occluders extracted from a level, split by whether they can move.
#[derive(Clone, Debug, Default)]
pub struct Occluders {
    /// One-sided lines that never move.
    pub fixed: Vec<Occluder>,
    /// One-sided lines belonging to movable groups.
    pub movable: Vec<Occluder>,
}

impl Occluders {
    /// Total number of occluders.
    pub fn len(&self) -> usize {
        self.fixed.len() + self.movable.len()
    }

    /// True if no line blocks light.
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.movable.is_empty()
    }
}

/// Collect every one-sided line, keeping its index so tree slots can be traced
/// back to it. Two-sided lines are skipped entirely.
pub fn extract_occluders(lines: &[LevelLine]) -> Occluders {
    let mut out = Occluders::default();
    for (index, level_line) in lines.iter().enumerate() {
        if !level_line.is_occluder() {
            continue;
        }
        if !line_is_finite(level_line.line) {
            log::warn!("line {index} has non-finite endpoints; not an occluder");
            continue;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Level line indices are 32-bit in the tree."
        )]
        let source = index as u32;
        let (start, end) = line_endpoints(level_line.line);
        let occluder = Occluder::new(start, end, source);
        if level_line.is_movable() {
            out.movable.push(occluder);
        } else {
            out.fixed.push(occluder);
        }
    }
    out
}

/// Build an occlusion tree over every solid line in `level`.
pub fn build_tree(level: &Level) -> OcclusionTree {
    let occluders = extract_occluders(level.lines());
    log::debug!(
        "extracted {} fixed and {} movable occluders from {} lines",
        occluders.fixed.len(),
        occluders.movable.len(),
        level.len()
    );
    OcclusionTree::build(&occluders.fixed, &occluders.movable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineFlags;
    use alloc::vec;
    use glam::DVec2;

    #[test]
    fn two_sided_lines_are_excluded() {
        let lines = [
            LevelLine::solid((0.0, 0.0), (10.0, 0.0)),
            LevelLine::two_sided((0.0, 5.0), (10.0, 5.0)),
            LevelLine::new((0.0, 8.0), (10.0, 8.0), LineFlags::TWO_SIDED | LineFlags::MOVABLE),
            LevelLine::movable((3.0, 0.0), (3.0, 9.0)),
        ];
        let occ = extract_occluders(&lines);
        assert_eq!(occ.len(), 2);
        assert_eq!(occ.fixed[0].source, 0);
        assert_eq!(occ.movable[0].source, 3);
        assert_eq!(occ.movable[0].start, DVec2::new(3.0, 0.0));
        assert_eq!(occ.movable[0].end, DVec2::new(3.0, 9.0));
    }

    #[test]
    fn non_finite_lines_are_dropped() {
        let lines = [
            LevelLine::solid((f64::NAN, 0.0), (10.0, 0.0)),
            LevelLine::solid((0.0, 0.0), (f64::INFINITY, 0.0)),
            LevelLine::solid((0.0, 0.0), (1.0, 1.0)),
        ];
        let occ = extract_occluders(&lines);
        assert_eq!(occ.fixed.len(), 1);
        assert_eq!(occ.fixed[0].source, 2);
    }

    #[test]
    fn level_without_occluders_builds_empty_tree() {
        let level = Level::from_lines(vec![LevelLine::two_sided((0.0, 0.0), (1.0, 0.0))]);
        let tree = build_tree(&level);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }
}
