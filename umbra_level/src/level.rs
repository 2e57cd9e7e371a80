// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The live line set an occlusion tree is built from and refitted against.

use alloc::vec::Vec;

use glam::DVec2;
use kurbo::{Affine, Line};
use umbra_tree::OccluderSource;

use crate::types::LevelLine;
use crate::util::line_endpoints;

/// Ordered collection of level lines, addressed by index.
#[derive(Clone, Debug, Default)]
pub struct Level {
    lines: Vec<LevelLine>,
}

impl Level {
    /// Create an empty level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a level from existing lines.
    pub fn from_lines(lines: Vec<LevelLine>) -> Self {
        Self { lines }
    }

    /// Append a line and return its index.
    pub fn push(&mut self, line: LevelLine) -> usize {
        self.lines.push(line);
        self.lines.len() - 1
    }

    /// All lines, in index order.
    pub fn lines(&self) -> &[LevelLine] {
        &self.lines
    }

    /// A single line.
    pub fn line(&self, index: usize) -> Option<&LevelLine> {
        self.lines.get(index)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if the level has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Move one line. Returns `false` if `index` is out of range.
    pub fn set_line(&mut self, index: usize, line: Line) -> bool {
        match self.lines.get_mut(index) {
            Some(l) => {
                l.line = line;
                true
            }
            None => false,
        }
    }

    /// Apply `transform` to every listed line, e.g. to slide or swing a door.
    ///
    /// Out-of-range indices are ignored.
    pub fn transform_lines(
        &mut self,
        indices: impl IntoIterator<Item = usize>,
        transform: Affine,
    ) {
        for index in indices {
            let Some(l) = self.lines.get_mut(index) else {
                log::warn!("transform_lines: no line {index}");
                continue;
            };
            if !l.is_movable() {
                log::debug!("transform_lines: line {index} is static; the tree will not refit it");
            }
            l.line = Line::new(transform * l.line.p0, transform * l.line.p1);
        }
    }
}

impl OccluderSource for Level {
    fn endpoints(&self, line: u32) -> Option<(DVec2, DVec2)> {
        self.lines.get(line as usize).map(|l| line_endpoints(l.line))
    }
}
