// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for level lines: flags and line records.

use kurbo::{Line, Point};

bitflags::bitflags! {
    /// Per-line flags relevant to occlusion.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LineFlags: u32 {
        /// Line has open space on both sides; light passes through it.
        const TWO_SIDED = 0b0000_0001;
        /// Line belongs to a group of geometry that moves during play (doors,
        /// sliding walls, rotating platforms).
        const MOVABLE   = 0b0000_0010;
    }
}

/// One line of level geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelLine {
    /// World-space endpoints.
    pub line: Line,
    /// Occlusion-relevant flags.
    pub flags: LineFlags,
}

impl LevelLine {
    /// Create a line with explicit flags.
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>, flags: LineFlags) -> Self {
        Self {
            line: Line::new(p0, p1),
            flags,
        }
    }

    /// A fixed, one-sided wall.
    pub fn solid(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self::new(p0, p1, LineFlags::empty())
    }

    /// A one-sided wall that belongs to a movable group.
    pub fn movable(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self::new(p0, p1, LineFlags::MOVABLE)
    }

    /// A passable line; never an occluder.
    pub fn two_sided(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self::new(p0, p1, LineFlags::TWO_SIDED)
    }

    /// Whether the line blocks light.
    pub fn is_occluder(&self) -> bool {
        !self.flags.contains(LineFlags::TWO_SIDED)
    }

    /// Whether the line belongs to a movable group.
    pub fn is_movable(&self) -> bool {
        self.flags.contains(LineFlags::MOVABLE)
    }
}
