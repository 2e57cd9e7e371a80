// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray occlusion queries.
//!
//! A query walks the tree with a fixed 32-entry stack. Nodes whose box the ray
//! misses are skipped, leaves are intersected exactly, and the smallest hit
//! fraction wins. When two segments are hit at numerically equal fractions the
//! one reported depends on traversal order; only the value is meaningful.

use glam::{DVec2, DVec3};

use crate::tree::OcclusionTree;
use crate::types::{Aabb, GpuSegment, NodeKind};

/// Maximum number of pending nodes during a traversal. A branch that would need
/// more is dropped, so trees deeper than this may report false negatives.
pub const MAX_TRACE_DEPTH: usize = 32;

/// Tunables for [`OcclusionTree::ray_test_with`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TraceConfig {
    /// Rays whose squared planar length is below this never hit anything.
    pub min_length_squared: f64,
    /// Segments whose direction is this close to parallel with the ray are ignored.
    pub parallel_epsilon: f64,
    /// Half the Z thickness of the slab node boxes are extruded into.
    pub slab_half_thickness: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            min_length_squared: 1.0,
            parallel_epsilon: 1e-7,
            slab_half_thickness: 1.0,
        }
    }
}

/// A ray flattened onto the world plane, with the terms shared by every leaf test.
#[derive(Copy, Clone, Debug)]
struct PlanarRay {
    start: DVec2,
    end: DVec2,
    delta: DVec2,
    normal: DVec2,
    // Signed distance of the ray's line from the origin along `normal`.
    offset: f64,
    length_squared: f64,
}

impl PlanarRay {
    fn new(start: DVec3, end: DVec3) -> Self {
        let start = start.truncate();
        let end = end.truncate();
        let delta = end - start;
        let normal = DVec2::new(delta.y, -delta.x);
        Self {
            start,
            end,
            delta,
            normal,
            offset: normal.dot(start),
            length_squared: delta.length_squared(),
        }
    }

    /// Separating axis test between the ray (as a segment at z = 0) and the box
    /// extruded to `[-half_thickness, half_thickness]` on Z.
    fn overlaps(&self, aabb: &Aabb, half_thickness: f64) -> bool {
        let min = DVec3::new(aabb.left.into(), aabb.top.into(), -half_thickness);
        let max = DVec3::new(aabb.right.into(), aabb.bottom.into(), half_thickness);
        let start = self.start.extend(0.0);
        let end = self.end.extend(0.0);

        let mid = (start + end) * 0.5;
        let half = end - mid;
        let extents = (max - min) * 0.5;
        let c = mid - (max + min) * 0.5;
        let v = half.abs();

        if c.abs().cmpgt(v + extents).any() {
            return false;
        }

        let cross = c.cross(half).abs();
        let limit = DVec3::new(
            extents.y * v.z + extents.z * v.y,
            extents.x * v.z + extents.z * v.x,
            extents.x * v.y + extents.y * v.x,
        );
        !cross.cmpgt(limit).any()
    }

    /// Fraction along the ray where it crosses `segment`, or 1.0 for no crossing.
    fn intersect(&self, segment: &GpuSegment, epsilon: f64) -> f64 {
        let origin = segment.origin().as_dvec2();
        let dir = segment.direction().as_dvec2();

        let den = self.normal.dot(dir);
        if den.abs() <= epsilon {
            return 1.0;
        }
        let t_segment = (self.offset - self.normal.dot(origin)) / den;
        if !(0.0..=1.0).contains(&t_segment) {
            return 1.0;
        }
        let hit = origin + dir * t_segment;
        let t = self.delta.dot(hit - self.start) / self.length_squared;
        if t > 0.0 { t.min(1.0) } else { 1.0 }
    }
}

impl OcclusionTree {
    /// Fraction in `[0, 1]` along the segment from `start` to `end` at which the
    /// nearest wall blocks it; `1.0` means nothing blocks it.
    ///
    /// Only the x and y coordinates take part: walls are treated as infinitely tall.
    pub fn ray_test(&self, start: DVec3, end: DVec3) -> f64 {
        self.ray_test_with(start, end, &TraceConfig::default())
    }

    /// [`ray_test`](Self::ray_test) with explicit tunables.
    pub fn ray_test_with(&self, start: DVec3, end: DVec3, config: &TraceConfig) -> f64 {
        let Some(root) = self.root else {
            return 1.0;
        };
        let ray = PlanarRay::new(start, end);
        if ray.length_squared.is_nan() || ray.length_squared < config.min_length_squared {
            return 1.0;
        }

        let mut hit_fraction = 1.0_f64;
        let mut stack = [0_usize; MAX_TRACE_DEPTH];
        stack[0] = root.get();
        let mut len = 1;
        while len > 0 {
            let Some(node) = self.nodes.get(stack[len - 1]) else {
                len -= 1;
                continue;
            };
            if !ray.overlaps(&node.bounds(), config.slab_half_thickness) {
                len -= 1;
                continue;
            }
            match node.kind() {
                Some(NodeKind::Leaf { segment }) => {
                    if let Some(segment) = self.segments.get(segment) {
                        hit_fraction =
                            hit_fraction.min(ray.intersect(segment, config.parallel_epsilon));
                    }
                    len -= 1;
                }
                Some(NodeKind::Internal { left, right }) if len < MAX_TRACE_DEPTH => {
                    stack[len - 1] = left.get();
                    stack[len] = right.get();
                    len += 1;
                }
                // Stack exhausted or malformed record: drop this branch.
                _ => len -= 1,
            }
        }
        hit_fraction
    }

    /// Whether any wall blocks the segment from `start` to `end`.
    pub fn is_occluded(&self, start: DVec3, end: DVec3) -> bool {
        self.ray_test(start, end) < 1.0
    }
}
