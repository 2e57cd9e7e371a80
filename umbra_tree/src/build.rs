// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Top-down tree construction.
//!
//! Each range of segments is split by a plane through the mean of their midpoints,
//! perpendicular to the longer side of their combined box. If every midpoint lands
//! on the same side the other axis is tried, and if that fails too the range is cut
//! in half by position so the recursion always makes progress.

use alloc::vec::Vec;

use glam::Vec2;

use crate::tree::OcclusionTree;
use crate::types::{Aabb, GpuNode, GpuSegment, NodeIndex, Occluder};

/// Incremental builder for an [`OcclusionTree`].
///
/// Call [`build_static`](Self::build_static), then [`build_dynamic`](Self::build_dynamic),
/// then [`merge`](Self::merge) and [`finish`](Self::finish).
/// [`OcclusionTree::build`] does exactly that. If `merge` is skipped, `finish`
/// joins whichever halves were built.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<GpuNode>,
    segments: Vec<GpuSegment>,
    sources: Vec<u32>,
    bounds: Vec<Aabb>,
    centroids: Vec<Vec2>,
    // Front half at [0, n), back half at [n, 2n) for a range of n slots.
    scratch: Vec<u32>,
    static_root: Option<NodeIndex>,
    dynamic_root: Option<NodeIndex>,
    root: Option<NodeIndex>,
    merged: bool,
    dynamic_node_start: Option<usize>,
    dynamic_segment_start: Option<usize>,
}

impl TreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `segments` segments.
    pub fn with_capacity(segments: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(segments * 2),
            segments: Vec::with_capacity(segments),
            sources: Vec::with_capacity(segments),
            bounds: Vec::with_capacity(segments),
            centroids: Vec::with_capacity(segments),
            ..Self::default()
        }
    }

    /// Build the subtree over segments that never move.
    ///
    /// Returns `None` if `occluders` is empty.
    pub fn build_static(&mut self, occluders: &[Occluder]) -> Option<NodeIndex> {
        debug_assert!(
            self.dynamic_segment_start.is_none(),
            "the static half must be built before the dynamic half"
        );
        debug_assert!(self.static_root.is_none(), "static half built twice");
        self.static_root = self.build_subtree(occluders);
        self.static_root
    }

    /// Build the subtree over movable segments, appended after the static half so
    /// that it forms a contiguous suffix of both arrays.
    ///
    /// Returns `None` if `occluders` is empty.
    pub fn build_dynamic(&mut self, occluders: &[Occluder]) -> Option<NodeIndex> {
        debug_assert!(
            self.dynamic_segment_start.is_none(),
            "dynamic half built twice"
        );
        self.dynamic_node_start = Some(self.nodes.len());
        self.dynamic_segment_start = Some(self.segments.len());
        self.dynamic_root = self.build_subtree(occluders);
        self.dynamic_root
    }

    /// Join two sub-roots under one overall root.
    ///
    /// With both present a new node is appended whose children are the two
    /// sub-roots; with one present that one is the overall root.
    pub fn merge(
        &mut self,
        static_root: Option<NodeIndex>,
        dynamic_root: Option<NodeIndex>,
    ) -> Option<NodeIndex> {
        self.merged = true;
        self.root = match (static_root, dynamic_root) {
            (Some(s), Some(d)) => {
                let bounds = self.nodes[s.get()]
                    .bounds()
                    .union(&self.nodes[d.get()].bounds());
                Some(self.push_node(GpuNode::internal(bounds, s, d)))
            }
            (Some(root), None) | (None, Some(root)) => Some(root),
            (None, None) => None,
        };
        self.root
    }

    /// Hand the arrays over to an [`OcclusionTree`].
    pub fn finish(mut self) -> OcclusionTree {
        if !self.merged {
            self.merge(self.static_root, self.dynamic_root);
        }
        let segments = self.segments.len();
        OcclusionTree {
            dynamic_node_start: self
                .dynamic_node_start
                .unwrap_or(self.nodes.len())
                .min(self.nodes.len()),
            dynamic_segment_start: self.dynamic_segment_start.unwrap_or(segments),
            nodes: self.nodes,
            segments: self.segments,
            sources: self.sources,
            static_root: self.static_root,
            dynamic_root: self.dynamic_root,
            root: self.root,
        }
    }

    fn build_subtree(&mut self, occluders: &[Occluder]) -> Option<NodeIndex> {
        let first = self.segments.len();
        for occluder in occluders {
            self.segments.push(occluder.segment());
            self.sources.push(occluder.source);
            self.bounds.push(occluder.bounds());
            self.centroids.push(occluder.centroid());
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Segment slots are 32-bit in the GPU layout."
        )]
        let mut slots: Vec<u32> = (first..self.segments.len()).map(|s| s as u32).collect();
        self.generate_node(&mut slots)
    }

    fn push_node(&mut self, node: GpuNode) -> NodeIndex {
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        index
    }

    fn generate_node(&mut self, slots: &mut [u32]) -> Option<NodeIndex> {
        let (&first, _) = slots.split_first()?;
        if slots.len() == 1 {
            let bounds = self.bounds[first as usize];
            return Some(self.push_node(GpuNode::leaf(bounds, first as usize)));
        }

        let mut bounds = Aabb::EMPTY;
        let mut median = Vec2::ZERO;
        for &slot in slots.iter() {
            bounds = bounds.union(&self.bounds[slot as usize]);
            median += self.centroids[slot as usize];
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "Only used to average midpoints."
        )]
        let count = slots.len() as f32;
        median /= count;

        let front_len = self.partition(slots, median, bounds);
        let (front, back) = slots.split_at_mut(front_len);
        let left = self.generate_node(front)?;
        let right = self.generate_node(back)?;
        let node_bounds = self.nodes[left.get()]
            .bounds()
            .union(&self.nodes[right.get()].bounds());
        Some(self.push_node(GpuNode::internal(node_bounds, left, right)))
    }

    /// Reorder `slots` so that the front side comes first and return its length.
    /// Always returns a value in `1..slots.len()`.
    fn partition(&mut self, slots: &mut [u32], median: Vec2, bounds: Aabb) -> usize {
        let n = slots.len();
        let extent = bounds.size();
        let axes = if extent.y > extent.x {
            [Vec2::Y, Vec2::X]
        } else {
            [Vec2::X, Vec2::Y]
        };

        self.scratch.clear();
        self.scratch.resize(n * 2, 0);
        for axis in axes {
            let offset = -median.dot(axis);
            let mut front = 0;
            let mut back = 0;
            for &slot in slots.iter() {
                let side = self.centroids[slot as usize].dot(axis) + offset;
                if side >= 0.0 {
                    self.scratch[front] = slot;
                    front += 1;
                } else {
                    self.scratch[n + back] = slot;
                    back += 1;
                }
            }
            if front != 0 && back != 0 {
                slots[..front].copy_from_slice(&self.scratch[..front]);
                slots[front..].copy_from_slice(&self.scratch[n..n + back]);
                return front;
            }
        }

        // Every midpoint on one side on both axes: split by position instead.
        n / 2
    }
}
