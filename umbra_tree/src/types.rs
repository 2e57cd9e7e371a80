// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive records shared by the builder, the query engine and the updater.
//!
//! [`GpuNode`] and [`GpuSegment`] are the exact records uploaded to the GPU, so their
//! layout is fixed: `#[repr(C)]`, 4-byte fields only, explicit padding.

use bytemuck::{Pod, Zeroable};
use glam::{DVec2, Vec2};

/// Axis-aligned bounding box in the world plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum x (left)
    pub left: f32,
    /// Minimum y (top)
    pub top: f32,
    /// Maximum x (right)
    pub right: f32,
    /// Maximum y (bottom)
    pub bottom: f32,
}

impl Aabb {
    /// The identity for [`Aabb::union`]; contains nothing.
    pub const EMPTY: Self = Self {
        left: f32::INFINITY,
        top: f32::INFINITY,
        right: f32::NEG_INFINITY,
        bottom: f32::NEG_INFINITY,
    };

    /// Create a new AABB from its edges.
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Smallest box containing both points.
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x, max.y)
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Whether the point lies inside or on the edge of this box.
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.left <= p.x && p.x <= self.right && self.top <= p.y && p.y <= self.bottom
    }

    /// True if the box is inverted (contains nothing). Degenerate boxes with zero
    /// width or height are not empty: axis-aligned walls produce them.
    pub fn is_empty(&self) -> bool {
        self.right < self.left || self.bottom < self.top
    }

    /// Width and height.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.right - self.left, self.bottom - self.top)
    }
}

/// Index of a node in [`OcclusionTree`](crate::OcclusionTree)'s node array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Node records address children with 32-bit indices."
    )]
    pub(crate) const fn new(i: usize) -> Self {
        Self(i as u32)
    }

    /// Position in the node array.
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    #[allow(
        clippy::cast_possible_wrap,
        reason = "Node records address children with 32-bit indices."
    )]
    const fn to_record(self) -> i32 {
        self.0 as i32
    }

    #[allow(
        clippy::cast_sign_loss,
        reason = "Only called on values already checked to be non-negative."
    )]
    const fn from_record(v: i32) -> Option<Self> {
        if v < 0 { None } else { Some(Self(v as u32)) }
    }
}

/// Decoded shape of a [`GpuNode`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Bounds exactly one segment.
    Leaf {
        /// Slot in the segment array.
        segment: usize,
    },
    /// Bounds two child subtrees.
    Internal {
        /// First child.
        left: NodeIndex,
        /// Second child.
        right: NodeIndex,
    },
}

/// Sentinel stored in [`GpuNode`] index fields that do not apply.
pub const NO_INDEX: i32 = -1;

/// One tree node as laid out in the GPU node buffer (32 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuNode {
    /// Bounding box left edge.
    pub left: f32,
    /// Bounding box top edge.
    pub top: f32,
    /// Bounding box right edge.
    pub right: f32,
    /// Bounding box bottom edge.
    pub bottom: f32,
    /// First child, or [`NO_INDEX`] for a leaf.
    pub left_node: i32,
    /// Second child, or [`NO_INDEX`] for a leaf.
    pub right_node: i32,
    /// Segment slot, or [`NO_INDEX`] for an internal node.
    pub segment: i32,
    /// Keeps the record 16-byte aligned for std430 buffers.
    pub padding: i32,
}

impl GpuNode {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "Segment slots are 32-bit in the GPU layout."
    )]
    pub(crate) fn leaf(bounds: Aabb, segment: usize) -> Self {
        Self {
            left: bounds.left,
            top: bounds.top,
            right: bounds.right,
            bottom: bounds.bottom,
            left_node: NO_INDEX,
            right_node: NO_INDEX,
            segment: segment as i32,
            padding: 0,
        }
    }

    pub(crate) fn internal(bounds: Aabb, left: NodeIndex, right: NodeIndex) -> Self {
        Self {
            left: bounds.left,
            top: bounds.top,
            right: bounds.right,
            bottom: bounds.bottom,
            left_node: left.to_record(),
            right_node: right.to_record(),
            segment: NO_INDEX,
            padding: 0,
        }
    }

    /// The node's bounding box.
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.left, self.top, self.right, self.bottom)
    }

    pub(crate) fn set_bounds(&mut self, bounds: Aabb) {
        self.left = bounds.left;
        self.top = bounds.top;
        self.right = bounds.right;
        self.bottom = bounds.bottom;
    }

    /// Decode the node's shape. Returns `None` for a record that is neither a
    /// well-formed leaf nor a well-formed internal node.
    #[allow(
        clippy::cast_sign_loss,
        reason = "Only called on values already checked to be non-negative."
    )]
    pub fn kind(&self) -> Option<NodeKind> {
        let left = NodeIndex::from_record(self.left_node);
        let right = NodeIndex::from_record(self.right_node);
        match (self.segment, left, right) {
            (s, None, None) if s >= 0 => Some(NodeKind::Leaf {
                segment: s as usize,
            }),
            (NO_INDEX, Some(left), Some(right)) => Some(NodeKind::Internal { left, right }),
            _ => None,
        }
    }
}

/// One occluding segment as laid out in the GPU segment buffer (16 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuSegment {
    /// Origin x.
    pub x: f32,
    /// Origin y.
    pub y: f32,
    /// Direction x (end minus origin).
    pub dx: f32,
    /// Direction y (end minus origin).
    pub dy: f32,
}

impl GpuSegment {
    /// Segment running from `start` to `end`.
    pub fn from_endpoints(start: DVec2, end: DVec2) -> Self {
        let origin = start.as_vec2();
        let dir = (end - start).as_vec2();
        Self {
            x: origin.x,
            y: origin.y,
            dx: dir.x,
            dy: dir.y,
        }
    }

    /// Origin point.
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Direction vector.
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }
}

/// A solid wall segment handed to the builder.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Occluder {
    /// First endpoint.
    pub start: DVec2,
    /// Second endpoint.
    pub end: DVec2,
    /// Index of the level line this segment came from.
    pub source: u32,
}

impl Occluder {
    /// Create an occluder for level line `source`.
    pub const fn new(start: DVec2, end: DVec2, source: u32) -> Self {
        Self { start, end, source }
    }

    /// Record stored in the segment array.
    pub fn segment(&self) -> GpuSegment {
        GpuSegment::from_endpoints(self.start, self.end)
    }

    /// Box spanned by the two endpoints; this is the leaf box.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.start.as_vec2(), self.end.as_vec2())
    }

    /// Midpoint used to pick a side during partitioning.
    pub fn centroid(&self) -> Vec2 {
        ((self.start + self.end) * 0.5).as_vec2()
    }
}
