// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte views of the node and segment arrays for GPU upload.
//!
//! After [`OcclusionTree::update`] only the dynamic suffix of each array can have
//! changed, so a renderer can re-upload just [`OcclusionTree::dynamic_nodes`] and
//! [`OcclusionTree::dynamic_segments`]. The node joining the two halves is appended
//! last and is therefore part of the dynamic node suffix.

use core::ops::Range;

use crate::tree::OcclusionTree;
use crate::types::{GpuNode, GpuSegment};

/// A byte range inside one of the upload buffers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferRange {
    /// Offset from the start of the buffer, in bytes.
    pub offset: usize,
    /// Length, in bytes.
    pub size: usize,
}

impl BufferRange {
    fn of<T>(start: usize, len: usize) -> Self {
        let stride = size_of::<T>();
        Self {
            offset: start * stride,
            size: (len - start) * stride,
        }
    }

    /// The range as a slice index.
    pub fn as_range(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }

    /// True if the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl OcclusionTree {
    /// The whole node array as bytes.
    pub fn nodes_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// The whole segment array as bytes.
    pub fn segments_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.segments)
    }

    /// Number of node records.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Where the movable nodes sit in [`nodes_bytes`](Self::nodes_bytes).
    pub fn dynamic_nodes(&self) -> BufferRange {
        BufferRange::of::<GpuNode>(self.dynamic_node_start, self.nodes.len())
    }

    /// Where the movable segments sit in [`segments_bytes`](Self::segments_bytes).
    pub fn dynamic_segments(&self) -> BufferRange {
        BufferRange::of::<GpuSegment>(self.dynamic_segment_start, self.segments.len())
    }

    /// Bytes of the movable node suffix.
    pub fn dynamic_nodes_bytes(&self) -> &[u8] {
        &self.nodes_bytes()[self.dynamic_nodes().as_range()]
    }

    /// Bytes of the movable segment suffix.
    pub fn dynamic_segments_bytes(&self) -> &[u8] {
        &self.segments_bytes()[self.dynamic_segments().as_range()]
    }
}
