// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node/segment store.

use alloc::vec;
use alloc::vec::Vec;

use crate::build::TreeBuilder;
use crate::types::{GpuNode, GpuSegment, NodeIndex, NodeKind, Occluder};

/// A built occlusion tree: flat node and segment arrays plus the bookkeeping needed
/// to trace segments back to level lines and to find the movable suffix.
///
/// Nodes reference children and segments only by index. The static half is built
/// first, the dynamic half is appended after it, and when both exist one extra node
/// joining the two sub-roots is appended last.
#[derive(Clone, Default)]
pub struct OcclusionTree {
    pub(crate) nodes: Vec<GpuNode>,
    pub(crate) segments: Vec<GpuSegment>,
    pub(crate) sources: Vec<u32>,
    pub(crate) static_root: Option<NodeIndex>,
    pub(crate) dynamic_root: Option<NodeIndex>,
    pub(crate) root: Option<NodeIndex>,
    pub(crate) dynamic_node_start: usize,
    pub(crate) dynamic_segment_start: usize,
}

impl core::fmt::Debug for OcclusionTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OcclusionTree")
            .field("nodes", &self.nodes.len())
            .field("segments", &self.segments.len())
            .field("static_root", &self.static_root)
            .field("dynamic_root", &self.dynamic_root)
            .field("root", &self.root)
            .field("dynamic_node_start", &self.dynamic_node_start)
            .field("dynamic_segment_start", &self.dynamic_segment_start)
            .finish_non_exhaustive()
    }
}

/// Shape summary returned by [`OcclusionTree::stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes reachable from the root.
    pub nodes: usize,
    /// Leaves reachable from the root.
    pub leaves: usize,
    /// Longest root-to-leaf path, counted in nodes.
    pub max_depth: usize,
}

impl OcclusionTree {
    /// Build a tree from the static and the movable occluders.
    ///
    /// Either set may be empty; a tree with no occluders at all answers every query
    /// with "no hit".
    pub fn build(fixed: &[Occluder], movable: &[Occluder]) -> Self {
        let mut builder = TreeBuilder::with_capacity(fixed.len() + movable.len());
        let static_root = builder.build_static(fixed);
        let dynamic_root = builder.build_dynamic(movable);
        builder.merge(static_root, dynamic_root);
        let tree = builder.finish();
        log::debug!(
            "built occlusion tree: {} static + {} dynamic segments, {:?}",
            tree.dynamic_segment_start,
            tree.segments.len() - tree.dynamic_segment_start,
            tree.stats()
        );
        tree
    }

    /// Overall root, joining the static and dynamic halves.
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Root of the subtree over static segments.
    pub fn static_root(&self) -> Option<NodeIndex> {
        self.static_root
    }

    /// Root of the subtree over movable segments.
    pub fn dynamic_root(&self) -> Option<NodeIndex> {
        self.dynamic_root
    }

    /// All node records, in array order.
    pub fn nodes(&self) -> &[GpuNode] {
        &self.nodes
    }

    /// All segment records, in slot order.
    pub fn segments(&self) -> &[GpuSegment] {
        &self.segments
    }

    /// A single node record.
    pub fn node(&self, index: NodeIndex) -> Option<&GpuNode> {
        self.nodes.get(index.get())
    }

    /// A single segment record.
    pub fn segment(&self, slot: usize) -> Option<&GpuSegment> {
        self.segments.get(slot)
    }

    /// Level line that segment `slot` was extracted from.
    pub fn source_line(&self, slot: usize) -> Option<u32> {
        self.sources.get(slot).copied()
    }

    /// First node of the dynamic suffix.
    pub fn dynamic_node_start(&self) -> usize {
        self.dynamic_node_start
    }

    /// First segment slot of the dynamic suffix.
    pub fn dynamic_segment_start(&self) -> usize {
        self.dynamic_segment_start
    }

    /// Number of segments in the tree.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if the tree holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walk the tree from the root and summarize its shape.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let Some(root) = self.root else {
            return stats;
        };
        let mut stack = vec![(root, 1_usize)];
        while let Some((index, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(index.get()) else {
                continue;
            };
            stats.nodes += 1;
            stats.max_depth = stats.max_depth.max(depth);
            match node.kind() {
                Some(NodeKind::Leaf { .. }) => stats.leaves += 1,
                Some(NodeKind::Internal { left, right }) => {
                    // Corrupt trees may loop; never walk more records than exist.
                    if stats.nodes <= self.nodes.len() {
                        stack.push((left, depth + 1));
                        stack.push((right, depth + 1));
                    }
                }
                None => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn wall(x0: f64, y0: f64, x1: f64, y1: f64, source: u32) -> Occluder {
        Occluder::new(DVec2::new(x0, y0), DVec2::new(x1, y1), source)
    }

    #[test]
    fn empty_tree_has_no_root() {
        let tree = OcclusionTree::build(&[], &[]);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.stats(), TreeStats::default());
    }

    #[test]
    fn halves_are_joined_under_one_root() {
        let fixed = [wall(0.0, 0.0, 10.0, 0.0, 0), wall(0.0, 10.0, 10.0, 10.0, 1)];
        let movable = [wall(5.0, 0.0, 5.0, 10.0, 7)];
        let tree = OcclusionTree::build(&fixed, &movable);

        let root = tree.root().expect("root exists");
        let static_root = tree.static_root().expect("static half exists");
        let dynamic_root = tree.dynamic_root().expect("dynamic half exists");
        assert_eq!(
            tree.node(root).and_then(GpuNode::kind),
            Some(NodeKind::Internal {
                left: static_root,
                right: dynamic_root
            })
        );
        assert_eq!(tree.dynamic_segment_start(), 2);
        assert_eq!(tree.source_line(2), Some(7));
        assert!(static_root.get() < tree.dynamic_node_start());
        assert!(dynamic_root.get() >= tree.dynamic_node_start());

        let stats = tree.stats();
        assert_eq!(stats.leaves, 3);
        assert_eq!(stats.nodes, 5);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn single_half_is_the_root() {
        let movable = [wall(0.0, 0.0, 1.0, 1.0, 4)];
        let tree = OcclusionTree::build(&[], &movable);
        assert_eq!(tree.static_root(), None);
        assert_eq!(tree.root(), tree.dynamic_root());
        assert_eq!(tree.dynamic_node_start(), 0);
        assert_eq!(tree.dynamic_segment_start(), 0);

        let tree = OcclusionTree::build(&movable, &[]);
        assert_eq!(tree.root(), tree.static_root());
        assert_eq!(tree.dynamic_node_start(), tree.nodes().len());
    }
}
