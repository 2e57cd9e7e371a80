// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural checks for a built or updated tree.

use alloc::vec;
use alloc::vec::Vec;

use crate::tree::OcclusionTree;
use crate::types::{NodeIndex, NodeKind};

/// A violated tree invariant, reported by [`OcclusionTree::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A root index points past the node array.
    #[error("root {0:?} is out of range")]
    RootOutOfRange(NodeIndex),
    /// The overall root does not join the static and dynamic sub-roots.
    #[error("overall root {root:?} does not join the static and dynamic sub-roots")]
    RootMismatch {
        /// The recorded overall root.
        root: Option<NodeIndex>,
    },
    /// A record is neither a leaf nor an internal node.
    #[error("node {node} is neither a leaf nor an internal node")]
    MalformedNode {
        /// Offending node.
        node: usize,
    },
    /// An internal node points past the node array.
    #[error("node {node} references missing child {child}")]
    MissingChild {
        /// Offending node.
        node: usize,
        /// The dangling child index.
        child: usize,
    },
    /// A leaf points past the segment array.
    #[error("leaf {node} references missing segment {segment}")]
    MissingSegment {
        /// Offending leaf.
        node: usize,
        /// The dangling segment slot.
        segment: usize,
    },
    /// A node is reachable along more than one path.
    #[error("node {node} is reachable more than once")]
    SharedNode {
        /// Offending node.
        node: usize,
    },
    /// An internal node's box differs from the union of its children's boxes.
    #[error("node {node} bounds differ from the union of its children")]
    BoundsMismatch {
        /// Offending node.
        node: usize,
    },
    /// A segment is held by no leaf, or by several.
    #[error("segment {segment} is held by {leaves} leaves")]
    SegmentCoverage {
        /// Offending segment slot.
        segment: usize,
        /// How many reachable leaves hold it.
        leaves: usize,
    },
    /// A leaf under one half holds a segment from the other half.
    #[error("segment {segment} sits under the wrong sub-root")]
    WrongHalf {
        /// Offending segment slot.
        segment: usize,
    },
}

impl OcclusionTree {
    /// Check every structural invariant of the tree.
    ///
    /// This walks the whole tree and allocates; it is meant for tests, tools and
    /// debug builds, not for per-frame use.
    pub fn validate(&self) -> Result<(), TreeError> {
        for root in [self.root, self.static_root, self.dynamic_root]
            .into_iter()
            .flatten()
        {
            if root.get() >= self.nodes.len() {
                return Err(TreeError::RootOutOfRange(root));
            }
        }
        let joined = match (self.static_root, self.dynamic_root) {
            (Some(s), Some(d)) => self.root.and_then(|r| self.nodes[r.get()].kind())
                == Some(NodeKind::Internal { left: s, right: d }),
            (Some(only), None) | (None, Some(only)) => self.root == Some(only),
            (None, None) => self.root.is_none(),
        };
        if !joined {
            return Err(TreeError::RootMismatch { root: self.root });
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut coverage = vec![0_usize; self.segments.len()];
        // `Some(true)` once inside the dynamic half, `Some(false)` inside the static one.
        let mut stack: Vec<(NodeIndex, Option<bool>)> =
            self.root.map(|r| (r, None)).into_iter().collect();
        while let Some((index, half)) = stack.pop() {
            let node = index.get();
            if visited[node] {
                return Err(TreeError::SharedNode { node });
            }
            visited[node] = true;
            let half = if Some(index) == self.static_root {
                Some(false)
            } else if Some(index) == self.dynamic_root {
                Some(true)
            } else {
                half
            };
            match self.nodes[node].kind() {
                None => return Err(TreeError::MalformedNode { node }),
                Some(NodeKind::Leaf { segment }) => {
                    if segment >= self.segments.len() {
                        return Err(TreeError::MissingSegment { node, segment });
                    }
                    let in_dynamic = segment >= self.dynamic_segment_start;
                    if half.is_some_and(|dynamic| dynamic != in_dynamic) {
                        return Err(TreeError::WrongHalf { segment });
                    }
                    coverage[segment] += 1;
                }
                Some(NodeKind::Internal { left, right }) => {
                    for child in [left, right] {
                        if child.get() >= self.nodes.len() {
                            return Err(TreeError::MissingChild {
                                node,
                                child: child.get(),
                            });
                        }
                    }
                    let union = self.nodes[left.get()]
                        .bounds()
                        .union(&self.nodes[right.get()].bounds());
                    if self.nodes[node].bounds() != union {
                        return Err(TreeError::BoundsMismatch { node });
                    }
                    stack.push((left, half));
                    stack.push((right, half));
                }
            }
        }

        if let Some((segment, &leaves)) = coverage.iter().enumerate().find(|(_, c)| **c != 1) {
            return Err(TreeError::SegmentCoverage { segment, leaves });
        }
        Ok(())
    }
}
