// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Umbra Tree: a flat AABB tree over 2D wall segments for light occlusion.
//!
//! Umbra Tree answers one question many times per frame: is the straight line between
//! two points blocked by a wall?
//!
//! - Build once per level from solid wall segments, split into a static half and a
//!   movable half joined under one root.
//! - Query with [`OcclusionTree::ray_test`], which returns the fraction along the ray
//!   of the nearest blocking wall (`1.0` for none).
//! - Call [`OcclusionTree::update`] once per frame to refit the boxes above movable
//!   walls that moved, then re-upload only the dynamic suffix of the buffers.
//!
//! Nodes and segments live in two index-addressed arrays of `#[repr(C)]` records, so
//! the same data can be uploaded to the GPU as-is; see the [`buffer`] module.
//!
//! # Example
//!
//! ```rust
//! use glam::{DVec2, DVec3};
//! use umbra_tree::{Occluder, OcclusionTree};
//!
//! let walls = [Occluder::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), 0)];
//! let door = [Occluder::new(DVec2::new(0.0, 20.0), DVec2::new(10.0, 20.0), 1)];
//! let mut tree = OcclusionTree::build(&walls, &door);
//!
//! let t = tree.ray_test(DVec3::new(5.0, -5.0, 0.0), DVec3::new(5.0, 5.0, 0.0));
//! assert!((t - 0.5).abs() < 1e-9);
//!
//! // The door blocks halfway along this ray.
//! let (light, target) = (DVec3::new(5.0, 10.0, 0.0), DVec3::new(5.0, 30.0, 0.0));
//! assert!(tree.is_occluded(light, target));
//!
//! // Slide the door sideways and refit.
//! let moved = |line: u32| {
//!     (line == 1).then(|| (DVec2::new(40.0, 20.0), DVec2::new(50.0, 20.0)))
//! };
//! assert!(tree.update(&moved));
//! assert_eq!(tree.ray_test(light, target), 1.0);
//! ```
//!
//! ## Threading
//!
//! Queries take `&self` and never mutate, so any number of threads may trace at once.
//! [`OcclusionTree::update`] takes `&mut self`; run it once per frame before tracing.
//!
//! ## Limits
//!
//! Traversal uses a fixed stack of [`MAX_TRACE_DEPTH`] entries. Branches beyond it
//! are dropped rather than growing the stack, so a pathologically deep tree can miss
//! occluders. Heights are ignored: walls block at every Z.

#![no_std]

extern crate alloc;

pub mod buffer;
pub mod build;
pub mod query;
pub mod tree;
pub mod types;
pub mod update;
pub mod validate;

pub use buffer::BufferRange;
pub use build::TreeBuilder;
pub use query::{MAX_TRACE_DEPTH, TraceConfig};
pub use tree::{OcclusionTree, TreeStats};
pub use types::{Aabb, GpuNode, GpuSegment, NO_INDEX, NodeIndex, NodeKind, Occluder};
pub use update::OccluderSource;
pub use validate::TreeError;
