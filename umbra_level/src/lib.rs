// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Umbra Level: Kurbo-native level lines for an Umbra occlusion tree.
//!
//! This crate sits between a level loader and [`umbra_tree`]:
//!
//! - [`LevelLine`] pairs a [`kurbo::Line`] with [`LineFlags`] saying whether the line
//!   is passable and whether it belongs to a movable group.
//! - [`extract_occluders`] keeps the one-sided lines and splits them into fixed and
//!   movable sets, remembering each line's index.
//! - [`Level`] owns the live lines, moves groups of them with [`kurbo::Affine`]
//!   transforms, and serves as the [`umbra_tree::OccluderSource`] the tree refits
//!   against each frame.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Affine, Vec2};
//! use glam::DVec3;
//! use umbra_level::{Level, LevelLine, build_tree};
//!
//! let mut level = Level::new();
//! level.push(LevelLine::solid((0.0, 0.0), (128.0, 0.0)));
//! level.push(LevelLine::two_sided((0.0, 64.0), (128.0, 64.0)));
//! let door = level.push(LevelLine::movable((48.0, 96.0), (80.0, 96.0)));
//! let mut tree = build_tree(&level);
//!
//! let light = DVec3::new(64.0, 32.0, 48.0);
//! let receiver = DVec3::new(64.0, 128.0, 0.0);
//! assert!(tree.is_occluded(light, receiver));
//!
//! // Slide the door open and refit.
//! level.transform_lines([door], Affine::translate(Vec2::new(64.0, 0.0)));
//! assert!(tree.update(&level));
//! assert!(!tree.is_occluded(light, receiver));
//! ```

#![no_std]

extern crate alloc;

mod util;

pub mod extract;
pub mod level;
pub mod types;

pub use extract::{Occluders, build_tree, extract_occluders};
pub use level::Level;
pub use types::{LevelLine, LineFlags};
