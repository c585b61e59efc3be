// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene --heading-base-level=0

//! Understory Scene: an interactive node hierarchy for input routing.
//!
//! This crate models the part of a scene graph that pointer routing needs and nothing more:
//!
//! - A hierarchy of nodes with parent links, addressed by generational [`NodeId`]s.
//! - A [`Capabilities`] bitmask per node, declaring which pointer events it handles
//!   (enter, exit, hover, click, pointer down/up, drag family, drop, scroll, select).
//! - Picking metadata: a layer for [`LayerMask`] filters and [`SelectionFlags`] for
//!   ray versus direct picking.
//! - The single global selection slot.
//!
//! It does not own geometry, transforms, or rendering. Hosts mirror their own
//! widget tree into a [`Scene`] and keep it in sync as nodes come and go.
//!
//! ## Capability lookups
//!
//! Capabilities are resolved once, when a node is inserted (or explicitly
//! updated with [`Scene::set_capabilities`]). Routing then uses cheap bitmask tests:
//!
//! - [`Scene::has`]: does this node handle any of these events?
//! - [`Scene::handler`]: nearest ancestor-or-self that handles them.
//! - [`Scene::ancestors`]: the bubbling path, nearest first.
//!
//! ## Stale ids
//!
//! Removing a node makes its id (and those of its subtree) stale. Every query
//! treats stale ids as absent, so a router holding ids from a previous frame
//! degrades to "no target" instead of failing.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod scene;
mod types;

pub use error::SceneError;
pub use scene::{Ancestors, Scene};
pub use types::{Capabilities, LayerMask, NodeId, SceneNode, SelectionFlags};
