// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_ray_events --heading-base-level=0

//! Understory Ray Events: a deterministic multi-pointer UI event router.
//!
//! A classic UI event system assumes one mouse. Tracked-device UIs have
//! several pointers at once (two controller rays, a gaze ray, a desktop
//! mouse), each needing its own hover, press, click, drag, and scroll state,
//! all resolved against one shared interactive hierarchy.
//!
//! [`Router`] owns one state machine per pointer and runs them once per frame:
//!
//! - **Hit testing** through host-provided [`Raycaster`]s.
//! - **Hover**: exit/enter/hover transitions computed against the common
//!   ancestor of the old and new targets, exits strictly before enters.
//! - **Press, click, drag**: press handler resolution, click soundness
//!   (press and release must resolve to the same handler and no drag may
//!   have started), a configurable double-click window, a drag threshold,
//!   and drop on the node under the pointer.
//! - **Scroll** bubbling, plus a debounced "scroll available" hint in a
//!   [`FeedbackQueue`](understory_feedback::FeedbackQueue).
//! - **Gating**: blocked pointers and host validity predicates lose their
//!   hover but still finish held drags.
//!
//! The node hierarchy lives in an [`understory_scene::Scene`]; events name
//! nodes by [`NodeId`](understory_scene::NodeId) and are only delivered to
//! nodes whose [`Capabilities`](understory_scene::Capabilities) include the
//! event kind. Events are buffered in emission order rather than delivered
//! by callback; the host drains them after each tick and dispatches to its
//! own widgets.
//!
//! ## Minimal example
//!
//! ```rust
//! use core::time::Duration;
//! use glam::Vec3;
//! use kurbo::Point;
//! use understory_ray_events::{
//!     EventKind, HitQuery, RayId, RaycastHit, Raycaster, Router,
//! };
//! use understory_scene::{Capabilities, NodeId, Scene, SceneNode};
//!
//! // A raycaster that always hits one node.
//! struct Always(NodeId);
//! impl Raycaster for Always {
//!     fn raycast(&mut self, _: &Scene, _: &HitQuery<'_>, out: &mut Vec<RaycastHit>) {
//!         out.push(RaycastHit {
//!             node: self.0,
//!             distance: 1.0,
//!             screen_position: Point::ZERO,
//!             world_position: Vec3::ZERO,
//!         });
//!     }
//! }
//!
//! let mut scene = Scene::new();
//! let button = scene
//!     .insert(None, SceneNode::with_capabilities(Capabilities::CLICK))
//!     .unwrap();
//!
//! let mut router = Router::new();
//! let ray = router.register_ray(RayId(1), None);
//! let mut caster = Always(button);
//!
//! router.ray_source_mut(ray).unwrap().set_select(true);
//! router.tick(&mut scene, &mut [&mut caster], Duration::from_millis(0));
//! router.ray_source_mut(ray).unwrap().set_select(false);
//! router.tick(&mut scene, &mut [&mut caster], Duration::from_millis(16));
//!
//! let clicks: Vec<_> = router
//!     .drain_events()
//!     .filter(|e| e.kind == EventKind::Click)
//!     .collect();
//! assert_eq!(clicks.len(), 1);
//! assert_eq!(clicks[0].node, button);
//! ```
//!
//! ## Logging
//!
//! The router logs through [`tracing`]: registration and teardown at `debug`,
//! individual deliveries and hover transitions at `trace`. Install a
//! subscriber in the host to see them.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod dispatch;
mod error;
mod hit;
mod hover;
mod press;
mod record;
mod router;
mod scroll;
mod source;
mod types;

pub use config::RouterConfig;
pub use error::ConfigError;
pub use hit::{Aim, EventCamera, HitQuery, QueryTarget, Ray, RaycastHit, Raycaster};
pub use record::{PointerEventData, PointerEventRecord, RaycastResult};
pub use router::{Router, ValidityPredicate};
pub use source::{InputSource, RaySource, ScreenSource, SelectButton};
pub use types::{EventKind, InputActions, PointerId, RayEvent, RayHandle, RayId};
