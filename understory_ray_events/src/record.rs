// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pointer event record.
//!
//! Each pointer owns one [`PointerEventRecord`] for its whole registration.
//! The router resets its transient fields every tick instead of reallocating
//! it, and copies [`PointerEventData`] into every emitted event.

use core::time::Duration;

use glam::Vec3;
use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use understory_scene::NodeId;

use crate::types::PointerId;

/// Result of the most recent hit test for a pointer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastResult {
    /// Node that was hit.
    pub node: Option<NodeId>,
    /// Distance along the ray (0 for screen queries that do not report one).
    pub distance: f32,
    /// Hit point in the pointer's 2D event space.
    pub screen_position: Point,
    /// Hit point in world space.
    pub world_position: Vec3,
    /// Index of the raycaster that produced the hit.
    pub raycaster: usize,
}

impl RaycastResult {
    /// Nothing was hit.
    pub const NONE: Self = Self {
        node: None,
        distance: 0.0,
        screen_position: Point::ZERO,
        world_position: Vec3::ZERO,
        raycaster: 0,
    };

    /// Whether something was hit.
    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }
}

impl Default for RaycastResult {
    fn default() -> Self {
        Self::NONE
    }
}

/// Copyable pointer state, delivered with every event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEventData {
    /// Pointer this data belongs to.
    pub pointer: PointerId,
    /// Position in the pointer's 2D event space.
    pub position: Point,
    /// Movement since the previous tick.
    pub delta: Vec2,
    /// Position when select was last pressed.
    pub press_position: Point,
    /// Scroll delta delivered this tick.
    pub scroll_delta: Vec2,
    /// Current hit test result.
    pub current_raycast: RaycastResult,
    /// Hit test result when select was last pressed.
    pub press_raycast: RaycastResult,
    /// Deepest hovered node.
    pub pointer_enter: Option<NodeId>,
    /// Handler that received the current press.
    pub pointer_press: Option<NodeId>,
    /// Node actually under the pointer when the current press began.
    pub raw_pointer_press: Option<NodeId>,
    /// Drag handler resolved at press time.
    pub pointer_drag: Option<NodeId>,
    /// Whether `pointer_drag` has received begin-drag.
    pub dragging: bool,
    /// Whether releasing over the press handler may still click.
    pub eligible_for_click: bool,
    /// Handler of the previous press, for double-click counting.
    pub last_press: Option<NodeId>,
    /// Time of the previous press.
    pub click_time: Option<Duration>,
    /// Consecutive presses on the same handler within the double-click window.
    pub click_count: u32,
    /// Max valid hit distance used for this pointer's queries.
    pub pointer_length: f32,
}

impl PointerEventData {
    /// Fresh data for a pointer.
    pub fn new(pointer: PointerId) -> Self {
        Self {
            pointer,
            position: Point::ZERO,
            delta: Vec2::ZERO,
            press_position: Point::ZERO,
            scroll_delta: Vec2::ZERO,
            current_raycast: RaycastResult::NONE,
            press_raycast: RaycastResult::NONE,
            pointer_enter: None,
            pointer_press: None,
            raw_pointer_press: None,
            pointer_drag: None,
            dragging: false,
            eligible_for_click: false,
            last_press: None,
            click_time: None,
            click_count: 0,
            pointer_length: 0.0,
        }
    }

    /// Node that received begin-drag and has not yet been released.
    pub fn dragged(&self) -> Option<NodeId> {
        self.pointer_drag.filter(|_| self.dragging)
    }
}

/// Everything the router tracks for one pointer.
#[derive(Clone, Debug)]
pub struct PointerEventRecord {
    pub(crate) data: PointerEventData,
    /// Entered nodes, deepest first.
    pub(crate) hovered: SmallVec<[NodeId; 8]>,
}

impl PointerEventRecord {
    /// Fresh record for a pointer.
    pub fn new(pointer: PointerId) -> Self {
        Self {
            data: PointerEventData::new(pointer),
            hovered: SmallVec::new(),
        }
    }

    /// Current pointer data.
    pub fn data(&self) -> &PointerEventData {
        &self.data
    }

    /// Nodes the pointer has entered, deepest first.
    pub fn hovered(&self) -> &[NodeId] {
        &self.hovered
    }

    /// Whether the pointer currently hovers any node.
    pub fn is_hovering(&self) -> bool {
        self.data.pointer_enter.is_some()
    }

    /// Clear per-tick fields ahead of a new hit test.
    pub(crate) fn reset_transient(&mut self) {
        self.data.delta = Vec2::ZERO;
        self.data.scroll_delta = Vec2::ZERO;
    }
}
