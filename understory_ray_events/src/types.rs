// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: pointer identities, emitted events, and input claims.

use understory_feedback::SourceId;
use understory_scene::{Capabilities, NodeId};

use crate::record::PointerEventData;

/// Host-chosen identity of a ray pointer (typically one per tracked device).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RayId(pub u64);

/// Identity of any pointer the router drives.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerId {
    /// A registered ray.
    Ray(RayId),
    /// The single screen (mouse) pointer.
    Screen,
}

impl PointerId {
    /// Feedback source identity for requests raised on behalf of this pointer.
    pub const fn source_id(self) -> SourceId {
        match self {
            Self::Ray(RayId(id)) => SourceId(id),
            Self::Screen => SourceId(u64::MAX),
        }
    }
}

impl From<RayId> for PointerId {
    fn from(id: RayId) -> Self {
        Self::Ray(id)
    }
}

/// Handle to one registration of a ray.
///
/// Registering the same [`RayId`] again, or removing it, makes older handles stale.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RayHandle {
    pub(crate) id: RayId,
    pub(crate) serial: u32,
}

impl RayHandle {
    /// The ray identity this handle was issued for.
    pub const fn id(self) -> RayId {
        self.id
    }
}

bitflags::bitflags! {
    /// Host input actions the router consumed this tick.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InputActions: u8 {
        /// The select button.
        const SELECT = 0b0000_0001;
        /// The scroll axes.
        const SCROLL = 0b0000_0010;
    }
}

/// Kind of event delivered to a node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    /// Pointer started hovering the node or a descendant.
    Enter,
    /// Pointer stopped hovering the node and its descendants.
    Exit,
    /// Pointer stayed on the node or a descendant this tick.
    Hover,
    /// Select pressed over the node.
    PointerDown,
    /// Select released after pressing the node.
    PointerUp,
    /// Press and release resolved to the same handler.
    Click,
    /// Pointer moved far enough from the press to start dragging.
    BeginDrag,
    /// Generic per-tick drag.
    Drag,
    /// Ray-specific per-tick drag.
    RayDrag,
    /// Drag finished.
    EndDrag,
    /// A drag ended over the node.
    Drop,
    /// Scroll delta delivered to the node.
    Scroll,
    /// Node became the global selection.
    Select,
    /// Node stopped being the global selection.
    Deselect,
}

impl EventKind {
    /// Capability a node needs to receive this kind.
    pub const fn capability(self) -> Capabilities {
        match self {
            Self::Enter => Capabilities::ENTER,
            Self::Exit => Capabilities::EXIT,
            Self::Hover => Capabilities::HOVER,
            Self::PointerDown => Capabilities::POINTER_DOWN,
            Self::PointerUp => Capabilities::POINTER_UP,
            Self::Click => Capabilities::CLICK,
            Self::BeginDrag => Capabilities::BEGIN_DRAG,
            Self::Drag => Capabilities::DRAG,
            Self::RayDrag => Capabilities::RAY_DRAG,
            Self::EndDrag => Capabilities::END_DRAG,
            Self::Drop => Capabilities::DROP,
            Self::Scroll => Capabilities::SCROLL,
            Self::Select | Self::Deselect => Capabilities::SELECT,
        }
    }
}

/// An event emitted by the router.
///
/// `data` is a copy of the pointer's event data at emission time, so it stays
/// stable while the router keeps mutating the live record.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayEvent {
    /// Receiving node.
    pub node: NodeId,
    /// What happened.
    pub kind: EventKind,
    /// Pointer state when the event was emitted.
    pub data: PointerEventData,
}

impl RayEvent {
    /// Pointer that produced this event.
    pub fn pointer(&self) -> PointerId {
        self.data.pointer
    }
}
