// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers, capability sets, and picking filters.

/// Identifier for a node in the scene (generational).
///
/// A `NodeId` stays valid until its node is removed. Once removed, the slot may
/// be reused with a higher generation, so a stale id never aliases a new node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot index of this id; only meaningful together with [`NodeId::generation`].
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Generation of this id's slot at insertion time.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Event capabilities a node implements.
    ///
    /// The router only delivers an event kind to nodes that carry the matching
    /// capability; handler lookups walk ancestors until a node with the
    /// requested capability is found.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        /// Receives pointer-enter when a ray starts hovering it or a descendant.
        const ENTER        = 1 << 0;
        /// Receives pointer-exit when a ray stops hovering it and its descendants.
        const EXIT         = 1 << 1;
        /// Receives a hover event every tick a ray stays on it or a descendant.
        const HOVER        = 1 << 2;
        /// Receives click on release over the press handler.
        const CLICK        = 1 << 3;
        /// Receives pointer-down; also makes the node eligible as press handler.
        const POINTER_DOWN = 1 << 4;
        /// Receives pointer-up on release.
        const POINTER_UP   = 1 << 5;
        /// Receives begin-drag once a drag starts.
        const BEGIN_DRAG   = 1 << 6;
        /// Receives the generic drag event every dragging tick.
        const DRAG         = 1 << 7;
        /// Receives the ray-specific drag event every dragging tick.
        const RAY_DRAG     = 1 << 8;
        /// Receives end-drag when a drag finishes.
        const END_DRAG     = 1 << 9;
        /// Receives drop when a drag ends over it.
        const DROP         = 1 << 10;
        /// Receives scroll deltas.
        const SCROLL       = 1 << 11;
        /// Can hold the global selection; receives select/deselect.
        const SELECT       = 1 << 12;

        /// Enter, exit and hover.
        const HOVERABLE = Self::ENTER.bits() | Self::EXIT.bits() | Self::HOVER.bits();
        /// Pointer-down, pointer-up and click.
        const PRESSABLE = Self::POINTER_DOWN.bits() | Self::POINTER_UP.bits() | Self::CLICK.bits();
        /// Either drag variant.
        const DRAGGABLE = Self::DRAG.bits() | Self::RAY_DRAG.bits();
    }
}

bitflags::bitflags! {
    /// How a node may be picked.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SelectionFlags: u8 {
        /// Pickable at a distance by a ray.
        const RAY    = 0b0000_0001;
        /// Pickable by direct contact.
        const DIRECT = 0b0000_0010;
    }
}

impl Default for SelectionFlags {
    fn default() -> Self {
        Self::RAY | Self::DIRECT
    }
}

/// A set of layers (0 through 31).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// No layer.
    pub const NONE: Self = Self(0);

    /// A mask containing only `layer`. Layers past 31 produce an empty mask.
    pub const fn only(layer: u8) -> Self {
        match 1_u32.checked_shl(layer as u32) {
            Some(bit) => Self(bit),
            None => Self::NONE,
        }
    }

    /// Returns a copy of this mask with `layer` added.
    #[must_use]
    pub const fn with(self, layer: u8) -> Self {
        Self(self.0 | Self::only(layer).0)
    }

    /// Returns a copy of this mask with `layer` removed.
    #[must_use]
    pub const fn without(self, layer: u8) -> Self {
        Self(self.0 & !Self::only(layer).0)
    }

    /// Whether `layer` is part of this mask.
    pub const fn contains(self, layer: u8) -> bool {
        self.0 & Self::only(layer).0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Per-node data owned by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneNode {
    /// Events this node handles.
    pub capabilities: Capabilities,
    /// How this node may be picked.
    pub selection: SelectionFlags,
    /// Layer used by layer-mask filters.
    pub layer: u8,
}

impl SceneNode {
    /// A node with the given capabilities on layer 0.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::empty(),
            selection: SelectionFlags::default(),
            layer: 0,
        }
    }
}
