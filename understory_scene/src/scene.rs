// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, capability lookups, and selection.

use alloc::vec::Vec;

use crate::error::SceneError;
use crate::types::{Capabilities, NodeId, SceneNode, SelectionFlags};

/// Hierarchy of interactive nodes.
///
/// Nodes are addressed by generational [`NodeId`]s. Removing a node removes its
/// whole subtree and turns every id in it stale; all queries on stale ids
/// return `None`/`false` rather than panicking, so callers holding ids across
/// frames can keep using them safely.
///
/// ## Example
///
/// ```rust
/// use understory_scene::{Capabilities, Scene, SceneNode};
///
/// let mut scene = Scene::new();
/// let panel = scene
///     .insert(None, SceneNode::with_capabilities(Capabilities::SCROLL))
///     .unwrap();
/// let label = scene.insert(Some(panel), SceneNode::default()).unwrap();
///
/// // The label does not scroll itself, so the lookup resolves to the panel.
/// assert_eq!(scene.handler(label, Capabilities::SCROLL), Some(panel));
///
/// scene.remove(panel);
/// assert!(!scene.is_alive(label));
/// assert_eq!(scene.handler(label, Capabilities::SCROLL), None);
/// ```
#[derive(Clone, Default)]
pub struct Scene {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    selected: Option<NodeId>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: SceneNode,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// Fails if `parent` is stale.
    pub fn insert(&mut self, parent: Option<NodeId>, data: SceneNode) -> Result<NodeId, SceneError> {
        if let Some(p) = parent
            && !self.is_alive(p)
        {
            tracing::warn!(parent = ?p, "rejecting insert under a stale parent");
            return Err(SceneError::StaleNode(p));
        }
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, data));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, data)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        Ok(id)
    }

    /// Remove a node and its subtree. Stale ids are ignored.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` under `new_parent` (or make it a root).
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        if !self.is_alive(id) {
            return Err(SceneError::StaleNode(id));
        }
        if let Some(p) = new_parent {
            if !self.is_alive(p) {
                return Err(SceneError::StaleNode(p));
            }
            if self.ancestors(p).any(|a| a == id) {
                return Err(SceneError::Cycle { node: id, parent: p });
            }
        }
        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        Ok(())
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Whether the scene has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Node data for a live id.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.node(id).map(|n| &n.data)
    }

    /// Capabilities of a live node.
    pub fn capabilities(&self, id: NodeId) -> Option<Capabilities> {
        self.get(id).map(|d| d.capabilities)
    }

    /// Replace the capabilities of a live node. Returns `false` for stale ids.
    pub fn set_capabilities(&mut self, id: NodeId, capabilities: Capabilities) -> bool {
        match self.node_mut(id) {
            Some(n) => {
                n.data.capabilities = capabilities;
                true
            }
            None => false,
        }
    }

    /// Layer of a live node.
    pub fn layer(&self, id: NodeId) -> Option<u8> {
        self.get(id).map(|d| d.layer)
    }

    /// Picking flags of a live node.
    pub fn selection_flags(&self, id: NodeId) -> Option<SelectionFlags> {
        self.get(id).map(|d| d.selection)
    }

    /// Whether a live node implements any of `caps`.
    pub fn has(&self, id: NodeId, caps: Capabilities) -> bool {
        self.capabilities(id).is_some_and(|c| c.intersects(caps))
    }

    /// Nearest node, starting at `id` and walking toward the root, that
    /// implements any of `caps`.
    ///
    /// Returns `None` if no ancestor-or-self qualifies or `id` is stale.
    pub fn handler(&self, id: NodeId, caps: Capabilities) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.has(a, caps))
    }

    /// Iterate `id` and its ancestors, nearest first.
    ///
    /// Yields nothing for a stale id.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            next: self.is_alive(id).then_some(id),
        }
    }

    /// Deepest node that is an ancestor-or-self of both `a` and `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        self.ancestors(a)
            .find(|&candidate| self.ancestors(b).any(|x| x == candidate))
    }

    /// The globally selected node, if it is still alive.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected.filter(|&id| self.is_alive(id))
    }

    /// Replace the global selection, returning the previous (live) selection.
    ///
    /// Selecting a stale id clears the selection.
    pub fn set_selected(&mut self, node: Option<NodeId>) -> Option<NodeId> {
        let previous = self.selected();
        self.selected = node.filter(|&id| self.is_alive(id));
        previous
    }

    // --- internals ---

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .filter(|n| n.generation == id.1)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }
}

impl Node {
    fn new(generation: u32, data: SceneNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            data,
        }
    }
}

/// Iterator over a node and its ancestors, see [`Scene::ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    scene: &'a Scene,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.scene.parent_of(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn chain(scene: &mut Scene, caps: &[Capabilities]) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = Vec::new();
        for &c in caps {
            let id = scene
                .insert(out.last().copied(), SceneNode::with_capabilities(c))
                .unwrap();
            out.push(id);
        }
        out
    }

    #[test]
    fn generations_increase_on_slot_reuse() {
        let mut scene = Scene::new();
        let a = scene.insert(None, SceneNode::default()).unwrap();
        scene.remove(a);
        let b = scene.insert(None, SceneNode::default()).unwrap();
        assert!(scene.is_alive(b));
        assert!(!scene.is_alive(a));
        assert_eq!(a.slot(), b.slot());
        assert!(b.generation() > a.generation(), "generation must increase on reuse");
    }

    #[test]
    fn insert_under_stale_parent_is_rejected() {
        let mut scene = Scene::new();
        let a = scene.insert(None, SceneNode::default()).unwrap();
        scene.remove(a);
        assert_eq!(
            scene.insert(Some(a), SceneNode::default()),
            Err(SceneError::StaleNode(a))
        );
    }

    #[test]
    fn remove_drops_subtree_and_unlinks_parent() {
        let mut scene = Scene::new();
        let ids = chain(&mut scene, &[Capabilities::empty(); 3]);
        scene.remove(ids[1]);
        assert!(scene.is_alive(ids[0]));
        assert!(!scene.is_alive(ids[1]));
        assert!(!scene.is_alive(ids[2]));
        assert!(scene.children_of(ids[0]).is_empty());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn handler_walks_to_nearest_capable_ancestor() {
        let mut scene = Scene::new();
        let ids = chain(
            &mut scene,
            &[
                Capabilities::SCROLL,
                Capabilities::CLICK,
                Capabilities::empty(),
            ],
        );
        assert_eq!(scene.handler(ids[2], Capabilities::CLICK), Some(ids[1]));
        assert_eq!(scene.handler(ids[2], Capabilities::SCROLL), Some(ids[0]));
        assert_eq!(scene.handler(ids[2], Capabilities::DROP), None);
        assert_eq!(scene.handler(ids[1], Capabilities::CLICK), Some(ids[1]));
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let mut scene = Scene::new();
        let ids = chain(&mut scene, &[Capabilities::empty(); 3]);
        let walk: Vec<NodeId> = scene.ancestors(ids[2]).collect();
        assert_eq!(walk, vec![ids[2], ids[1], ids[0]]);
        scene.remove(ids[0]);
        assert_eq!(scene.ancestors(ids[2]).count(), 0);
    }

    #[test]
    fn common_ancestor_of_siblings_is_parent() {
        let mut scene = Scene::new();
        let root = scene.insert(None, SceneNode::default()).unwrap();
        let a = scene.insert(Some(root), SceneNode::default()).unwrap();
        let b = scene.insert(Some(root), SceneNode::default()).unwrap();
        let a1 = scene.insert(Some(a), SceneNode::default()).unwrap();
        assert_eq!(scene.common_ancestor(a1, b), Some(root));
        assert_eq!(scene.common_ancestor(a1, a), Some(a));
        let other = scene.insert(None, SceneNode::default()).unwrap();
        assert_eq!(scene.common_ancestor(a1, other), None);
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut scene = Scene::new();
        let ids = chain(&mut scene, &[Capabilities::empty(); 3]);
        assert_eq!(
            scene.reparent(ids[0], Some(ids[2])),
            Err(SceneError::Cycle {
                node: ids[0],
                parent: ids[2]
            })
        );
        let root = scene.insert(None, SceneNode::default()).unwrap();
        scene.reparent(ids[2], Some(root)).unwrap();
        assert_eq!(scene.parent_of(ids[2]), Some(root));
        assert!(scene.children_of(ids[1]).is_empty());
    }

    #[test]
    fn selection_forgets_removed_nodes() {
        let mut scene = Scene::new();
        let a = scene.insert(None, SceneNode::default()).unwrap();
        let b = scene.insert(None, SceneNode::default()).unwrap();
        assert_eq!(scene.set_selected(Some(a)), None);
        assert_eq!(scene.set_selected(Some(b)), Some(a));
        scene.remove(b);
        assert_eq!(scene.selected(), None);
        assert_eq!(scene.set_selected(Some(b)), None);
        assert_eq!(scene.selected(), None);
    }
}
