// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability dispatch: deliver an event to the nodes that implement it.
//!
//! Three delivery shapes cover every router step:
//!
//! - [`execute`]: the node itself, if it has the capability.
//! - [`execute_hierarchy`]: the nearest ancestor-or-self with the capability
//!   (the first handler found wins; used for pointer-down and drop).
//! - [`bubble`]: every ancestor-or-self with the capability, nearest first
//!   (used for hover and scroll).
//!
//! Delivery appends a [`RayEvent`] to the output buffer with a copy of the
//! pointer data; stale nodes never qualify, so walks over destroyed nodes
//! simply emit nothing.

use alloc::vec::Vec;

use understory_scene::{NodeId, Scene};

use crate::record::PointerEventData;
use crate::types::{EventKind, RayEvent};

/// Deliver `kind` to `node` if it implements it. Returns whether it was delivered.
pub(crate) fn execute(
    scene: &Scene,
    events: &mut Vec<RayEvent>,
    node: NodeId,
    kind: EventKind,
    data: &PointerEventData,
) -> bool {
    if !scene.has(node, kind.capability()) {
        return false;
    }
    tracing::trace!(pointer = ?data.pointer, ?node, ?kind, "emit");
    events.push(RayEvent {
        node,
        kind,
        data: *data,
    });
    true
}

/// Deliver `kind` to the nearest ancestor-or-self of `node` that implements it.
pub(crate) fn execute_hierarchy(
    scene: &Scene,
    events: &mut Vec<RayEvent>,
    node: NodeId,
    kind: EventKind,
    data: &PointerEventData,
) -> Option<NodeId> {
    let handler = scene.handler(node, kind.capability())?;
    execute(scene, events, handler, kind, data);
    Some(handler)
}

/// Deliver `kind` to every ancestor-or-self of `node` that implements it.
pub(crate) fn bubble(
    scene: &Scene,
    events: &mut Vec<RayEvent>,
    node: NodeId,
    kind: EventKind,
    data: &PointerEventData,
) -> usize {
    scene
        .ancestors(node)
        .filter(|&n| execute(scene, events, n, kind, data))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointerId;
    use alloc::vec;
    use understory_scene::{Capabilities, SceneNode};

    fn tree() -> (Scene, [NodeId; 3]) {
        let mut scene = Scene::new();
        let root = scene
            .insert(None, SceneNode::with_capabilities(Capabilities::SCROLL))
            .unwrap();
        let mid = scene
            .insert(
                Some(root),
                SceneNode::with_capabilities(Capabilities::SCROLL | Capabilities::DROP),
            )
            .unwrap();
        let leaf = scene.insert(Some(mid), SceneNode::default()).unwrap();
        (scene, [root, mid, leaf])
    }

    #[test]
    fn execute_requires_the_capability() {
        let (scene, [_, mid, leaf]) = tree();
        let data = PointerEventData::new(PointerId::Screen);
        let mut out = Vec::new();
        assert!(!execute(&scene, &mut out, leaf, EventKind::Drop, &data));
        assert!(execute(&scene, &mut out, mid, EventKind::Drop, &data));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].node, mid);
    }

    #[test]
    fn hierarchy_stops_at_first_handler() {
        let (scene, [_, mid, leaf]) = tree();
        let data = PointerEventData::new(PointerId::Screen);
        let mut out = Vec::new();
        assert_eq!(
            execute_hierarchy(&scene, &mut out, leaf, EventKind::Scroll, &data),
            Some(mid)
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn bubble_visits_every_capable_ancestor() {
        let (mut scene, [root, mid, leaf]) = tree();
        let data = PointerEventData::new(PointerId::Screen);
        let mut out = Vec::new();
        assert_eq!(bubble(&scene, &mut out, leaf, EventKind::Scroll, &data), 2);
        let nodes: Vec<NodeId> = out.iter().map(|e| e.node).collect();
        assert_eq!(nodes, vec![mid, root]);

        out.clear();
        scene.remove(mid);
        assert_eq!(bubble(&scene, &mut out, leaf, EventKind::Scroll, &data), 0);
        assert!(out.is_empty());
    }
}
