// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll dispatch and the scroll-available hint.
//!
//! Each pointer owns at most one outstanding scroll hint in the router's
//! [`FeedbackQueue`], remembered together with the scroll handler that raised
//! it. Moving to another scroll handler withdraws the old hint before raising
//! the new one; scrolling the same handler again leaves the queue untouched.

use alloc::vec::Vec;

use kurbo::Vec2;
use understory_feedback::{FeedbackQueue, FeedbackRequest};
use understory_scene::{Capabilities, NodeId, Scene};

use crate::config::RouterConfig;
use crate::dispatch::bubble;
use crate::record::PointerEventRecord;
use crate::types::{EventKind, RayEvent};

/// The scroll hint a pointer has outstanding, and the handler it is for.
pub(crate) type ScrollHint = Option<(NodeId, FeedbackRequest)>;

/// Deliver this tick's scroll delta. Returns whether a handler consumed it.
pub(crate) fn scroll(
    scene: &Scene,
    record: &mut PointerEventRecord,
    delta: Vec2,
    config: &RouterConfig,
    feedback: &mut FeedbackQueue,
    hint: &mut ScrollHint,
    events: &mut Vec<RayEvent>,
) -> bool {
    let target = record.data.pointer_enter.or(record.data.dragged());
    let handler = target.and_then(|t| scene.handler(t, Capabilities::SCROLL));

    let (Some(target), Some(handler)) = (target, handler) else {
        withdraw(feedback, hint);
        return false;
    };
    if delta == Vec2::ZERO {
        withdraw(feedback, hint);
        return false;
    }

    record.data.scroll_delta = delta;
    bubble(scene, events, target, EventKind::Scroll, &record.data);

    let same_handler = hint.as_ref().is_some_and(|(node, _)| *node == handler);
    if same_handler {
        // Re-raise only if something else withdrew it.
        if let Some((_, request)) = hint.as_ref()
            && !feedback.contains(request)
        {
            feedback.add(request.clone());
        }
    } else {
        withdraw(feedback, hint);
        let request = FeedbackRequest::new(config.feedback_owner, config.scroll_feedback_control)
            .with_source(record.data.pointer.source_id())
            .with_text(config.scroll_feedback_text.clone())
            .with_priority(config.scroll_feedback_priority);
        tracing::trace!(pointer = ?record.data.pointer, ?handler, "scroll hint raised");
        feedback.add(request.clone());
        *hint = Some((handler, request));
    }
    true
}

/// Drop the pointer's outstanding scroll hint, if any.
pub(crate) fn withdraw(feedback: &mut FeedbackQueue, hint: &mut ScrollHint) {
    if let Some((_, request)) = hint.take() {
        feedback.remove(&request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PointerId, RayId};
    use alloc::vec;
    use understory_scene::SceneNode;

    struct Fixture {
        scene: Scene,
        list: NodeId,
        row: NodeId,
        other: NodeId,
        plain: NodeId,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let root = scene
            .insert(None, SceneNode::with_capabilities(Capabilities::SCROLL))
            .unwrap();
        let list = scene
            .insert(Some(root), SceneNode::with_capabilities(Capabilities::SCROLL))
            .unwrap();
        let row = scene.insert(Some(list), SceneNode::default()).unwrap();
        let other = scene
            .insert(None, SceneNode::with_capabilities(Capabilities::SCROLL))
            .unwrap();
        let plain = scene.insert(None, SceneNode::default()).unwrap();
        Fixture {
            scene,
            list,
            row,
            other,
            plain,
        }
    }

    fn over(node: NodeId) -> PointerEventRecord {
        let mut r = PointerEventRecord::new(PointerId::Ray(RayId(3)));
        r.data.pointer_enter = Some(node);
        r
    }

    const UP: Vec2 = Vec2::new(0.0, 1.0);

    #[test]
    fn bubbles_and_raises_one_hint() {
        let f = fixture();
        let cfg = RouterConfig::default();
        let mut queue = FeedbackQueue::new();
        let mut hint = None;
        let mut out = Vec::new();
        let mut r = over(f.row);

        assert!(scroll(&f.scene, &mut r, UP, &cfg, &mut queue, &mut hint, &mut out));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].node, f.list);
        assert_eq!(out[0].data.scroll_delta, UP);
        assert_eq!(queue.len(), 1);
        assert_eq!(hint.as_ref().map(|h| h.0), Some(f.list));

        // Same handler again: debounced.
        let revision = queue.revision();
        scroll(&f.scene, &mut r, UP, &cfg, &mut queue, &mut hint, &mut out);
        assert_eq!(queue.revision(), revision);

        // No delta: the hint goes away.
        assert!(!scroll(&f.scene, &mut r, Vec2::ZERO, &cfg, &mut queue, &mut hint, &mut out));
        assert!(queue.is_empty());
        assert!(hint.is_none());
    }

    #[test]
    fn non_scrollable_target_withdraws() {
        let f = fixture();
        let cfg = RouterConfig::default();
        let mut queue = FeedbackQueue::new();
        let mut hint = None;
        let mut out = Vec::new();
        scroll(&f.scene, &mut over(f.other), UP, &cfg, &mut queue, &mut hint, &mut out);
        assert_eq!(queue.len(), 1);
        out.clear();
        assert!(!scroll(&f.scene, &mut over(f.plain), UP, &cfg, &mut queue, &mut hint, &mut out));
        assert!(out.is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn hand_off_replaces_the_hint() {
        let f = fixture();
        let cfg = RouterConfig::default();
        let mut queue = FeedbackQueue::new();
        let mut hint = None;
        let mut out = Vec::new();
        scroll(&f.scene, &mut over(f.row), UP, &cfg, &mut queue, &mut hint, &mut out);
        let before = queue.revision();
        scroll(&f.scene, &mut over(f.other), UP, &cfg, &mut queue, &mut hint, &mut out);
        assert_eq!(queue.len(), 1);
        assert_eq!(hint.as_ref().map(|h| h.0), Some(f.other));
        // Removed then re-added.
        assert_eq!(queue.revision(), before + 2);
        assert_eq!(
            queue.iter().map(|r| r.source).collect::<Vec<_>>(),
            vec![Some(PointerId::Ray(RayId(3)).source_id())]
        );
    }
}
