// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press, click, and drag state machine for one pointer.
//!
//! ```text
//! Idle --press--> Pressed --moved past threshold--> Dragging
//!   ^                |                                  |
//!   +----release-----+-------------release--------------+
//! ```
//!
//! - [`press`] resolves the press handler, counts multi-clicks, moves the
//!   global selection, and records the potential drag target.
//! - [`drag`] begins the drag once the pointer travels far enough and then
//!   delivers drag events every tick.
//! - [`release`] delivers pointer-up, end-drag, drop, and click, then returns
//!   the pointer to idle.
//!
//! Targets destroyed between steps read as "no handler": deliveries to them
//! are skipped and the remaining steps still run.

use alloc::vec::Vec;
use core::time::Duration;

use understory_scene::{Capabilities, Scene};

use crate::config::RouterConfig;
use crate::dispatch::{execute, execute_hierarchy};
use crate::record::PointerEventRecord;
use crate::types::{EventKind, PointerId, RayEvent};

/// Handle a select press. Returns whether a handler took the press.
pub(crate) fn press(
    scene: &mut Scene,
    record: &mut PointerEventRecord,
    config: &RouterConfig,
    now: Duration,
    events: &mut Vec<RayEvent>,
) -> bool {
    let data = &mut record.data;
    if let Some(previous) = scene.set_selected(None) {
        execute(scene, events, previous, EventKind::Deselect, data);
    }

    data.press_position = data.position;
    data.press_raycast = data.current_raycast;
    data.raw_pointer_press = data.pointer_enter;
    data.pointer_drag = None;
    data.dragging = false;

    let Some(hovered) = data.pointer_enter.filter(|&n| scene.is_alive(n)) else {
        data.pointer_press = None;
        data.eligible_for_click = false;
        return false;
    };

    let handler = scene
        .handler(hovered, Capabilities::POINTER_DOWN)
        .or_else(|| scene.handler(hovered, Capabilities::CLICK));

    if let Some(h) = handler {
        let repeat = data.last_press == Some(h)
            && data
                .click_time
                .and_then(|t| now.checked_sub(t))
                .is_some_and(|elapsed| config.within_double_click(elapsed));
        data.click_count = if repeat { data.click_count + 1 } else { 1 };
        data.last_press = Some(h);
        data.click_time = Some(now);
    }

    data.pointer_press = handler;
    data.eligible_for_click = true;
    if let Some(h) = handler {
        execute(scene, events, h, EventKind::PointerDown, data);
        if scene.has(h, Capabilities::SELECT) {
            scene.set_selected(Some(h));
            execute(scene, events, h, EventKind::Select, data);
        }
    }

    data.pointer_drag = scene.handler(hovered, Capabilities::DRAGGABLE);
    tracing::trace!(
        pointer = ?data.pointer,
        ?hovered,
        ?handler,
        drag = ?data.pointer_drag,
        click_count = data.click_count,
        "press"
    );
    handler.is_some()
}

/// Advance a held press: begin the drag when due and deliver drag events.
pub(crate) fn drag(
    scene: &Scene,
    record: &mut PointerEventRecord,
    config: &RouterConfig,
    events: &mut Vec<RayEvent>,
) {
    let data = &mut record.data;
    let Some(target) = data.pointer_drag else {
        return;
    };

    if !data.dragging {
        if !scene.is_alive(target)
            || data.press_position.distance(data.position) < config.drag_threshold
        {
            return;
        }
        data.dragging = true;
        data.eligible_for_click = false;
        tracing::trace!(pointer = ?data.pointer, ?target, "begin drag");
        execute(scene, events, target, EventKind::BeginDrag, data);
    }

    if matches!(data.pointer, PointerId::Ray(_)) {
        execute(scene, events, target, EventKind::RayDrag, data);
    }
    execute(scene, events, target, EventKind::Drag, data);
}

/// Handle a select release.
///
/// With `completed` false the interaction is cancelled: the press and drag
/// still end, but nothing under the pointer gets a drop or click.
pub(crate) fn release(
    scene: &Scene,
    record: &mut PointerEventRecord,
    completed: bool,
    events: &mut Vec<RayEvent>,
) {
    let data = &mut record.data;
    if let Some(pressed) = data.pointer_press {
        execute(scene, events, pressed, EventKind::PointerUp, data);
    }

    if let Some(dragged) = data.dragged() {
        execute(scene, events, dragged, EventKind::EndDrag, data);
        if let Some(hovered) = data.pointer_enter
            && completed
            && hovered != dragged
        {
            execute_hierarchy(scene, events, hovered, EventKind::Drop, data);
        }
    }
    data.pointer_drag = None;
    data.dragging = false;

    let click_handler = data
        .pointer_enter
        .and_then(|n| scene.handler(n, Capabilities::CLICK));
    if let Some(pressed) = data.pointer_press
        && completed
        && data.eligible_for_click
        && click_handler == Some(pressed)
    {
        execute(scene, events, pressed, EventKind::Click, data);
    }

    data.eligible_for_click = false;
    data.pointer_press = None;
    data.raw_pointer_press = None;
}

/// Whether `record` holds a press or drag that a release would end.
pub(crate) fn is_engaged(record: &PointerEventRecord) -> bool {
    record.data.pointer_press.is_some() || record.data.pointer_drag.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RayId;
    use alloc::vec;
    use kurbo::Point;
    use understory_scene::{NodeId, SceneNode};

    fn record_over(node: Option<NodeId>) -> PointerEventRecord {
        let mut r = PointerEventRecord::new(PointerId::Ray(RayId(7)));
        r.data.pointer_enter = node;
        r
    }

    fn kinds(events: &[RayEvent]) -> Vec<(EventKind, NodeId)> {
        events.iter().map(|e| (e.kind, e.node)).collect()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn press_resolves_handler_and_moves_selection() {
        let mut scene = Scene::new();
        let panel = scene
            .insert(
                None,
                SceneNode::with_capabilities(Capabilities::POINTER_DOWN | Capabilities::SELECT),
            )
            .unwrap();
        let label = scene.insert(Some(panel), SceneNode::default()).unwrap();
        let other = scene
            .insert(None, SceneNode::with_capabilities(Capabilities::SELECT))
            .unwrap();
        scene.set_selected(Some(other));

        let mut r = record_over(Some(label));
        let mut out = Vec::new();
        assert!(press(&mut scene, &mut r, &RouterConfig::default(), ms(0), &mut out));
        assert_eq!(
            kinds(&out),
            vec![
                (EventKind::Deselect, other),
                (EventKind::PointerDown, panel),
                (EventKind::Select, panel),
            ]
        );
        assert_eq!(scene.selected(), Some(panel));
        assert_eq!(r.data.pointer_press, Some(panel));
        assert_eq!(r.data.raw_pointer_press, Some(label));
        assert!(r.data.eligible_for_click);
    }

    #[test]
    fn press_over_nothing_clears_selection_only() {
        let mut scene = Scene::new();
        let sel = scene
            .insert(None, SceneNode::with_capabilities(Capabilities::SELECT))
            .unwrap();
        scene.set_selected(Some(sel));
        let mut r = record_over(None);
        let mut out = Vec::new();
        assert!(!press(&mut scene, &mut r, &RouterConfig::default(), ms(0), &mut out));
        assert_eq!(kinds(&out), vec![(EventKind::Deselect, sel)]);
        assert_eq!(scene.selected(), None);
        assert_eq!(r.data.pointer_press, None);
    }

    #[test]
    fn click_count_uses_inclusive_window() {
        let mut scene = Scene::new();
        let button = scene
            .insert(None, SceneNode::with_capabilities(Capabilities::CLICK))
            .unwrap();
        let cfg = RouterConfig::default();
        let mut r = record_over(Some(button));
        let mut out = Vec::new();

        let mut at = |t: u64, r: &mut PointerEventRecord| {
            press(&mut scene, r, &cfg, ms(t), &mut out);
            release(&scene, r, true, &mut out);
            r.data.click_count
        };
        assert_eq!(at(1_000, &mut r), 1);
        assert_eq!(at(1_150, &mut r), 2);
        assert_eq!(at(1_450, &mut r), 3);
        assert_eq!(at(1_551, &mut r), 1);
        assert_eq!(at(2_000, &mut r), 1);
    }

    #[test]
    fn drag_waits_for_threshold_and_cancels_click() {
        let mut scene = Scene::new();
        let knob = scene
            .insert(
                None,
                SceneNode::with_capabilities(
                    Capabilities::CLICK
                        | Capabilities::BEGIN_DRAG
                        | Capabilities::DRAG
                        | Capabilities::RAY_DRAG
                        | Capabilities::END_DRAG,
                ),
            )
            .unwrap();
        let cfg = RouterConfig::default().with_drag_threshold(5.0);
        let mut r = record_over(Some(knob));
        let mut out = Vec::new();
        press(&mut scene, &mut r, &cfg, ms(0), &mut out);
        out.clear();

        r.data.position = Point::new(3.0, 0.0);
        drag(&scene, &mut r, &cfg, &mut out);
        assert!(out.is_empty());
        assert!(r.data.eligible_for_click);

        r.data.position = Point::new(5.0, 0.0);
        drag(&scene, &mut r, &cfg, &mut out);
        assert_eq!(
            kinds(&out),
            vec![
                (EventKind::BeginDrag, knob),
                (EventKind::RayDrag, knob),
                (EventKind::Drag, knob),
            ]
        );
        assert_eq!(r.data.dragged(), Some(knob));
        out.clear();

        release(&scene, &mut r, true, &mut out);
        assert_eq!(kinds(&out), vec![(EventKind::EndDrag, knob)]);
        assert_eq!(r.data.pointer_drag, None);
        assert!(!r.data.dragging);
    }

    #[test]
    fn drop_goes_to_the_hovered_hierarchy() {
        let mut scene = Scene::new();
        let bin = scene
            .insert(None, SceneNode::with_capabilities(Capabilities::DROP))
            .unwrap();
        let slot = scene.insert(Some(bin), SceneNode::default()).unwrap();
        let card = scene
            .insert(
                None,
                SceneNode::with_capabilities(Capabilities::DRAG | Capabilities::END_DRAG),
            )
            .unwrap();
        let cfg = RouterConfig::default().with_drag_threshold(0.0);
        let mut r = record_over(Some(card));
        let mut out = Vec::new();
        press(&mut scene, &mut r, &cfg, ms(0), &mut out);
        drag(&scene, &mut r, &cfg, &mut out);
        out.clear();

        r.data.pointer_enter = Some(slot);
        release(&scene, &mut r, true, &mut out);
        assert_eq!(
            kinds(&out),
            vec![(EventKind::EndDrag, card), (EventKind::Drop, bin)]
        );
    }

    #[test]
    fn cancelled_release_skips_drop_and_click() {
        let mut scene = Scene::new();
        let bin = scene
            .insert(None, SceneNode::with_capabilities(Capabilities::DROP))
            .unwrap();
        let card = scene
            .insert(
                None,
                SceneNode::with_capabilities(
                    Capabilities::POINTER_DOWN
                        | Capabilities::POINTER_UP
                        | Capabilities::CLICK
                        | Capabilities::DRAG
                        | Capabilities::END_DRAG,
                ),
            )
            .unwrap();
        let cfg = RouterConfig::default().with_drag_threshold(0.0);
        let mut r = record_over(Some(card));
        let mut out = Vec::new();
        press(&mut scene, &mut r, &cfg, ms(0), &mut out);
        drag(&scene, &mut r, &cfg, &mut out);
        out.clear();

        r.data.pointer_enter = Some(bin);
        release(&scene, &mut r, false, &mut out);
        assert_eq!(
            kinds(&out),
            vec![(EventKind::PointerUp, card), (EventKind::EndDrag, card)]
        );
        assert!(!is_engaged(&r));
    }

    #[test]
    fn destroyed_drag_target_releases_cleanly() {
        let mut scene = Scene::new();
        let card = scene
            .insert(
                None,
                SceneNode::with_capabilities(Capabilities::DRAG | Capabilities::END_DRAG),
            )
            .unwrap();
        let cfg = RouterConfig::default().with_drag_threshold(0.0);
        let mut r = record_over(Some(card));
        let mut out = Vec::new();
        press(&mut scene, &mut r, &cfg, ms(0), &mut out);
        drag(&scene, &mut r, &cfg, &mut out);
        scene.remove(card);
        out.clear();

        drag(&scene, &mut r, &cfg, &mut out);
        release(&scene, &mut r, true, &mut out);
        assert!(out.is_empty());
        assert!(!is_engaged(&r));
        assert_eq!(r.data.dragged(), None);
    }
}
