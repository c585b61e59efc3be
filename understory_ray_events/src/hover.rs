// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover reconciliation: enter/exit/hover transitions for one pointer.
//!
//! Given the pointer's previous hover chain and a new target, [`reconcile`]
//! emits, in order:
//!
//! 1. Exit for every previously hovered node strictly below the common
//!    ancestor, deepest first.
//! 2. Enter for every node from the new target up to (not including) the
//!    common ancestor, deepest first.
//!
//! Exits always precede enters. When the target is unchanged, Hover bubbles
//! through the target's ancestors instead.
//!
//! The exit walk runs over the cached chain rather than over the live
//! hierarchy, so nodes destroyed or reparented since the last tick still
//! unwind the nodes that actually received Enter. Stale entries are skipped.

use alloc::vec::Vec;

use smallvec::SmallVec;
use understory_scene::{NodeId, Scene};

use crate::dispatch::{bubble, execute};
use crate::record::PointerEventRecord;
use crate::types::{EventKind, RayEvent};

/// Move `record`'s hover from its current chain to `new_target`.
///
/// With `exit_only`, nodes that would newly be entered are not: the pointer
/// keeps hovering only what it shares with the new target's chain. Passing
/// `None` exits everything.
pub(crate) fn reconcile(
    scene: &Scene,
    record: &mut PointerEventRecord,
    new_target: Option<NodeId>,
    exit_only: bool,
    events: &mut Vec<RayEvent>,
) {
    let new_target = new_target.filter(|&n| scene.is_alive(n));
    let previous = record.data.pointer_enter;

    let Some(target) = new_target else {
        if !record.hovered.is_empty() {
            tracing::trace!(pointer = ?record.data.pointer, exited = record.hovered.len(), "hover cleared");
        }
        exit_all(scene, record, events);
        record.data.pointer_enter = None;
        return;
    };

    if previous.is_none() {
        exit_all(scene, record, events);
    } else if !exit_only && previous == Some(target) {
        bubble(scene, events, target, EventKind::Hover, &record.data);
        return;
    }

    let common = scene
        .ancestors(target)
        .find(|n| record.hovered.contains(n));

    // Unwind the old chain below the common ancestor.
    let keep_from = common
        .and_then(|c| record.hovered.iter().position(|&n| n == c))
        .unwrap_or(record.hovered.len());
    for &node in &record.hovered[..keep_from] {
        execute(scene, events, node, EventKind::Exit, &record.data);
    }
    record.hovered.drain(..keep_from);

    if exit_only {
        record.data.pointer_enter = common;
        return;
    }

    record.data.pointer_enter = Some(target);
    let entered: SmallVec<[NodeId; 8]> = scene
        .ancestors(target)
        .take_while(|&n| Some(n) != common)
        .collect();
    for &node in &entered {
        execute(scene, events, node, EventKind::Enter, &record.data);
    }
    tracing::trace!(
        pointer = ?record.data.pointer,
        ?previous,
        ?target,
        ?common,
        entered = entered.len(),
        "hover moved"
    );
    record.hovered.insert_many(0, entered);
}

fn exit_all(scene: &Scene, record: &mut PointerEventRecord, events: &mut Vec<RayEvent>) {
    for &node in &record.hovered {
        execute(scene, events, node, EventKind::Exit, &record.data);
    }
    record.hovered.clear();
}
