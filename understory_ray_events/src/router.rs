// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router facade: pointer registration, the per-tick pipeline, and queries.
//!
//! ## Tick pipeline
//!
//! For every registered ray, in registration order, and then for the screen
//! pointer:
//!
//! 1. Skip the pointer if its source is inactive and it holds no press or drag.
//! 2. Hit test, refreshing position, delta, and the current raycast.
//! 3. Gate: the pointer may interact if its source is active, it is not blocked
//!    or marked for removal, and its validity predicate accepts the hit.
//! 4. Hover: reconcile toward the hit, or exit-only toward nothing when gated.
//! 5. Press and drag, when the gate is open.
//! 6. Release, always, so a gated pointer still ends a held drag.
//! 7. Scroll when the gate is open; otherwise withdraw the scroll hint.
//!
//! Rays run in a fixed order because the global selection is shared: when two
//! rays press in the same tick, the later registration wins.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::time::Duration;

use hashbrown::HashMap;
use understory_feedback::FeedbackQueue;
use understory_scene::{LayerMask, NodeId, Scene};

use crate::config::RouterConfig;
use crate::error::ConfigError;
use crate::hit::{Aim, HitFilter, HitTester, Raycaster};
use crate::record::PointerEventRecord;
use crate::scroll::ScrollHint;
use crate::source::{InputSource, RaySource, ScreenSource};
use crate::types::{InputActions, PointerId, RayEvent, RayHandle, RayId};
use crate::{hover, press, scroll};

/// Host veto over a pointer's interaction, consulted with the current hit every tick.
pub type ValidityPredicate = Box<dyn Fn(Option<NodeId>) -> bool>;

/// Router-side state of one pointer, independent of its input source.
struct PointerState {
    record: PointerEventRecord,
    validity: Option<ValidityPredicate>,
    blocked: bool,
    marked: bool,
    layers: LayerMask,
    scroll_hint: ScrollHint,
}

impl core::fmt::Debug for PointerState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PointerState")
            .field("record", &self.record)
            .field("has_validity", &self.validity.is_some())
            .field("blocked", &self.blocked)
            .field("marked", &self.marked)
            .field("layers", &self.layers)
            .field("scroll_hint", &self.scroll_hint)
            .finish()
    }
}

impl PointerState {
    fn new(pointer: PointerId, pointer_length: f32, validity: Option<ValidityPredicate>) -> Self {
        let mut record = PointerEventRecord::new(pointer);
        record.data.pointer_length = pointer_length;
        Self {
            record,
            validity,
            blocked: false,
            marked: false,
            layers: LayerMask::ALL,
            scroll_hint: None,
        }
    }
}

#[derive(Debug)]
struct RayEntry {
    id: RayId,
    serial: u32,
    source: RaySource,
    state: PointerState,
}

#[derive(Debug)]
struct ScreenEntry {
    source: ScreenSource,
    state: PointerState,
}

/// Router-owned buffers every pointer's pipeline writes into.
struct Pipeline<'a> {
    config: &'a RouterConfig,
    feedback: &'a mut FeedbackQueue,
    hits: &'a mut HitTester,
    events: &'a mut Vec<RayEvent>,
}

/// Multi-pointer event router.
///
/// Owns one state machine per registered ray plus an optional screen pointer,
/// all resolved against a host-owned [`Scene`]. Events are buffered in
/// emission order; drain them with [`Router::drain_events`] after each tick.
/// The buffer is never cleared by the router itself, so a host that stops
/// draining keeps accumulating events.
///
/// Lookups on unknown pointers return `None` or do nothing, so other systems
/// can query speculatively every frame.
///
/// ```
/// use core::time::Duration;
/// use understory_ray_events::{RayId, Router};
/// use understory_scene::Scene;
///
/// let mut scene = Scene::new();
/// let mut router = Router::new();
/// let left = router.register_ray(RayId(1), None);
///
/// router.ray_source_mut(left).unwrap().set_select(true);
/// router.tick(&mut scene, &mut [], Duration::ZERO);
///
/// // Nothing was hit, so nothing was pressed.
/// assert!(router.drain_events().next().is_none());
/// assert_eq!(router.event_record(RayId(1)).unwrap().data().pointer_press, None);
/// ```
#[derive(Debug, Default)]
pub struct Router {
    rays: Vec<RayEntry>,
    index: HashMap<RayId, usize>,
    screen: Option<ScreenEntry>,
    config: RouterConfig,
    feedback: FeedbackQueue,
    hit_tester: HitTester,
    events: Vec<RayEvent>,
    /// States displaced by re-registration, torn down at the next tick or flush.
    retired: Vec<PointerState>,
    next_serial: u32,
}

impl Router {
    /// A router with the default configuration and no pointers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with a custom configuration.
    pub fn with_config(config: RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(?config, "router configured");
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // --- registration ---

    /// Start tracking a ray.
    ///
    /// Registering an id that is already tracked replaces its state in place
    /// (keeping its position in the tick order) and makes older handles stale.
    /// The replaced state is torn down at the next [`Router::tick`] or
    /// [`Router::flush_removals`], like a removed ray: pointer-up, end-drag
    /// and hover exits are emitted then, with no click or drop.
    pub fn register_ray(&mut self, id: RayId, validity: Option<ValidityPredicate>) -> RayHandle {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        let entry = RayEntry {
            id,
            serial,
            source: RaySource::default(),
            state: PointerState::new(PointerId::Ray(id), self.config.pointer_length, validity),
        };
        if let Some(&i) = self.index.get(&id) {
            tracing::debug!(?id, "ray re-registered; previous state retired");
            let old = core::mem::replace(&mut self.rays[i], entry);
            self.retired.push(old.state);
        } else {
            tracing::debug!(?id, "ray registered");
            self.index.insert(id, self.rays.len());
            self.rays.push(entry);
        }
        RayHandle { id, serial }
    }

    /// Whether `handle` still refers to the current registration of its ray.
    pub fn is_registered(&self, handle: RayHandle) -> bool {
        self.entry(handle.id).is_some_and(|e| e.serial == handle.serial)
    }

    /// Tracked rays, in tick order.
    pub fn rays(&self) -> impl Iterator<Item = RayId> + '_ {
        self.rays.iter().map(|e| e.id)
    }

    /// Input source of a live registration.
    pub fn ray_source_mut(&mut self, handle: RayHandle) -> Option<&mut RaySource> {
        let i = *self.index.get(&handle.id)?;
        let entry = &mut self.rays[i];
        (entry.serial == handle.serial).then_some(&mut entry.source)
    }

    /// Install or replace the screen pointer's input source.
    ///
    /// Replacing keeps the pointer's hover, press, and drag state.
    pub fn set_screen_pointer(&mut self, source: ScreenSource) {
        match &mut self.screen {
            Some(screen) => screen.source = source,
            None => {
                tracing::debug!("screen pointer installed");
                self.screen = Some(ScreenEntry {
                    source,
                    state: PointerState::new(PointerId::Screen, f32::INFINITY, None),
                });
            }
        }
    }

    /// The screen pointer's input source.
    pub fn screen_source_mut(&mut self) -> Option<&mut ScreenSource> {
        self.screen.as_mut().map(|s| &mut s.source)
    }

    /// Schedule a pointer for removal at the next [`Router::flush_removals`].
    ///
    /// Until then the pointer may not start new interactions.
    pub fn mark_for_removal(&mut self, pointer: impl Into<PointerId>) {
        let pointer = pointer.into();
        if let Some(state) = self.state_mut(pointer) {
            tracing::debug!(?pointer, "marked for removal");
            state.marked = true;
        }
    }

    /// Tear down and forget every pointer marked for removal.
    ///
    /// Each one ends its interaction (pointer-up and end-drag, no click or
    /// drop), exits its hover chain, and withdraws its scroll hint. States
    /// displaced by re-registration are torn down the same way. The remaining
    /// rays keep their order.
    pub fn flush_removals(&mut self, scene: &Scene) {
        let Self {
            rays,
            index,
            screen,
            feedback,
            events,
            retired,
            ..
        } = self;

        retire(scene, retired, feedback, events);

        let before = rays.len();
        rays.retain_mut(|entry| {
            if entry.state.marked {
                teardown(scene, &mut entry.state, feedback, events);
                tracing::debug!(id = ?entry.id, "ray removed");
                false
            } else {
                true
            }
        });
        if rays.len() != before {
            index.clear();
            index.extend(rays.iter().enumerate().map(|(i, e)| (e.id, i)));
        }

        if let Some(entry) = screen.as_mut()
            && entry.state.marked
        {
            teardown(scene, &mut entry.state, feedback, events);
            tracing::debug!("screen pointer removed");
            *screen = None;
        }
    }

    // --- per-pointer controls ---

    /// Block or unblock a pointer. Takes effect at the next tick.
    pub fn set_blocked(&mut self, pointer: impl Into<PointerId>, blocked: bool) {
        let pointer = pointer.into();
        if let Some(state) = self.state_mut(pointer)
            && state.blocked != blocked
        {
            tracing::debug!(?pointer, blocked, "blocked flag changed");
            state.blocked = blocked;
        }
    }

    /// Whether a pointer is blocked. Unknown pointers are not.
    pub fn is_blocked(&self, pointer: impl Into<PointerId>) -> bool {
        self.state(pointer.into()).is_some_and(|s| s.blocked)
    }

    /// Restrict which layers a pointer can hit.
    pub fn set_layer_mask(&mut self, pointer: impl Into<PointerId>, layers: LayerMask) {
        if let Some(state) = self.state_mut(pointer.into()) {
            state.layers = layers;
        }
    }

    /// Set the max hit distance of a pointer.
    ///
    /// NaN and non-positive lengths are ignored, matching the check
    /// [`RouterConfig::validate`] applies to the default length.
    pub fn set_pointer_length(&mut self, pointer: impl Into<PointerId>, length: f32) {
        let pointer = pointer.into();
        if length.is_nan() || length <= 0.0 {
            tracing::warn!(?pointer, length, "ignoring invalid pointer length");
            return;
        }
        if let Some(state) = self.state_mut(pointer) {
            state.record.data.pointer_length = length;
        }
    }

    /// Release a pointer's press and drag now (no click) and exit its hover.
    ///
    /// Safe mid-drag, mid-press, and over destroyed nodes.
    pub fn end_interaction(&mut self, pointer: impl Into<PointerId>, scene: &Scene) {
        let pointer = pointer.into();
        let Self {
            rays,
            index,
            screen,
            feedback,
            events,
            ..
        } = self;
        let state = match (pointer, screen) {
            (PointerId::Ray(id), _) => match index.get(&id) {
                Some(&i) => Some(&mut rays[i].state),
                None => None,
            },
            (PointerId::Screen, Some(entry)) => Some(&mut entry.state),
            (PointerId::Screen, None) => None,
        };
        if let Some(state) = state {
            tracing::debug!(?pointer, "interaction ended");
            teardown(scene, state, feedback, events);
        }
    }

    // --- queries ---

    /// A pointer's event record.
    pub fn event_record(&self, pointer: impl Into<PointerId>) -> Option<&PointerEventRecord> {
        self.state(pointer.into()).map(|s| &s.record)
    }

    /// The screen pointer's event record.
    pub fn screen_event_record(&self) -> Option<&PointerEventRecord> {
        self.event_record(PointerId::Screen)
    }

    /// Deepest node a pointer hovers.
    pub fn hovered(&self, pointer: impl Into<PointerId>) -> Option<NodeId> {
        self.event_record(pointer)?.data.pointer_enter
    }

    /// Node a pointer is dragging.
    pub fn dragged(&self, pointer: impl Into<PointerId>) -> Option<NodeId> {
        self.event_record(pointer)?.data.dragged()
    }

    /// Whether a pointer's current hit is a live node on an interactive layer.
    pub fn is_hovering_interactive(&self, pointer: impl Into<PointerId>, scene: &Scene) -> bool {
        self.event_record(pointer)
            .and_then(|r| r.data.current_raycast.node)
            .and_then(|n| scene.layer(n))
            .is_some_and(|layer| self.config.interactive_layers.contains(layer))
    }

    /// Input actions the router consumed for a pointer during the last tick.
    pub fn claimed(&self, pointer: impl Into<PointerId>) -> InputActions {
        match pointer.into() {
            PointerId::Ray(id) => self.entry(id).map(|e| e.source.claimed()),
            PointerId::Screen => self.screen.as_ref().map(|s| s.source.claimed()),
        }
        .unwrap_or_default()
    }

    /// Scroll handler a pointer currently advertises a scroll hint for.
    pub fn scroll_hint_target(&self, pointer: impl Into<PointerId>) -> Option<NodeId> {
        self.state(pointer.into())?.scroll_hint.as_ref().map(|h| h.0)
    }

    // --- feedback ---

    /// Outstanding feedback requests.
    pub fn feedback(&self) -> &FeedbackQueue {
        &self.feedback
    }

    /// Outstanding feedback requests, for other subsystems to add or clear their own.
    pub fn feedback_mut(&mut self) -> &mut FeedbackQueue {
        &mut self.feedback
    }

    // --- events ---

    /// Events emitted since the last drain, oldest first.
    ///
    /// Events from several ticks (and from teardowns between ticks) pile up
    /// here until [`Router::drain_events`] is called.
    pub fn events(&self) -> &[RayEvent] {
        &self.events
    }

    /// Take every buffered event, oldest first.
    pub fn drain_events(&mut self) -> alloc::vec::Drain<'_, RayEvent> {
        self.events.drain(..)
    }

    // --- tick ---

    /// Run one frame of input processing for every pointer.
    ///
    /// `now` is a monotonic timestamp used for multi-click timing.
    pub fn tick(&mut self, scene: &mut Scene, raycasters: &mut [&mut dyn Raycaster], now: Duration) {
        let Self {
            rays,
            screen,
            config,
            feedback,
            hit_tester,
            events,
            retired,
            ..
        } = self;
        retire(scene, retired, feedback, events);
        let mut pipeline = Pipeline {
            config,
            feedback,
            hits: hit_tester,
            events,
        };
        for entry in rays.iter_mut() {
            tick_pointer(&mut entry.source, &mut entry.state, &mut pipeline, scene, raycasters, now);
        }
        if let Some(entry) = screen.as_mut() {
            tick_pointer(&mut entry.source, &mut entry.state, &mut pipeline, scene, raycasters, now);
        }
    }

    // --- internals ---

    fn entry(&self, id: RayId) -> Option<&RayEntry> {
        self.index.get(&id).map(|&i| &self.rays[i])
    }

    fn state(&self, pointer: PointerId) -> Option<&PointerState> {
        match pointer {
            PointerId::Ray(id) => self.entry(id).map(|e| &e.state),
            PointerId::Screen => self.screen.as_ref().map(|s| &s.state),
        }
    }

    fn state_mut(&mut self, pointer: PointerId) -> Option<&mut PointerState> {
        match pointer {
            PointerId::Ray(id) => {
                let i = *self.index.get(&id)?;
                Some(&mut self.rays[i].state)
            }
            PointerId::Screen => self.screen.as_mut().map(|s| &mut s.state),
        }
    }
}

/// One pointer's pass through the pipeline.
fn tick_pointer<S: InputSource>(
    source: &mut S,
    state: &mut PointerState,
    p: &mut Pipeline<'_>,
    scene: &mut Scene,
    raycasters: &mut [&mut dyn Raycaster],
    now: Duration,
) {
    source.begin_tick();
    if !source.is_active() && !press::is_engaged(&state.record) {
        source.end_tick();
        return;
    }

    let record = &mut state.record;
    let previous = record.data.position;
    record.reset_transient();
    let aim = source.aim();
    let filter = HitFilter {
        max_distance: record.data.pointer_length,
        layers: state.layers,
        mode: source.selection_mode(),
    };
    let hit = p.hits.test(scene, raycasters, record.data.pointer, aim, filter);
    record.data.current_raycast = hit;
    match aim {
        Aim::Screen(position) => record.data.position = position,
        Aim::Ray { .. } if hit.is_valid() => record.data.position = hit.screen_position,
        Aim::Ray { .. } => {}
    }
    record.data.delta = record.data.position - previous;

    let valid = source.is_active()
        && !state.blocked
        && !state.marked
        && state.validity.as_ref().is_none_or(|accepts| accepts(hit.node));

    if valid {
        hover::reconcile(scene, record, hit.node, false, p.events);
    } else {
        hover::reconcile(scene, record, None, true, p.events);
    }

    if valid
        && source.select_just_pressed()
        && press::press(scene, record, p.config, now, p.events)
    {
        source.claim(InputActions::SELECT);
    }
    if valid {
        press::drag(scene, record, p.config, p.events);
    }
    if source.select_just_released() {
        press::release(scene, record, true, p.events);
    }

    if valid {
        let delta = source.scroll_delta();
        if scroll::scroll(
            scene,
            record,
            delta,
            p.config,
            p.feedback,
            &mut state.scroll_hint,
            p.events,
        ) {
            source.claim(InputActions::SCROLL);
        }
    } else {
        scroll::withdraw(p.feedback, &mut state.scroll_hint);
    }

    source.end_tick();
}

/// End a pointer's interaction outside the tick.
fn teardown(
    scene: &Scene,
    state: &mut PointerState,
    feedback: &mut FeedbackQueue,
    events: &mut Vec<RayEvent>,
) {
    press::release(scene, &mut state.record, false, events);
    hover::reconcile(scene, &mut state.record, None, true, events);
    scroll::withdraw(feedback, &mut state.scroll_hint);
}

/// Tear down every state displaced by re-registration.
fn retire(
    scene: &Scene,
    retired: &mut Vec<PointerState>,
    feedback: &mut FeedbackQueue,
    events: &mut Vec<RayEvent>,
) {
    for mut state in retired.drain(..) {
        tracing::debug!(pointer = ?state.record.data.pointer, "retired state torn down");
        teardown(scene, &mut state, feedback, events);
    }
}
