// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input sources: where a pointer's aim, buttons, and scroll come from.
//!
//! The router runs one pipeline for every pointer and reads input through
//! [`InputSource`]. Two adapters are provided:
//!
//! - [`RaySource`]: a tracked device. The host writes the current ray pose and
//!   the level of its select action each frame; edges are derived per tick.
//! - [`ScreenSource`]: a mouse-like device. The host forwards native
//!   button-down/up events and a position.
//!
//! Both report which actions the router consumed through
//! [`InputSource::claimed`], so the host can keep the same press from also
//! driving, say, locomotion.

use kurbo::{Point, Vec2};
use understory_scene::SelectionFlags;

use crate::hit::{Aim, EventCamera, Ray};
use crate::types::InputActions;

/// Per-tick input snapshot consumed by the router.
///
/// `begin_tick` runs before the router reads anything and `end_tick` after it
/// is done with this source for the tick.
pub trait InputSource {
    /// Whether the device is currently tracked and usable.
    fn is_active(&self) -> bool;
    /// Select went down since the previous tick.
    fn select_just_pressed(&self) -> bool;
    /// Select went up since the previous tick.
    fn select_just_released(&self) -> bool;
    /// Scroll delta for this tick.
    fn scroll_delta(&self) -> Vec2;
    /// Which kinds of pickable nodes this source may hit.
    fn selection_mode(&self) -> SelectionFlags;
    /// Actions the router consumed during the current tick.
    fn claimed(&self) -> InputActions;
    /// Record actions the router consumed.
    fn claim(&mut self, actions: InputActions);
    /// Called at the start of every tick.
    fn begin_tick(&mut self);
    /// Called once the router is done with the source for this tick.
    fn end_tick(&mut self);
    /// Where the source points this tick.
    fn aim(&self) -> Aim<'_>;
}

/// Level-triggered button with per-tick edge detection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectButton {
    down: bool,
    was_down: bool,
}

impl SelectButton {
    /// Set the current level.
    pub fn set(&mut self, down: bool) {
        self.down = down;
    }

    /// Current level.
    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Down now, up at the previous latch.
    pub fn was_just_pressed(&self) -> bool {
        self.down && !self.was_down
    }

    /// Up now, down at the previous latch.
    pub fn was_just_released(&self) -> bool {
        !self.down && self.was_down
    }

    /// Remember the current level as the reference for the next edges.
    pub fn latch(&mut self) {
        self.was_down = self.down;
    }
}

/// A tracked device that points with a ray.
///
/// ```
/// use glam::Vec3;
/// use understory_ray_events::{InputSource, Ray, RaySource};
///
/// let mut src = RaySource::new(Ray::new(Vec3::ZERO, Vec3::NEG_Z));
/// src.set_select(true);
/// assert!(src.select_just_pressed());
/// src.end_tick();
/// assert!(!src.select_just_pressed());
/// src.set_select(false);
/// assert!(src.select_just_released());
/// ```
#[derive(Clone, Debug)]
pub struct RaySource {
    /// Current pose.
    pub ray: Ray,
    /// Dedicated camera to query with instead of the router's shared one.
    pub event_camera: Option<EventCamera>,
    /// Whether the device is tracked.
    pub active: bool,
    /// Kinds of nodes this ray may pick.
    pub mode: SelectionFlags,
    select: SelectButton,
    scroll: Vec2,
    claimed: InputActions,
}

impl RaySource {
    /// An active ray source with select released.
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            event_camera: None,
            active: true,
            mode: SelectionFlags::RAY,
            select: SelectButton::default(),
            scroll: Vec2::ZERO,
            claimed: InputActions::empty(),
        }
    }

    /// Use a dedicated camera for hit testing.
    #[must_use]
    pub fn with_event_camera(mut self, camera: EventCamera) -> Self {
        self.event_camera = Some(camera);
        self
    }

    /// Set the select action level.
    pub fn set_select(&mut self, down: bool) {
        self.select.set(down);
    }

    /// The select action.
    pub fn select(&self) -> SelectButton {
        self.select
    }

    /// Set the scroll axes for the next tick.
    pub fn set_scroll(&mut self, delta: Vec2) {
        self.scroll = delta;
    }
}

impl Default for RaySource {
    fn default() -> Self {
        Self::new(Ray::default())
    }
}

impl InputSource for RaySource {
    fn is_active(&self) -> bool {
        self.active
    }

    fn select_just_pressed(&self) -> bool {
        self.select.was_just_pressed()
    }

    fn select_just_released(&self) -> bool {
        self.select.was_just_released()
    }

    fn scroll_delta(&self) -> Vec2 {
        self.scroll
    }

    fn selection_mode(&self) -> SelectionFlags {
        self.mode
    }

    fn claimed(&self) -> InputActions {
        self.claimed
    }

    fn claim(&mut self, actions: InputActions) {
        self.claimed |= actions;
    }

    fn begin_tick(&mut self) {
        self.claimed = InputActions::empty();
    }

    fn end_tick(&mut self) {
        self.select.latch();
        self.scroll = Vec2::ZERO;
    }

    fn aim(&self) -> Aim<'_> {
        Aim::Ray {
            ray: self.ray,
            camera: self.event_camera.as_ref(),
        }
    }
}

/// A mouse-like pointer driven by native button events.
#[derive(Clone, Debug)]
pub struct ScreenSource {
    /// Pointer position in screen space.
    pub position: Point,
    /// Whether the device is present.
    pub active: bool,
    pressed: bool,
    released: bool,
    scroll: Vec2,
    claimed: InputActions,
}

impl ScreenSource {
    /// An active screen pointer at `position`.
    pub fn new(position: Point) -> Self {
        Self {
            position,
            active: true,
            pressed: false,
            released: false,
            scroll: Vec2::ZERO,
            claimed: InputActions::empty(),
        }
    }

    /// Move the pointer.
    pub fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    /// Forward a native button-down.
    pub fn button_down(&mut self) {
        self.pressed = true;
    }

    /// Forward a native button-up.
    pub fn button_up(&mut self) {
        self.released = true;
    }

    /// Accumulate a native wheel delta.
    pub fn scroll(&mut self, delta: Vec2) {
        self.scroll += delta;
    }
}

impl Default for ScreenSource {
    fn default() -> Self {
        Self::new(Point::ZERO)
    }
}

impl InputSource for ScreenSource {
    fn is_active(&self) -> bool {
        self.active
    }

    fn select_just_pressed(&self) -> bool {
        self.pressed
    }

    fn select_just_released(&self) -> bool {
        self.released
    }

    fn scroll_delta(&self) -> Vec2 {
        self.scroll
    }

    fn selection_mode(&self) -> SelectionFlags {
        SelectionFlags::all()
    }

    fn claimed(&self) -> InputActions {
        self.claimed
    }

    fn claim(&mut self, actions: InputActions) {
        self.claimed |= actions;
    }

    fn begin_tick(&mut self) {
        self.claimed = InputActions::empty();
    }

    fn end_tick(&mut self) {
        self.pressed = false;
        self.released = false;
        self.scroll = Vec2::ZERO;
    }

    fn aim(&self) -> Aim<'_> {
        Aim::Screen(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_edges_follow_latches() {
        let mut b = SelectButton::default();
        assert!(!b.was_just_pressed() && !b.was_just_released());
        b.set(true);
        assert!(b.was_just_pressed());
        b.latch();
        assert!(b.is_down() && !b.was_just_pressed());
        b.set(false);
        assert!(b.was_just_released());
        b.latch();
        assert!(!b.was_just_released());
    }

    #[test]
    fn claims_survive_until_next_tick() {
        let mut src = RaySource::default();
        src.begin_tick();
        src.claim(InputActions::SELECT);
        src.end_tick();
        assert_eq!(src.claimed(), InputActions::SELECT);
        src.begin_tick();
        assert!(src.claimed().is_empty());
    }

    #[test]
    fn screen_events_are_one_shot() {
        let mut src = ScreenSource::default();
        src.button_down();
        src.scroll(Vec2::new(0.0, 1.0));
        src.scroll(Vec2::new(0.0, 2.0));
        assert!(src.select_just_pressed());
        assert_eq!(src.scroll_delta(), Vec2::new(0.0, 3.0));
        src.end_tick();
        assert!(!src.select_just_pressed());
        assert_eq!(src.scroll_delta(), Vec2::ZERO);
        assert!(matches!(src.aim(), Aim::Screen(p) if p == Point::ZERO));
    }
}
