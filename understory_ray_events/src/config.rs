// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router configuration.

use alloc::string::String;
use core::time::Duration;

use understory_feedback::{ControlId, OwnerId};
use understory_scene::LayerMask;

use crate::error::ConfigError;

/// Tunables shared by every pointer a [`Router`](crate::Router) drives.
///
/// Construct with [`RouterConfig::default`] and adjust with the `with_*` setters.
///
/// ```
/// use core::time::Duration;
/// use understory_ray_events::RouterConfig;
///
/// let cfg = RouterConfig::default()
///     .with_drag_threshold(4.0)
///     .with_double_click_window(Duration::from_millis(100), Duration::from_millis(400));
/// assert!(cfg.validate().is_ok());
///
/// let bad = RouterConfig::default().with_drag_threshold(-1.0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RouterConfig {
    /// Shortest gap between two presses that still counts as a multi-click (inclusive).
    pub double_click_min: Duration,
    /// Longest gap between two presses that still counts as a multi-click (inclusive).
    pub double_click_max: Duration,
    /// Distance from the press position before a drag begins.
    ///
    /// Zero begins dragging on the press tick.
    pub drag_threshold: f64,
    /// Default max hit distance for newly registered rays.
    pub pointer_length: f32,
    /// Layers that count as interactive for
    /// [`Router::is_hovering_interactive`](crate::Router::is_hovering_interactive).
    pub interactive_layers: LayerMask,
    /// Owner of the feedback requests the router raises itself.
    pub feedback_owner: OwnerId,
    /// Control highlighted by the scroll hint.
    pub scroll_feedback_control: ControlId,
    /// Text shown with the scroll hint.
    pub scroll_feedback_text: String,
    /// Priority of the scroll hint.
    pub scroll_feedback_priority: i32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            double_click_min: Duration::from_millis(150),
            double_click_max: Duration::from_millis(300),
            drag_threshold: 10.0,
            pointer_length: 10.0,
            interactive_layers: LayerMask::ALL,
            feedback_owner: OwnerId(0),
            scroll_feedback_control: ControlId(0),
            scroll_feedback_text: String::from("Scroll"),
            scroll_feedback_priority: 0,
        }
    }
}

impl RouterConfig {
    /// Set the inclusive double-click window.
    #[must_use]
    pub fn with_double_click_window(mut self, min: Duration, max: Duration) -> Self {
        self.double_click_min = min;
        self.double_click_max = max;
        self
    }

    /// Set the drag threshold.
    #[must_use]
    pub fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.drag_threshold = threshold;
        self
    }

    /// Set the default pointer length for new rays.
    #[must_use]
    pub fn with_pointer_length(mut self, length: f32) -> Self {
        self.pointer_length = length;
        self
    }

    /// Set the interactive layer filter.
    #[must_use]
    pub fn with_interactive_layers(mut self, layers: LayerMask) -> Self {
        self.interactive_layers = layers;
        self
    }

    /// Describe the scroll hint feedback request.
    #[must_use]
    pub fn with_scroll_feedback(
        mut self,
        owner: OwnerId,
        control: ControlId,
        text: impl Into<String>,
        priority: i32,
    ) -> Self {
        self.feedback_owner = owner;
        self.scroll_feedback_control = control;
        self.scroll_feedback_text = text.into();
        self.scroll_feedback_priority = priority;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.double_click_min > self.double_click_max {
            return Err(ConfigError::DoubleClickWindow {
                min: self.double_click_min,
                max: self.double_click_max,
            });
        }
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            return Err(ConfigError::DragThreshold(self.drag_threshold));
        }
        if self.pointer_length.is_nan() || self.pointer_length <= 0.0 {
            return Err(ConfigError::PointerLength(self.pointer_length));
        }
        Ok(())
    }

    /// Whether a press `elapsed` after the previous one continues a multi-click.
    pub(crate) fn within_double_click(&self, elapsed: Duration) -> bool {
        (self.double_click_min..=self.double_click_max).contains(&elapsed)
    }
}
