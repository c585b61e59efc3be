// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_feedback --heading-base-level=0

//! Understory Feedback: bookkeeping for supplementary UI affordances.
//!
//! Interactive systems often need to show _hints_ next to the primary event
//! stream: "you can scroll here", a highlighted trigger, a tooltip on a
//! controller button. Several subsystems may want to show such hints at the
//! same time, and each needs to withdraw its own hints without disturbing the
//! others. This crate tracks those outstanding requests; it does not render them.
//!
//! The core type is [`FeedbackQueue`], a set of [`FeedbackRequest`]s that is:
//!
//! - **Idempotent**: adding a request that is already queued is a no-op, and
//!   removing one that is not queued is a no-op. `add; add; remove` leaves the
//!   queue empty.
//! - **Priority ordered**: iteration yields higher priorities first, ties in
//!   insertion order.
//! - **Owner scoped**: every request names the [`OwnerId`] that raised it, and
//!   [`FeedbackQueue::clear_owner`] withdraws all of an owner's requests at once
//!   (for example when that subsystem is torn down).
//! - **Revisioned**: [`FeedbackQueue::revision`] bumps only when the contents
//!   change, so renderers can skip work when nothing happened.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_feedback::{ControlId, FeedbackQueue, FeedbackRequest, OwnerId};
//!
//! const TOOLS: OwnerId = OwnerId(1);
//! const TRIGGER: ControlId = ControlId(7);
//!
//! let mut queue = FeedbackQueue::new();
//! let hint = FeedbackRequest::new(TOOLS, TRIGGER).with_text("Grab");
//!
//! assert!(queue.add(hint.clone()));
//! assert!(!queue.add(hint.clone())); // already outstanding
//! assert_eq!(queue.len(), 1);
//!
//! assert!(queue.remove(&hint));
//! assert!(!queue.remove(&hint)); // idempotent
//! assert!(queue.is_empty());
//! ```
//!
//! ## Suppression
//!
//! A request with [`FeedbackRequest::suppress_existing`] set hides every
//! lower-priority request aimed at the same `(source, control)` pair.
//! [`FeedbackQueue::visible`] applies that rule; [`FeedbackQueue::iter`] does not.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

/// Identity of the subsystem that raised a request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct OwnerId(pub u64);

/// Identity of the input source (device, hand, pointer) a request is about.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SourceId(pub u64);

/// Identity of the control (button, stick, widget part) a request targets.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ControlId(pub u32);

/// An outstanding "show hint/highlight" request.
///
/// Two requests are the same request when all fields are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeedbackRequest {
    /// Higher priorities are listed first.
    pub priority: i32,
    /// Subsystem that raised the request.
    pub owner: OwnerId,
    /// Input source the request is about, if any.
    pub source: Option<SourceId>,
    /// Control to highlight.
    pub control: ControlId,
    /// Text to show alongside the highlight; empty for none.
    pub text: String,
    /// How long the hint should stay visible once shown; `None` until removed.
    pub duration: Option<Duration>,
    /// Hide lower-priority requests for the same source and control.
    pub suppress_existing: bool,
    /// Show the whole device body rather than just the control.
    pub show_body: bool,
}

impl FeedbackRequest {
    /// A priority-0 request with no text, no source, and no duration.
    pub fn new(owner: OwnerId, control: ControlId) -> Self {
        Self {
            priority: 0,
            owner,
            source: None,
            control,
            text: String::new(),
            duration: None,
            suppress_existing: false,
            show_body: false,
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the input source.
    #[must_use]
    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the display text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the display duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Hide lower-priority requests for the same source and control.
    #[must_use]
    pub fn suppressing(mut self) -> Self {
        self.suppress_existing = true;
        self
    }

    /// Show the whole device body.
    #[must_use]
    pub fn showing_body(mut self) -> Self {
        self.show_body = true;
        self
    }

    fn same_slot(&self, other: &Self) -> bool {
        self.source == other.source && self.control == other.control
    }
}

/// Priority-ordered set of outstanding feedback requests.
#[derive(Clone, Debug, Default)]
pub struct FeedbackQueue {
    /// Sorted by priority, descending; insertion order within a priority.
    requests: Vec<FeedbackRequest>,
    revision: u64,
}

impl FeedbackQueue {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requests: Vec::new(),
            revision: 0,
        }
    }

    /// Number of outstanding requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns `true` if nothing is outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Monotonic counter that bumps whenever the contents change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether an equal request is outstanding.
    #[must_use]
    pub fn contains(&self, request: &FeedbackRequest) -> bool {
        self.requests.contains(request)
    }

    /// Add a request. Returns `false` (and changes nothing) if an equal
    /// request is already outstanding.
    pub fn add(&mut self, request: FeedbackRequest) -> bool {
        if self.contains(&request) {
            return false;
        }
        let at = self
            .requests
            .iter()
            .position(|r| r.priority < request.priority)
            .unwrap_or(self.requests.len());
        tracing::trace!(owner = ?request.owner, control = ?request.control, at, "feedback request added");
        self.requests.insert(at, request);
        self.bump();
        true
    }

    /// Remove a request. Returns `false` if no equal request was outstanding.
    pub fn remove(&mut self, request: &FeedbackRequest) -> bool {
        let before = self.requests.len();
        self.requests.retain(|r| r != request);
        let removed = self.requests.len() != before;
        if removed {
            tracing::trace!(owner = ?request.owner, control = ?request.control, "feedback request removed");
            self.bump();
        }
        removed
    }

    /// Remove every request raised by `owner`, returning how many were removed.
    pub fn clear_owner(&mut self, owner: OwnerId) -> usize {
        let before = self.requests.len();
        self.requests.retain(|r| r.owner != owner);
        let removed = before - self.requests.len();
        if removed > 0 {
            tracing::debug!(?owner, removed, "feedback requests cleared");
            self.bump();
        }
        removed
    }

    /// Remove every request.
    pub fn clear(&mut self) {
        if !self.requests.is_empty() {
            self.requests.clear();
            self.bump();
        }
    }

    /// All outstanding requests, highest priority first.
    pub fn iter(&self) -> impl Iterator<Item = &FeedbackRequest> + '_ {
        self.requests.iter()
    }

    /// Outstanding requests that are not hidden by a higher-priority
    /// suppressing request for the same source and control.
    pub fn visible(&self) -> impl Iterator<Item = &FeedbackRequest> + '_ {
        self.requests.iter().enumerate().filter_map(|(i, r)| {
            let hidden = self.requests[..i]
                .iter()
                .any(|h| h.suppress_existing && h.priority > r.priority && h.same_slot(r));
            (!hidden).then_some(r)
        })
    }

    /// The highest-priority visible request for a source and control.
    #[must_use]
    pub fn top_for(&self, source: Option<SourceId>, control: ControlId) -> Option<&FeedbackRequest> {
        self.visible()
            .find(|r| r.source == source && r.control == control)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
