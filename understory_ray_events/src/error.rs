// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.

use core::time::Duration;

/// A [`RouterConfig`](crate::RouterConfig) value the router refuses to run with.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The double-click window is inverted.
    #[error("double-click window is empty: min {min:?} > max {max:?}")]
    DoubleClickWindow {
        /// Configured lower bound.
        min: Duration,
        /// Configured upper bound.
        max: Duration,
    },
    /// The drag threshold is negative, infinite, or NaN.
    #[error("drag threshold must be finite and non-negative, got {0}")]
    DragThreshold(f64),
    /// The pointer length is zero, negative, or NaN.
    #[error("pointer length must be positive, got {0}")]
    PointerLength(f32),
}
