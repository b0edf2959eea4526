// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the visibility wrapper and its configuration.

use alloc::string::String;

/// Errors raised while rendering the wrapper or parsing sensor configuration.
///
/// Only configuration problems are errors. A child that cannot take a node
/// reference, a missing root or callback, and callbacks from torn-down sensors
/// are all handled silently by [`VisibilityObserver`](crate::VisibilityObserver).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The wrapper was given something other than exactly one child.
    #[error("expected exactly one child element, found {found}")]
    ChildCount {
        /// Number of children that were supplied.
        found: usize,
    },

    /// A root margin string could not be parsed.
    #[error("invalid root margin `{input}`: {reason}")]
    InvalidRootMargin {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: MarginErrorKind,
    },

    /// A threshold outside `0.0..=1.0` (or NaN).
    #[error("threshold {value} is outside 0.0..=1.0")]
    ThresholdOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// A threshold list without any entries.
    #[error("threshold list must not be empty")]
    EmptyThresholds,
}

/// Reason a root margin string was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MarginErrorKind {
    /// Fewer than one or more than four components.
    #[error("expected one to four components")]
    ComponentCount,
    /// A non-zero component without a `px` or `%` unit.
    #[error("components must end in `px` or `%`")]
    Unit,
    /// A component whose numeric part is not a finite number.
    #[error("component is not a finite number")]
    Number,
}

impl Error {
    pub(crate) fn margin(input: &str, reason: MarginErrorKind) -> Self {
        Self::InvalidRootMargin {
            input: input.into(),
            reason,
        }
    }
}
