// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;

/// Errors from the fit probe.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The visibility wrapper rejected its input.
    #[error(transparent)]
    Visibility(#[from] understory_visibility::Error),

    /// Items must have a finite, positive width and height.
    #[error("invalid item size {size:?}")]
    InvalidItemSize {
        /// The rejected size.
        size: Size,
    },
}
