// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrap-flow placement of uniform items inside a container.

use kurbo::{Point, Rect, Size};

use crate::Error;

/// Lays fixed-size items out left to right, wrapping into rows, inside a
/// container anchored at the origin.
///
/// Every row holds at least one item, so an item wider than the container
/// still gets a row of its own (and overflows it).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowLayout {
    container: Size,
    item: Size,
}

impl FlowLayout {
    /// Creates a layout. The item size must be finite and positive on both axes.
    pub fn new(container: Size, item: Size) -> Result<Self, Error> {
        if !(item.width.is_finite() && item.height.is_finite())
            || item.width <= 0.0
            || item.height <= 0.0
        {
            return Err(Error::InvalidItemSize { size: item });
        }
        Ok(Self {
            container: clamp_size(container),
            item,
        })
    }

    /// Container size.
    pub const fn container(&self) -> Size {
        self.container
    }

    /// Item size.
    pub const fn item(&self) -> Size {
        self.item
    }

    /// Resizes the container. Negative extents are clamped to zero.
    pub fn set_container(&mut self, container: Size) {
        debug_assert!(
            container.width.is_finite() && container.height.is_finite(),
            "FlowLayout container must be finite; got {container:?}"
        );
        self.container = clamp_size(container);
    }

    /// Container bounds.
    pub fn container_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.container)
    }

    /// Items per row; never zero.
    pub fn per_row(&self) -> usize {
        whole_items(self.container.width, self.item.width).max(1)
    }

    /// Bounds of the item laid out at `slot`.
    pub fn slot_rect(&self, slot: usize) -> Rect {
        let per_row = self.per_row();
        let (row, col) = (slot / per_row, slot % per_row);
        let origin = Point::new(
            col as f64 * self.item.width,
            row as f64 * self.item.height,
        );
        Rect::from_origin_size(origin, self.item)
    }

    /// How many items lie wholly inside the container.
    pub fn capacity(&self) -> usize {
        whole_items(self.container.width, self.item.width)
            * whole_items(self.container.height, self.item.height)
    }
}

fn clamp_size(size: Size) -> Size {
    Size::new(size.width.max(0.0), size.height.max(0.0))
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Both extents are non-negative; truncation is the floor"
)]
fn whole_items(extent: f64, item: f64) -> usize {
    (extent / item) as usize
}
