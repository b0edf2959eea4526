// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host sensor primitive the wrapper drives, and the records it delivers.

use alloc::boxed::Box;

use kurbo::Rect;

use crate::config::{RootMargin, Thresholds};

/// One intersection record for an observed target.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<N> {
    /// The observed node.
    pub target: N,
    /// Whether the target counts as inside the root (see [`IntersectionEntry::measure`]).
    pub is_intersecting: bool,
    /// Visible fraction of the target's area, `0.0..=1.0`.
    pub intersection_ratio: f64,
    /// Target bounds.
    pub bounding_rect: Rect,
    /// Visible part of the target; zero-sized when it is fully clipped.
    pub intersection_rect: Rect,
    /// Root bounds after the root margin was applied, if the host knows them.
    pub root_bounds: Option<Rect>,
}

impl<N> IntersectionEntry<N> {
    /// Builds a record from target and root geometry.
    ///
    /// The target counts as intersecting when its visible ratio reaches the
    /// smallest threshold. A smallest threshold of `0.0` means any overlap,
    /// including touching edges.
    pub fn measure(target: N, bounds: Rect, root: Rect, thresholds: &Thresholds) -> Self {
        let overlaps =
            bounds.x0 <= root.x1 && bounds.x1 >= root.x0 && bounds.y0 <= root.y1 && bounds.y1 >= root.y0;
        let clipped = bounds.intersect(root);
        let area = bounds.area();
        let intersection_ratio = if !overlaps {
            0.0
        } else if area > 0.0 {
            (clipped.area() / area).clamp(0.0, 1.0)
        } else {
            // Zero-area targets are either wholly inside or wholly outside.
            1.0
        };
        let min = thresholds.min();
        let is_intersecting = if min == 0.0 {
            overlaps
        } else {
            intersection_ratio >= min
        };
        Self {
            target,
            is_intersecting,
            intersection_ratio,
            bounding_rect: bounds,
            intersection_rect: if overlaps { clipped } else { Rect::ZERO },
            root_bounds: Some(root),
        }
    }
}

/// Options passed to [`SensorHost::create`].
#[derive(Clone, Debug, PartialEq)]
pub struct SensorOptions<N> {
    /// Node whose bounds define the visible area.
    pub root: N,
    /// Margin applied to the root's bounds.
    pub root_margin: RootMargin,
    /// Ratios at which the host reports.
    pub thresholds: Thresholds,
}

/// Callback a host invokes with a batch of records.
pub type BatchCallback<N> = Box<dyn FnMut(&[IntersectionEntry<N>])>;

/// A host-provided visibility sensor primitive.
///
/// The host measures geometry on its own schedule and invokes the callback
/// given to [`create`](SensorHost::create) with batches of records. Delivery
/// order is preserved per sensor; nothing is promised across a
/// [`disconnect`](SensorHost::disconnect), and a host may still deliver a
/// batch it had queued before the disconnect.
pub trait SensorHost<N> {
    /// Handle to one live sensor.
    type Sensor;

    /// Creates a sensor that reports to `callback`.
    fn create(&mut self, callback: BatchCallback<N>, options: SensorOptions<N>) -> Self::Sensor;

    /// Starts observing `target`.
    fn observe(&mut self, sensor: &Self::Sensor, target: &N);

    /// Stops the sensor and releases it.
    fn disconnect(&mut self, sensor: Self::Sensor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_inside_meets_full_threshold() {
        let root = Rect::new(0.0, 0.0, 220.0, 18.0);
        let e = IntersectionEntry::measure(1_u32, Rect::new(160.0, 0.0, 200.0, 18.0), root, &Thresholds::default());
        assert!(e.is_intersecting);
        assert_eq!(e.intersection_ratio, 1.0);
        assert_eq!(e.intersection_rect, e.bounding_rect);
    }

    #[test]
    fn partially_clipped_misses_full_threshold() {
        let root = Rect::new(0.0, 0.0, 220.0, 18.0);
        let bounds = Rect::new(200.0, 0.0, 240.0, 18.0);
        let e = IntersectionEntry::measure(1_u32, bounds, root, &Thresholds::default());
        assert!(!e.is_intersecting);
        assert_eq!(e.intersection_ratio, 0.5);

        let any = Thresholds::single(0.0).unwrap();
        assert!(IntersectionEntry::measure(1_u32, bounds, root, &any).is_intersecting);
    }

    #[test]
    fn disjoint_target_is_not_intersecting() {
        let root = Rect::new(0.0, 0.0, 220.0, 18.0);
        let e = IntersectionEntry::measure(
            1_u32,
            Rect::new(0.0, 18.5, 40.0, 36.5),
            root,
            &Thresholds::single(0.0).unwrap(),
        );
        assert!(!e.is_intersecting);
        assert_eq!(e.intersection_ratio, 0.0);
        assert_eq!(e.intersection_rect, Rect::ZERO);
    }
}
