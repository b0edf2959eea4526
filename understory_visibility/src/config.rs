// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sensor configuration: root margin and intersection thresholds.

use core::fmt;
use core::str::FromStr;

use kurbo::Rect;
use smallvec::SmallVec;

use crate::error::{Error, MarginErrorKind};

/// One side of a [`RootMargin`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Absolute length in logical pixels.
    Px(f64),
    /// Percentage of the root's extent along the same axis.
    Percent(f64),
}

impl Length {
    /// Resolves this length against `basis` (the root's width or height).
    pub fn resolve(self, basis: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }

    fn parse(token: &str, input: &str) -> Result<Self, Error> {
        let (number, ctor): (&str, fn(f64) -> Self) = if let Some(n) = token.strip_suffix("px") {
            (n, Self::Px)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, Self::Percent)
        } else if token == "0" {
            return Ok(Self::Px(0.0));
        } else {
            return Err(Error::margin(input, MarginErrorKind::Unit));
        };
        match number.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(ctor(value)),
            _ => Err(Error::margin(input, MarginErrorKind::Number)),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Growth (or, when negative, shrinkage) applied to the root's bounds before
/// intersections are computed.
///
/// Parsed from the familiar one-to-four component shorthand:
///
/// ```
/// use understory_visibility::{Length, RootMargin};
///
/// let m: RootMargin = "10px 5%".parse().unwrap();
/// assert_eq!(m.top, Length::Px(10.0));
/// assert_eq!(m.left, Length::Percent(5.0));
/// assert_eq!(RootMargin::default(), "0px".parse().unwrap());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    /// Top edge.
    pub top: Length,
    /// Right edge.
    pub right: Length,
    /// Bottom edge.
    pub bottom: Length,
    /// Left edge.
    pub left: Length,
}

impl RootMargin {
    /// No margin.
    pub const ZERO: Self = Self::uniform(Length::Px(0.0));

    /// The same length on every side.
    pub const fn uniform(length: Length) -> Self {
        Self {
            top: length,
            right: length,
            bottom: length,
            left: length,
        }
    }

    /// Parses `"<top> [<right> [<bottom> [<left>]]]"`.
    ///
    /// Missing sides follow the usual shorthand: right defaults to top,
    /// bottom to top, and left to right.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let mut parts: SmallVec<[Length; 4]> = SmallVec::new();
        for token in input.split_ascii_whitespace() {
            if parts.len() == 4 {
                return Err(Error::margin(input, MarginErrorKind::ComponentCount));
            }
            parts.push(Length::parse(token, input)?);
        }
        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return Err(Error::margin(input, MarginErrorKind::ComponentCount)),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Returns `root` grown by this margin. Percentages resolve against the
    /// root's width (left/right) and height (top/bottom).
    pub fn apply(&self, root: Rect) -> Rect {
        let w = root.width();
        let h = root.height();
        Rect::new(
            root.x0 - self.left.resolve(w),
            root.y0 - self.top.resolve(h),
            root.x1 + self.right.resolve(w),
            root.y1 + self.bottom.resolve(h),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Visible-ratio thresholds at which a sensor reports, sorted ascending.
///
/// Never empty; every value lies in `0.0..=1.0`. The default is a single
/// `1.0`: report only when the target becomes fully visible or stops being so.
#[derive(Clone, Debug, PartialEq)]
pub struct Thresholds(SmallVec<[f64; 1]>);

impl Thresholds {
    /// Validates, sorts and deduplicates `values`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self, Error> {
        let mut list: SmallVec<[f64; 1]> = SmallVec::new();
        for value in values {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ThresholdOutOfRange { value });
            }
            list.push(value);
        }
        if list.is_empty() {
            return Err(Error::EmptyThresholds);
        }
        list.sort_by(f64::total_cmp);
        list.dedup();
        Ok(Self(list))
    }

    /// A single threshold.
    pub fn single(value: f64) -> Result<Self, Error> {
        Self::new([value])
    }

    /// The thresholds, ascending.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Smallest threshold; the ratio a target needs to count as intersecting.
    pub fn min(&self) -> f64 {
        self.0.first().copied().unwrap_or(0.0)
    }

    /// Number of thresholds at or below `ratio`.
    ///
    /// Hosts compare this between measurements to decide whether a threshold
    /// was crossed.
    pub fn band(&self, ratio: f64) -> usize {
        self.0.iter().take_while(|t| **t <= ratio).count()
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self(smallvec::smallvec![1.0])
    }
}
