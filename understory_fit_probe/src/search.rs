// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fit search: a pure reducer over probe visibility reports.
//!
//! The answer is the number of items `k` in `0..=len` that fit. The search
//! keeps `low <= k < high`, starting from `low = 0`, `high = len + 1`, and
//! tests `current = low + (high - low) / 2` by placing the probe in slot
//! `current - 1` (so `current - 1` items precede it). A visible probe means
//! `current` slots fit and `low` moves up to `current`; a clipped probe moves
//! `high` down to `current`. Once `high - low <= 1` the answer is `low`.
//!
//! Every placement has an epoch. Reports carry the epoch they were observed
//! under, and anything that does not match the current placement is ignored.

use alloc::vec::Vec;

/// Search bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SearchState {
    /// Inclusive lower bound on the fitting count.
    pub low: usize,
    /// Exclusive upper bound on the fitting count.
    pub high: usize,
    /// Count under test (or, once resolved, the last count tested).
    pub current: usize,
}

impl SearchState {
    fn initial(len: usize) -> Self {
        let (low, high) = (0, len + 1);
        Self {
            low,
            high,
            current: midpoint(low, high),
        }
    }

    /// Whether the bounds have converged.
    pub const fn is_converged(&self) -> bool {
        self.high - self.low <= 1
    }
}

const fn midpoint(low: usize, high: usize) -> usize {
    low + (high - low) / 2
}

/// Where the search is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for reports on the current placement.
    Searching,
    /// Converged; reports are ignored until [`FitSearch::reset`].
    Resolved,
}

/// A visibility report for the probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProbeReport {
    /// Placement epoch the report was observed under.
    pub epoch: u64,
    /// Whether the probe was reported inside the container.
    pub intersecting: bool,
}

/// Outcome of [`FitSearch::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Stale, duplicate, or post-resolution report; nothing changed.
    Ignored,
    /// Bounds narrowed and the probe moved to `slot`.
    Moved {
        /// New probe slot.
        slot: usize,
    },
    /// The search converged.
    Resolved {
        /// Number of items that fit.
        count: usize,
    },
}

/// One candidate item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Item {
    /// Position in the collection; stable.
    pub index: usize,
    /// Layout rank; reassigned whenever the probe moves.
    pub visual_position: usize,
}

/// The movable comparison item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Probe {
    /// Layout rank; equal to the number of items laid out before it.
    pub visual_position: usize,
    /// The answer, once the search converged.
    pub resolved_position: Option<usize>,
}

/// Binary search for the number of fixed-size items that fit.
///
/// ```
/// use understory_fit_probe::{FitSearch, ProbeReport, Transition};
///
/// // Pretend 3 of 10 items fit: the probe is visible iff it sits in slot < 3.
/// let mut search = FitSearch::new(10);
/// while search.resolved().is_none() {
///     let report = ProbeReport {
///         epoch: search.epoch(),
///         intersecting: search.probe_slot() < 3,
///     };
///     assert_ne!(search.apply(report), Transition::Ignored);
/// }
/// assert_eq!(search.resolved(), Some(3));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FitSearch {
    len: usize,
    state: SearchState,
    resolved: Option<usize>,
    epoch: u64,
}

impl FitSearch {
    /// Starts a search over `len` items.
    ///
    /// An empty collection is resolved at 0 straight away.
    pub fn new(len: usize) -> Self {
        let mut search = Self {
            len,
            state: SearchState::initial(len),
            resolved: None,
            epoch: 0,
        };
        search.start();
        search
    }

    fn start(&mut self) {
        self.state = SearchState::initial(self.len);
        self.resolved = None;
        if self.len == 0 {
            self.resolved = Some(0);
        }
    }

    /// Number of items in the collection.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the collection is empty.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current bounds.
    pub const fn state(&self) -> SearchState {
        self.state
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        if self.resolved.is_some() {
            Phase::Resolved
        } else {
            Phase::Searching
        }
    }

    /// The answer, once resolved.
    pub const fn resolved(&self) -> Option<usize> {
        self.resolved
    }

    /// Epoch of the current probe placement.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of items laid out before the probe.
    ///
    /// While searching this is `current - 1`; once resolved the probe is
    /// pinned right after the items that fit.
    pub const fn probe_slot(&self) -> usize {
        match self.resolved {
            Some(count) => count,
            None => self.state.current - 1,
        }
    }

    /// The probe as it should be laid out now.
    pub const fn probe(&self) -> Probe {
        Probe {
            visual_position: self.probe_slot(),
            resolved_position: self.resolved,
        }
    }

    /// Every item with its layout rank for the current probe slot.
    ///
    /// Items before the probe keep their index as rank; the rest move up by one.
    pub fn items(&self) -> Vec<Item> {
        let slot = self.probe_slot();
        (0..self.len)
            .map(|index| Item {
                index,
                visual_position: if index < slot { index } else { index + 1 },
            })
            .collect()
    }

    /// Feeds one report through the search.
    pub fn apply(&mut self, report: ProbeReport) -> Transition {
        if self.resolved.is_some() {
            tracing::trace!(target: "understory_fit_probe", "resolved; ignoring report");
            return Transition::Ignored;
        }
        if report.epoch != self.epoch {
            tracing::trace!(
                target: "understory_fit_probe",
                stale = report.epoch,
                current = self.epoch,
                "ignoring report from an earlier placement"
            );
            return Transition::Ignored;
        }

        let tested = self.state.current;
        if report.intersecting {
            self.state.low = tested;
        } else {
            self.state.high = tested;
        }
        self.epoch += 1;

        if self.state.is_converged() {
            let count = self.state.low;
            self.resolved = Some(count);
            tracing::debug!(target: "understory_fit_probe", count, len = self.len, "fit resolved");
            return Transition::Resolved { count };
        }
        self.state.current = midpoint(self.state.low, self.state.high);
        tracing::trace!(
            target: "understory_fit_probe",
            low = self.state.low,
            high = self.state.high,
            current = self.state.current,
            "probe moved"
        );
        Transition::Moved {
            slot: self.probe_slot(),
        }
    }

    /// Restarts the search from scratch; valid in any phase.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.start();
        tracing::debug!(target: "understory_fit_probe", len = self.len, "fit search reset");
    }

    /// Replaces the collection length and restarts the search.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.reset();
    }
}
