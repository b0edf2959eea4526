// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_fit_probe --heading-base-level=0

//! Understory Fit Probe: how many fixed-size items fit in a container?
//!
//! ## Overview
//!
//! Instead of measuring, this crate asks the host. A probe item is placed
//! among the candidates and observed against the container with
//! [`understory_visibility`]. The answer to "is the probe fully visible?"
//! halves the range of possible counts, the probe moves, and the process
//! repeats until the count is known. For `len` items that takes at most
//! `ceil(log2(len + 1))` reports.
//!
//! - [`FitSearch`]: the pure search. Feed it [`ProbeReport`]s; it tells you
//!   where the probe goes next and, eventually, how many items fit.
//! - [`FitProbe`]: the search wired to a
//!   [`VisibilityObserver`](understory_visibility::VisibilityObserver). It
//!   renders the container, the items and the probe as
//!   [`Element`](understory_visibility::Element)s and turns sensor callbacks
//!   into reports.
//! - [`FlowHost`]: a headless host that lays children out in wrap-flow order
//!   ([`FlowLayout`]) and implements
//!   [`SensorHost`](understory_visibility::SensorHost). Handy for tests,
//!   demos, and anywhere the real host is not available.
//!
//! ## Example
//!
//! ```
//! use kurbo::Size;
//! use understory_fit_probe::{FitProbe, FitProbeConfig, FlowHost};
//!
//! let mut host = FlowHost::new(Size::new(220.0, 18.0), Size::new(40.0, 18.0)).unwrap();
//! let mut probe = FitProbe::new(FitProbeConfig::new(40));
//! assert_eq!(host.settle(&mut probe, 16).unwrap(), Some(5));
//!
//! // The container grew: start over.
//! host.resize(Size::new(410.0, 18.0));
//! probe.reset();
//! assert_eq!(host.settle(&mut probe, 16).unwrap(), Some(10));
//! ```
//!
//! Resizing never restarts the search on its own; call
//! [`FitProbe::reset`] when the container changes.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo` and `understory_visibility`.
//! - `libm`: `no_std` + `alloc` builds using `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod host;
mod layout;
mod probe;
mod search;

pub use error::Error;
pub use host::{FlowHost, FlowSensor, NodeId};
pub use layout::FlowLayout;
pub use probe::{FitProbe, FitProbeConfig, PROBE_KEY, View};
pub use search::{FitSearch, Item, Phase, Probe, ProbeReport, SearchState, Transition};
