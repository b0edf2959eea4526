// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_visibility --heading-base-level=0

//! Understory Visibility: attach a host visibility sensor to a single child.
//!
//! ## Overview
//!
//! UI hosts usually offer some primitive that reports whether a node's box
//! intersects a reference viewport: construct it with a callback and a
//! configuration, observe a node, disconnect it later. This crate wraps that
//! primitive for one child element so callers get a single callback with the
//! latest intersection record, without giving up the child's own node
//! reference and without touching layout.
//!
//! The crate does not render anything or measure geometry. It describes the
//! child with a small [`Element`] value and drives the host through the
//! [`SensorHost`] trait.
//!
//! ## Pieces
//!
//! - [`NodeSlot`] and [`RefSink`]: where a host writes the node an element
//!   rendered to. [`compose_refs`] fans one write out to several sinks, so the
//!   child's own reference and the wrapper's tracker both see the node.
//! - [`ElementKind`] and [`RefSupport`]: capability check for whether a child
//!   can take an external node reference. Memoised wrappers are looked through.
//! - [`RootMargin`] and [`Thresholds`]: sensor configuration, with the usual
//!   defaults of `"0px"` and `1.0`.
//! - [`VisibilityObserver`]: the wrapper. It keeps at most one sensor alive,
//!   rebuilds it when its inputs change, and drops batches that arrive from a
//!   sensor it already tore down.
//!
//! ## Operating modes
//!
//! - **Observing**: root, margin, thresholds, callback and a mounted node are
//!   all present and the wrapper is not disabled.
//! - **Dormant**: any prerequisite is missing or the wrapper is disabled. No
//!   sensor exists; this is not an error.
//! - **Degraded**: the child cannot take a node reference. It is passed
//!   through untouched and never observed.
//!
//! Supplying anything but exactly one child is the only error
//! ([`Error::ChildCount`]).
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` + `alloc` builds using `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod element;
mod error;
mod host;
mod node_ref;
mod observer;

pub use config::{Length, RootMargin, Thresholds};
pub use element::{ChildIdentity, Element, ElementKind, Key, RefSupport, only_child};
pub use error::{Error, MarginErrorKind};
pub use host::{BatchCallback, IntersectionEntry, SensorHost, SensorOptions};
pub use node_ref::{NodeSlot, RefCallback, RefSink, compose_refs, fill_ref};
pub use observer::{
    ConfigChange, ObserverProps, SensorStats, VisibilityCallback, VisibilityObserver,
};
