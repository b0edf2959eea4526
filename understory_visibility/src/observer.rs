// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The single-child visibility wrapper.
//!
//! [`VisibilityObserver`] splits its work the way a component does:
//!
//! - [`render`](VisibilityObserver::render) inspects the one child, merges
//!   the wrapper's node tracker into the child's own reference, and returns
//!   the decorated child for the host to mount.
//! - [`commit`](VisibilityObserver::commit) runs after the host has mounted
//!   it. If any input changed since the last commit, the active sensor is
//!   torn down and, when every prerequisite is present, a new one is created
//!   and pointed at the tracked node.
//! - [`unmount`](VisibilityObserver::unmount) tears the sensor down.
//!
//! Each sensor registration gets a fresh generation. Batches the host
//! delivers after that generation was torn down are dropped before they reach
//! the caller's callback.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use crate::config::{RootMargin, Thresholds};
use crate::element::{ChildIdentity, Element, RefSupport, only_child};
use crate::host::{BatchCallback, IntersectionEntry, SensorHost, SensorOptions};
use crate::node_ref::{NodeSlot, RefSink, compose_refs};
use crate::Error;

/// Callback receiving the most recent intersection record for the observed node.
pub type VisibilityCallback<N> = Rc<dyn Fn(&IntersectionEntry<N>)>;

bitflags::bitflags! {
    /// Which inputs changed between two commits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ConfigChange: u8 {
        /// The root node.
        const ROOT      = 0b0000_0001;
        /// The root margin.
        const MARGIN    = 0b0000_0010;
        /// The thresholds.
        const THRESHOLD = 0b0000_0100;
        /// The disabled flag.
        const DISABLED  = 0b0000_1000;
        /// The callback's identity.
        const CALLBACK  = 0b0001_0000;
        /// The child's identity.
        const CHILD     = 0b0010_0000;
        /// The node the child rendered to.
        const NODE      = 0b0100_0000;
    }
}

/// Inputs to the wrapper.
pub struct ObserverProps<N> {
    /// Node whose bounds are the visible area. Without it the wrapper stays dormant.
    pub root: Option<N>,
    /// Margin around the root. `None` keeps the wrapper dormant.
    pub root_margin: Option<RootMargin>,
    /// Reporting thresholds. `None` keeps the wrapper dormant.
    pub thresholds: Option<Thresholds>,
    /// When set, no sensor is kept.
    pub disabled: bool,
    /// Receives visibility changes. Without it the wrapper stays dormant.
    pub on_intersection: Option<VisibilityCallback<N>>,
}

impl<N> ObserverProps<N> {
    /// Props with a zero margin, a threshold of `1.0`, no root and no callback.
    pub fn new() -> Self {
        Self {
            root: None,
            root_margin: Some(RootMargin::ZERO),
            thresholds: Some(Thresholds::default()),
            disabled: false,
            on_intersection: None,
        }
    }

    /// Sets the root node.
    #[must_use]
    pub fn with_root(mut self, root: Option<N>) -> Self {
        self.root = root;
        self
    }

    /// Sets the root margin.
    #[must_use]
    pub fn with_root_margin(mut self, margin: Option<RootMargin>) -> Self {
        self.root_margin = margin;
        self
    }

    /// Sets the thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Option<Thresholds>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Sets the disabled flag.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets a shared callback. Passing the same `Rc` again keeps the sensor.
    #[must_use]
    pub fn with_callback(mut self, callback: VisibilityCallback<N>) -> Self {
        self.on_intersection = Some(callback);
        self
    }

    /// Sets a new callback from a closure.
    #[must_use]
    pub fn on_intersection(self, f: impl Fn(&IntersectionEntry<N>) + 'static) -> Self {
        self.with_callback(Rc::new(f))
    }
}

impl<N> Default for ObserverProps<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone> Clone for ObserverProps<N> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            root_margin: self.root_margin,
            thresholds: self.thresholds.clone(),
            disabled: self.disabled,
            on_intersection: self.on_intersection.clone(),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for ObserverProps<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverProps")
            .field("root", &self.root)
            .field("root_margin", &self.root_margin)
            .field("thresholds", &self.thresholds)
            .field("disabled", &self.disabled)
            .field("on_intersection", &self.on_intersection.is_some())
            .finish()
    }
}

/// Lifetime counters for sensors created by one wrapper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorStats {
    /// Sensors created.
    pub created: u64,
    /// Sensors disconnected.
    pub torn_down: u64,
}

impl SensorStats {
    /// Sensors currently alive; always 0 or 1.
    pub const fn active(&self) -> u64 {
        self.created - self.torn_down
    }
}

/// Snapshot of everything that decides whether the sensor must be rebuilt.
struct Deps<N> {
    root: Option<N>,
    root_margin: Option<RootMargin>,
    thresholds: Option<Thresholds>,
    disabled: bool,
    callback: Option<VisibilityCallback<N>>,
    child: Option<ChildIdentity>,
    node: Option<N>,
}

impl<N: PartialEq> Deps<N> {
    fn diff(&self, next: &Self) -> ConfigChange {
        let mut changed = ConfigChange::empty();
        changed.set(ConfigChange::ROOT, self.root != next.root);
        changed.set(ConfigChange::MARGIN, self.root_margin != next.root_margin);
        changed.set(ConfigChange::THRESHOLD, self.thresholds != next.thresholds);
        changed.set(ConfigChange::DISABLED, self.disabled != next.disabled);
        changed.set(
            ConfigChange::CALLBACK,
            !same_callback(self.callback.as_ref(), next.callback.as_ref()),
        );
        changed.set(ConfigChange::CHILD, self.child != next.child);
        changed.set(ConfigChange::NODE, self.node != next.node);
        changed
    }
}

fn same_callback<N>(a: Option<&VisibilityCallback<N>>, b: Option<&VisibilityCallback<N>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
        _ => false,
    }
}

struct ActiveSensor<S> {
    sensor: S,
    generation: u64,
    live: Rc<Cell<bool>>,
}

/// Attaches one host visibility sensor to whatever node a single child renders to.
///
/// A host drives it through render, commit, and finally unmount.
///
/// ```
/// use understory_visibility::{
///     BatchCallback, Element, ElementKind, IntersectionEntry, ObserverProps, SensorHost,
///     SensorOptions, VisibilityObserver,
/// };
/// use kurbo::Rect;
///
/// #[derive(Default)]
/// struct Host {
///     sensors: Vec<Option<BatchCallback<u32>>>,
/// }
///
/// impl SensorHost<u32> for Host {
///     type Sensor = usize;
///     fn create(&mut self, callback: BatchCallback<u32>, _: SensorOptions<u32>) -> usize {
///         self.sensors.push(Some(callback));
///         self.sensors.len() - 1
///     }
///     fn observe(&mut self, _: &usize, _: &u32) {}
///     fn disconnect(&mut self, sensor: usize) {
///         self.sensors[sensor] = None;
///     }
/// }
///
/// let mut host = Host::default();
/// let mut observer = VisibilityObserver::<u32, Host>::new();
/// let props = ObserverProps::new()
///     .with_root(Some(0))
///     .on_intersection(|entry| assert!(entry.is_intersecting));
///
/// let child = Element::new(ElementKind::Primitive("item"), ());
/// let decorated = observer.render(props, vec![child]).unwrap();
///
/// // The host mounts the child as node 7, then lets effects run.
/// decorated.attach(&7);
/// observer.commit(&mut host);
/// assert!(observer.is_observing());
/// assert_eq!(observer.node(), Some(7));
///
/// let entry = IntersectionEntry {
///     target: 7,
///     is_intersecting: true,
///     intersection_ratio: 1.0,
///     bounding_rect: Rect::ZERO,
///     intersection_rect: Rect::ZERO,
///     root_bounds: None,
/// };
/// (host.sensors[0].as_mut().unwrap())(&[entry]);
///
/// observer.unmount(&mut host);
/// assert!(host.sensors[0].is_none());
/// ```
pub struct VisibilityObserver<N, H: SensorHost<N>> {
    props: ObserverProps<N>,
    tracker: NodeSlot<N>,
    child: Option<ChildIdentity>,
    degraded: bool,
    deps: Option<Deps<N>>,
    active: Option<ActiveSensor<H::Sensor>>,
    generation: u64,
    stats: SensorStats,
}

impl<N, H> VisibilityObserver<N, H>
where
    N: Clone + PartialEq + 'static,
    H: SensorHost<N>,
{
    /// Creates a dormant wrapper.
    pub fn new() -> Self {
        Self {
            props: ObserverProps::new(),
            tracker: NodeSlot::new(),
            child: None,
            degraded: false,
            deps: None,
            active: None,
            generation: 0,
            stats: SensorStats::default(),
        }
    }

    /// Renders the wrapper around `children`, which must hold exactly one element.
    ///
    /// A child that accepts a node reference comes back with its own reference
    /// (if any) composed with the wrapper's tracker, so both see the node. A
    /// child that cannot take one comes back untouched and is not observed.
    pub fn render<P>(
        &mut self,
        props: ObserverProps<N>,
        children: Vec<Element<N, P>>,
    ) -> Result<Element<N, P>, Error> {
        let mut child = only_child(children)?;
        self.props = props;
        self.child = Some(child.identity());

        match child.kind.ref_support() {
            RefSupport::Direct | RefSupport::Forwarded => {
                self.degraded = false;
                let own = child.node_ref.take();
                let tracker = RefSink::Slot(self.tracker.clone());
                child.node_ref = Some(compose_refs([own, Some(tracker)]));
            }
            RefSupport::Unsupported => {
                if !self.degraded {
                    tracing::debug!(
                        target: "understory_visibility",
                        kind = child.kind.name(),
                        "child does not accept a node reference; passing it through unobserved"
                    );
                }
                self.degraded = true;
                self.tracker.set(None);
            }
        }
        Ok(child)
    }

    /// Runs the sensor lifecycle after the host mounted the rendered child.
    ///
    /// Returns which inputs changed. An empty set means nothing was touched;
    /// otherwise the previous sensor (if any) was disconnected and a new one
    /// created if every prerequisite is present.
    pub fn commit(&mut self, host: &mut H) -> ConfigChange {
        let next = Deps {
            root: self.props.root.clone(),
            root_margin: self.props.root_margin,
            thresholds: self.props.thresholds.clone(),
            disabled: self.props.disabled,
            callback: self.props.on_intersection.clone(),
            child: self.child.clone(),
            node: self.node(),
        };
        let changed = match &self.deps {
            Some(prev) => prev.diff(&next),
            None => ConfigChange::all(),
        };
        if changed.is_empty() {
            return changed;
        }
        self.teardown(host);
        self.deps = Some(next);
        self.connect(host);
        changed
    }

    /// Tears down the active sensor, if any, and forgets the last commit.
    pub fn unmount(&mut self, host: &mut H) {
        self.teardown(host);
        self.deps = None;
    }

    /// The node the child rendered to, if it is mounted and observable.
    pub fn node(&self) -> Option<N> {
        if self.degraded {
            None
        } else {
            self.tracker.get()
        }
    }

    /// Whether a sensor is currently registered.
    pub fn is_observing(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the last rendered child could not take a node reference.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Generation of the most recently created sensor; 0 before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Create/teardown counters.
    pub fn stats(&self) -> SensorStats {
        self.stats
    }

    /// The props from the last successful render.
    pub fn props(&self) -> &ObserverProps<N> {
        &self.props
    }

    fn connect(&mut self, host: &mut H) {
        let props = &self.props;
        if props.disabled {
            tracing::trace!(target: "understory_visibility", "disabled; staying dormant");
            return;
        }
        let (Some(root), Some(root_margin), Some(thresholds), Some(callback)) = (
            props.root.clone(),
            props.root_margin,
            props.thresholds.clone(),
            props.on_intersection.clone(),
        ) else {
            tracing::trace!(target: "understory_visibility", "missing root, margin, threshold or callback; staying dormant");
            return;
        };
        let Some(node) = self.node() else {
            tracing::trace!(target: "understory_visibility", "no node to observe; staying dormant");
            return;
        };

        self.generation += 1;
        let generation = self.generation;
        let live = Rc::new(Cell::new(true));
        let guard = Rc::clone(&live);
        let batch: BatchCallback<N> = Box::new(move |entries: &[IntersectionEntry<N>]| {
            if !guard.get() {
                tracing::trace!(
                    target: "understory_visibility",
                    generation,
                    "dropping batch from a torn-down sensor"
                );
                return;
            }
            if let Some(first) = entries.first() {
                callback(first);
            }
        });
        let options = SensorOptions {
            root,
            root_margin,
            thresholds,
        };

        let sensor = host.create(batch, options);
        host.observe(&sensor, &node);
        self.stats.created += 1;
        tracing::debug!(target: "understory_visibility", generation, "sensor created");
        self.active = Some(ActiveSensor {
            sensor,
            generation,
            live,
        });
    }

    fn teardown(&mut self, host: &mut H) {
        if let Some(active) = self.active.take() {
            active.live.set(false);
            host.disconnect(active.sensor);
            self.stats.torn_down += 1;
            tracing::debug!(
                target: "understory_visibility",
                generation = active.generation,
                "sensor torn down"
            );
        }
    }
}

impl<N, H> Default for VisibilityObserver<N, H>
where
    N: Clone + PartialEq + 'static,
    H: SensorHost<N>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N: fmt::Debug, H: SensorHost<N>> fmt::Debug for VisibilityObserver<N, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityObserver")
            .field("props", &self.props)
            .field("tracker", &self.tracker)
            .field("child", &self.child)
            .field("degraded", &self.degraded)
            .field("observing", &self.active.is_some())
            .field("generation", &self.generation)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use alloc::vec;
    use core::cell::RefCell;
    use kurbo::Rect;

    #[derive(Default)]
    struct FakeHost {
        callbacks: Vec<BatchCallback<u32>>,
        options: Vec<SensorOptions<u32>>,
        observed: Vec<(usize, u32)>,
        disconnected: Vec<usize>,
    }

    impl SensorHost<u32> for FakeHost {
        type Sensor = usize;

        fn create(&mut self, callback: BatchCallback<u32>, options: SensorOptions<u32>) -> usize {
            self.callbacks.push(callback);
            self.options.push(options);
            self.callbacks.len() - 1
        }

        fn observe(&mut self, sensor: &usize, target: &u32) {
            self.observed.push((*sensor, *target));
        }

        fn disconnect(&mut self, sensor: usize) {
            self.disconnected.push(sensor);
        }
    }

    impl FakeHost {
        // Delivers even to disconnected sensors, like a host with a queued task.
        fn emit(&mut self, sensor: usize, entries: &[IntersectionEntry<u32>]) {
            let callback = &mut self.callbacks[sensor];
            callback(entries);
        }
    }

    type Observer = VisibilityObserver<u32, FakeHost>;
    type Seen = Rc<RefCell<Vec<(u32, bool)>>>;

    fn entry(target: u32, visible: bool) -> IntersectionEntry<u32> {
        IntersectionEntry {
            target,
            is_intersecting: visible,
            intersection_ratio: if visible { 1.0 } else { 0.0 },
            bounding_rect: Rect::ZERO,
            intersection_rect: Rect::ZERO,
            root_bounds: None,
        }
    }

    fn recorder() -> (Seen, VisibilityCallback<u32>) {
        let seen: Seen = Rc::default();
        let log = Rc::clone(&seen);
        let cb: VisibilityCallback<u32> =
            Rc::new(move |e: &IntersectionEntry<u32>| log.borrow_mut().push((e.target, e.is_intersecting)));
        (seen, cb)
    }

    fn item() -> Element<u32, ()> {
        Element::new(ElementKind::Primitive("item"), ()).with_key(1)
    }

    /// Renders `props` around `child`, mounts it as `node`, and commits.
    fn cycle(
        observer: &mut Observer,
        host: &mut FakeHost,
        props: ObserverProps<u32>,
        child: Element<u32, ()>,
        node: u32,
    ) -> ConfigChange {
        let rendered = observer.render(props, vec![child]).unwrap();
        rendered.attach(&node);
        observer.commit(host)
    }

    #[test]
    fn dormant_without_prerequisites() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let (_, cb) = recorder();

        // No root.
        cycle(&mut observer, &mut host, ObserverProps::new().with_callback(cb.clone()), item(), 5);
        assert!(!observer.is_observing());
        // No callback.
        cycle(&mut observer, &mut host, ObserverProps::new().with_root(Some(0)), item(), 5);
        assert!(!observer.is_observing());
        // No threshold.
        let props = ObserverProps::new()
            .with_root(Some(0))
            .with_callback(cb)
            .with_thresholds(None);
        cycle(&mut observer, &mut host, props, item(), 5);
        assert!(!observer.is_observing());
        assert!(host.callbacks.is_empty());
    }

    #[test]
    fn creates_once_and_observes_node() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let (_, cb) = recorder();
        let props = ObserverProps::new().with_root(Some(0)).with_callback(cb);

        let changed = cycle(&mut observer, &mut host, props.clone(), item(), 5);
        assert_eq!(changed, ConfigChange::all());
        assert_eq!(host.observed, [(0, 5)]);
        assert_eq!(host.options[0].thresholds, Thresholds::default());
        assert_eq!(host.options[0].root_margin, RootMargin::ZERO);

        // Same inputs: untouched.
        let changed = cycle(&mut observer, &mut host, props, item(), 5);
        assert!(changed.is_empty());
        assert_eq!(observer.stats(), SensorStats { created: 1, torn_down: 0 });
        assert_eq!(observer.generation(), 1);
    }

    #[test]
    fn reconfiguration_tears_down_before_creating() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let (_, cb) = recorder();
        let base = ObserverProps::new().with_root(Some(0)).with_callback(cb);

        cycle(&mut observer, &mut host, base.clone(), item(), 5);
        let changed = cycle(
            &mut observer,
            &mut host,
            base.clone().with_thresholds(Some(Thresholds::single(0.5).unwrap())),
            item(),
            5,
        );
        assert_eq!(changed, ConfigChange::THRESHOLD);
        assert_eq!(host.disconnected, [0]);
        assert_eq!(host.observed, [(0, 5), (1, 5)]);

        let changed = cycle(&mut observer, &mut host, base.clone().with_root(Some(9)), item(), 5);
        assert!(changed.contains(ConfigChange::ROOT));
        let changed = cycle(&mut observer, &mut host, base.clone().with_root(Some(9)), item(), 6);
        assert_eq!(changed, ConfigChange::NODE);
        let changed = cycle(
            &mut observer,
            &mut host,
            base.with_root(Some(9)),
            Element::new(ElementKind::Primitive("item"), ()).with_key(2),
            6,
        );
        assert_eq!(changed, ConfigChange::CHILD);
        assert_eq!(host.disconnected, [0, 1, 2, 3]);
        assert_eq!(observer.stats().active(), 1);
    }

    #[test]
    fn new_callback_identity_recreates() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let props = |cb: VisibilityCallback<u32>| ObserverProps::new().with_root(Some(0)).with_callback(cb);
        let (_, a) = recorder();
        let (_, b) = recorder();

        cycle(&mut observer, &mut host, props(a.clone()), item(), 5);
        assert!(cycle(&mut observer, &mut host, props(a), item(), 5).is_empty());
        assert_eq!(
            cycle(&mut observer, &mut host, props(b), item(), 5),
            ConfigChange::CALLBACK
        );
        assert_eq!(observer.stats(), SensorStats { created: 2, torn_down: 1 });
    }

    #[test]
    fn disable_and_unmount_release_the_sensor() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let (_, cb) = recorder();
        let props = ObserverProps::new().with_root(Some(0)).with_callback(cb);

        cycle(&mut observer, &mut host, props.clone(), item(), 5);
        cycle(&mut observer, &mut host, props.clone().with_disabled(true), item(), 5);
        assert!(!observer.is_observing());
        assert_eq!(host.disconnected, [0]);

        cycle(&mut observer, &mut host, props, item(), 5);
        assert!(observer.is_observing());
        observer.unmount(&mut host);
        observer.unmount(&mut host);
        assert_eq!(host.disconnected, [0, 1]);
        assert_eq!(observer.stats(), SensorStats { created: 2, torn_down: 2 });
    }

    #[test]
    fn forwards_first_record_only() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let (seen, cb) = recorder();
        cycle(
            &mut observer,
            &mut host,
            ObserverProps::new().with_root(Some(0)).with_callback(cb),
            item(),
            5,
        );

        host.emit(0, &[entry(5, true), entry(5, false)]);
        host.emit(0, &[]);
        host.emit(0, &[entry(5, false)]);
        assert_eq!(*seen.borrow(), [(5, true), (5, false)]);
    }

    #[test]
    fn batches_from_torn_down_sensors_are_dropped() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let (seen, cb) = recorder();
        let props = ObserverProps::new().with_root(Some(0)).with_callback(cb);

        cycle(&mut observer, &mut host, props.clone(), item(), 5);
        cycle(&mut observer, &mut host, props.with_root(Some(1)), item(), 5);
        host.emit(0, &[entry(5, true)]);
        assert!(seen.borrow().is_empty());
        host.emit(1, &[entry(5, true)]);
        assert_eq!(*seen.borrow(), [(5, true)]);
    }

    #[test]
    fn child_ref_and_tracker_see_the_same_node() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let own = NodeSlot::<u32>::new();
        let child = item().with_ref(own.clone());

        let rendered = observer.render(ObserverProps::new(), vec![child]).unwrap();
        rendered.attach(&42);
        observer.commit(&mut host);
        assert_eq!(own.get(), Some(42));
        assert_eq!(observer.node(), Some(42));

        rendered.detach();
        assert!(own.is_empty());
        assert_eq!(observer.node(), None);
    }

    #[test]
    fn forwarding_callback_ref_is_kept() {
        let mut observer = Observer::new();
        let calls: Rc<RefCell<Vec<Option<u32>>>> = Rc::default();
        let log = Rc::clone(&calls);
        let child = Element::new(ElementKind::Forwarding("row").memo(), ())
            .with_ref(RefSink::callback(move |n: Option<&u32>| log.borrow_mut().push(n.copied())));

        let rendered = observer.render(ObserverProps::new(), vec![child]).unwrap();
        rendered.attach(&3);
        assert_eq!(*calls.borrow(), [Some(3)]);
        assert_eq!(observer.node(), Some(3));
    }

    #[test]
    fn opaque_child_passes_through_unobserved() {
        let mut host = FakeHost::default();
        let mut observer = Observer::new();
        let (_, cb) = recorder();
        let own = NodeSlot::<u32>::new();
        let child = Element::new(ElementKind::Opaque("label"), ()).with_ref(own.clone());

        let props = ObserverProps::new().with_root(Some(0)).with_callback(cb);
        let rendered = observer.render(props, vec![child]).unwrap();
        assert!(matches!(&rendered.node_ref, Some(RefSink::Slot(s)) if s.ptr_eq(&own)));
        rendered.attach(&8);
        observer.commit(&mut host);
        assert!(observer.is_degraded());
        assert!(!observer.is_observing());
        assert!(host.callbacks.is_empty());
    }

    #[test]
    fn wrong_child_count_is_an_error() {
        let mut observer = Observer::new();
        let err = observer.render::<()>(ObserverProps::new(), Vec::new()).unwrap_err();
        assert_eq!(err, Error::ChildCount { found: 0 });
        let err = observer
            .render(ObserverProps::new(), vec![item(), item()])
            .unwrap_err();
        assert_eq!(err, Error::ChildCount { found: 2 });
    }
}
