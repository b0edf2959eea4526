// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A fit search wired to a visibility wrapper.
//!
//! [`FitProbe`] renders the container, the items and the probe, lets the
//! wrapper observe the probe against the container, and feeds whatever the
//! host reports back into [`FitSearch`].

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec;
use core::cell::RefCell;
use core::fmt;
use core::iter;

use understory_visibility::{
    ConfigChange, Element, ElementKind, IntersectionEntry, Key, NodeSlot, ObserverProps,
    RootMargin, SensorHost, Thresholds, VisibilityCallback, VisibilityObserver,
};

use crate::search::{FitSearch, Item, Probe, ProbeReport, Transition};
use crate::Error;

/// Key of the probe element among the container's children.
///
/// Items are keyed by their index.
pub const PROBE_KEY: Key = Key::MAX;

/// Props carried by the elements [`FitProbe::render`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// The container whose bounds decide what fits.
    Container,
    /// A candidate item.
    Item(Item),
    /// The probe.
    Probe(Probe),
}

impl View {
    /// Layout rank among the container's children; 0 for the container itself.
    pub const fn visual_position(&self) -> usize {
        match self {
            Self::Container => 0,
            Self::Item(item) => item.visual_position,
            Self::Probe(probe) => probe.visual_position,
        }
    }
}

/// Configuration for a [`FitProbe`].
#[derive(Clone, Debug, PartialEq)]
pub struct FitProbeConfig {
    /// Number of items.
    pub len: usize,
    /// Margin applied to the container before testing the probe.
    pub root_margin: RootMargin,
    /// Visibility thresholds; the smallest decides whether the probe fits.
    pub thresholds: Thresholds,
}

impl FitProbeConfig {
    /// `len` items, no margin, and the probe must be fully visible to fit.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    /// Sets the root margin.
    #[must_use]
    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    /// Sets the thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

impl Default for FitProbeConfig {
    fn default() -> Self {
        Self {
            len: 0,
            root_margin: RootMargin::ZERO,
            thresholds: Thresholds::default(),
        }
    }
}

/// A fit search session.
///
/// One round is: [`render`](Self::render), let the host mount the tree,
/// [`commit`](Self::commit), let the host measure and deliver, then
/// [`pump`](Self::pump). Repeat while `pump` asks for another render.
///
/// Each probe placement gets its own callback, so moving the probe always
/// rebuilds the sensor and a report can be traced back to the placement it
/// was observed under.
pub struct FitProbe<N, H: SensorHost<N>> {
    config: FitProbeConfig,
    search: FitSearch,
    observer: VisibilityObserver<N, H>,
    root: NodeSlot<N>,
    probe_node: NodeSlot<N>,
    mailbox: Rc<RefCell<VecDeque<ProbeReport>>>,
    callback: Option<(u64, VisibilityCallback<N>)>,
}

impl<N, H> FitProbe<N, H>
where
    N: Clone + PartialEq + 'static,
    H: SensorHost<N>,
{
    /// Creates a session; nothing is observed until the first commit with a mounted container.
    pub fn new(config: FitProbeConfig) -> Self {
        Self {
            search: FitSearch::new(config.len),
            config,
            observer: VisibilityObserver::new(),
            root: NodeSlot::new(),
            probe_node: NodeSlot::new(),
            mailbox: Rc::new(RefCell::new(VecDeque::new())),
            callback: None,
        }
    }

    /// Renders the container with every item and the observed probe.
    pub fn render(&mut self) -> Result<Element<N, View>, Error> {
        let probe = Element::new(
            ElementKind::Forwarding("probe"),
            View::Probe(self.search.probe()),
        )
        .with_key(PROBE_KEY)
        .with_ref(self.probe_node.clone());

        let props = ObserverProps::new()
            .with_root(self.root.get())
            .with_root_margin(Some(self.config.root_margin))
            .with_thresholds(Some(self.config.thresholds.clone()))
            .with_disabled(self.search.resolved().is_some())
            .with_callback(self.callback_for_epoch());
        let probe = self.observer.render(props, vec![probe])?;

        let items = self.search.items().into_iter().map(|item| {
            Element::new(ElementKind::Primitive("item"), View::Item(item)).with_key(item.index as Key)
        });
        Ok(
            Element::new(ElementKind::Primitive("container"), View::Container)
                .with_ref(self.root.clone())
                .with_children(items.chain(iter::once(probe))),
        )
    }

    /// Runs the wrapper's lifecycle after the host mounted the last render.
    pub fn commit(&mut self, host: &mut H) -> ConfigChange {
        let changed = self.observer.commit(host);
        if !changed.is_empty() {
            tracing::trace!(
                target: "understory_fit_probe",
                ?changed,
                observing = self.observer.is_observing(),
                "probe sensor updated"
            );
        }
        changed
    }

    /// Feeds queued reports into the search.
    ///
    /// Returns whether the caller should render again.
    pub fn pump(&mut self) -> bool {
        let mut moved = false;
        loop {
            let Some(report) = self.mailbox.borrow_mut().pop_front() else {
                break;
            };
            if self.search.apply(report) != Transition::Ignored {
                moved = true;
            }
        }
        moved || self.needs_render()
    }

    /// Whether the last render is out of date: the container was mounted
    /// since, or the probe has moved.
    pub fn needs_render(&self) -> bool {
        let rendered = self.callback.as_ref().map(|(epoch, _)| *epoch);
        rendered != Some(self.search.epoch()) || self.observer.props().root != self.root.get()
    }

    /// Restarts the search, for instance after the container was resized.
    pub fn reset(&mut self) {
        self.mailbox.borrow_mut().clear();
        self.search.reset();
    }

    /// Changes the number of items and restarts the search.
    pub fn set_len(&mut self, len: usize) {
        self.mailbox.borrow_mut().clear();
        self.config.len = len;
        self.search.set_len(len);
    }

    /// Releases the sensor.
    pub fn unmount(&mut self, host: &mut H) {
        self.observer.unmount(host);
        self.mailbox.borrow_mut().clear();
    }

    /// Number of items that fit, once known.
    pub fn resolved(&self) -> Option<usize> {
        self.search.resolved()
    }

    /// The underlying search.
    pub fn search(&self) -> &FitSearch {
        &self.search
    }

    /// The wrapper observing the probe.
    pub fn observer(&self) -> &VisibilityObserver<N, H> {
        &self.observer
    }

    /// Configuration.
    pub fn config(&self) -> &FitProbeConfig {
        &self.config
    }

    /// Node the container was mounted as.
    pub fn root_node(&self) -> Option<N> {
        self.root.get()
    }

    /// Node the probe was mounted as.
    pub fn probe_node(&self) -> Option<N> {
        self.probe_node.get()
    }

    fn callback_for_epoch(&mut self) -> VisibilityCallback<N> {
        let epoch = self.search.epoch();
        if let Some((rendered, callback)) = &self.callback {
            if *rendered == epoch {
                return Rc::clone(callback);
            }
        }
        let mailbox = Rc::clone(&self.mailbox);
        let callback: VisibilityCallback<N> = Rc::new(move |entry: &IntersectionEntry<N>| {
            mailbox.borrow_mut().push_back(ProbeReport {
                epoch,
                intersecting: entry.is_intersecting,
            });
        });
        self.callback = Some((epoch, Rc::clone(&callback)));
        callback
    }
}

impl<N: fmt::Debug, H: SensorHost<N>> fmt::Debug for FitProbe<N, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitProbe")
            .field("config", &self.config)
            .field("search", &self.search)
            .field("observer", &self.observer)
            .field("root", &self.root)
            .field("probe_node", &self.probe_node)
            .field("queued", &self.mailbox.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use understory_visibility::{BatchCallback, SensorOptions};

    use kurbo::Rect;

    /// Records sensors and lets tests fire their callbacks by hand.
    #[derive(Default)]
    struct ManualHost {
        callbacks: Vec<BatchCallback<u32>>,
        observed: Vec<u32>,
        roots: Vec<u32>,
        disconnected: Vec<usize>,
    }

    impl SensorHost<u32> for ManualHost {
        type Sensor = usize;

        fn create(&mut self, callback: BatchCallback<u32>, options: SensorOptions<u32>) -> usize {
            self.callbacks.push(callback);
            self.roots.push(options.root);
            self.callbacks.len() - 1
        }

        fn observe(&mut self, _sensor: &usize, target: &u32) {
            self.observed.push(*target);
        }

        fn disconnect(&mut self, sensor: usize) {
            self.disconnected.push(sensor);
        }
    }

    impl ManualHost {
        fn report(&mut self, sensor: usize, intersecting: bool) {
            let entry = IntersectionEntry {
                target: 2,
                is_intersecting: intersecting,
                intersection_ratio: if intersecting { 1.0 } else { 0.0 },
                bounding_rect: Rect::ZERO,
                intersection_rect: Rect::ZERO,
                root_bounds: None,
            };
            let callback = &mut self.callbacks[sensor];
            callback(&[entry]);
        }
    }

    /// Mounts the container as node 1 and the probe as node 2.
    fn mount(tree: &Element<u32, View>) {
        tree.attach(&1);
        for child in &tree.children {
            if matches!(child.props, View::Probe(_)) {
                child.attach(&2);
            }
        }
    }

    fn round(probe: &mut FitProbe<u32, ManualHost>, host: &mut ManualHost) -> Element<u32, View> {
        let tree = probe.render().unwrap();
        mount(&tree);
        probe.commit(host);
        tree
    }

    #[test]
    fn render_lays_out_items_around_the_probe() {
        let mut probe = FitProbe::<u32, ManualHost>::new(FitProbeConfig::new(4));
        let tree = probe.render().unwrap();
        assert_eq!(tree.props, View::Container);
        assert_eq!(tree.children.len(), 5);

        let mut ranks: Vec<usize> = tree.children.iter().map(|c| c.props.visual_position()).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, [0, 1, 2, 3, 4]);

        let last = tree.children.last().unwrap();
        assert_eq!(last.key, Some(PROBE_KEY));
        assert_eq!(last.props.visual_position(), 1);
    }

    #[test]
    fn waits_for_the_container_before_observing() {
        let mut host = ManualHost::default();
        let mut probe = FitProbe::new(FitProbeConfig::new(10));

        round(&mut probe, &mut host);
        assert!(!probe.observer().is_observing());
        assert!(host.callbacks.is_empty());
        assert_eq!(probe.root_node(), Some(1));
        assert!(probe.pump(), "container mounted; another render is due");

        round(&mut probe, &mut host);
        assert!(probe.observer().is_observing());
        assert_eq!(host.roots, [1]);
        assert_eq!(host.observed, [2]);
        assert_eq!(probe.probe_node(), Some(2));
        assert!(!probe.pump());
    }

    #[test]
    fn every_placement_gets_a_fresh_sensor() {
        let mut host = ManualHost::default();
        let mut probe = FitProbe::new(FitProbeConfig::new(10));
        round(&mut probe, &mut host);
        round(&mut probe, &mut host);

        host.report(0, true);
        assert!(probe.pump());
        round(&mut probe, &mut host);
        assert_eq!(host.disconnected, [0]);
        assert_eq!(host.callbacks.len(), 2);
        assert_eq!(probe.observer().stats().active(), 1);

        // The torn-down sensor fires late; the wrapper drops it.
        let state = probe.search().state();
        host.report(0, false);
        assert!(!probe.pump());
        assert_eq!(probe.search().state(), state);
    }

    #[test]
    fn converges_and_releases_the_sensor() {
        let mut host = ManualHost::default();
        let mut probe = FitProbe::new(FitProbeConfig::new(10));
        round(&mut probe, &mut host);
        while probe.resolved().is_none() {
            round(&mut probe, &mut host);
            let slot = probe.search().probe_slot();
            host.report(host.callbacks.len() - 1, slot < 6);
            probe.pump();
        }
        assert_eq!(probe.resolved(), Some(6));

        round(&mut probe, &mut host);
        assert!(!probe.observer().is_observing());
        assert_eq!(probe.observer().stats().active(), 0);
        assert!(!probe.pump());
    }

    #[test]
    fn reset_discards_queued_reports() {
        let mut host = ManualHost::default();
        let mut probe = FitProbe::new(FitProbeConfig::new(10));
        round(&mut probe, &mut host);
        round(&mut probe, &mut host);

        host.report(0, true);
        probe.reset();
        assert!(probe.pump(), "the probe moved back to its first placement");
        assert_eq!(probe.search().epoch(), 1);
        assert_eq!(probe.search().state(), FitSearch::new(10).state());
    }

    #[test]
    fn unmount_tears_down() {
        let mut host = ManualHost::default();
        let mut probe = FitProbe::new(FitProbeConfig::new(3));
        round(&mut probe, &mut host);
        round(&mut probe, &mut host);
        probe.unmount(&mut host);
        assert_eq!(host.disconnected, [0]);
        assert!(!probe.observer().is_observing());
    }

    #[test]
    fn empty_collection_never_observes() {
        let mut host = ManualHost::default();
        let mut probe = FitProbe::new(FitProbeConfig::new(0));
        assert_eq!(probe.resolved(), Some(0));
        round(&mut probe, &mut host);
        round(&mut probe, &mut host);
        assert!(host.callbacks.is_empty());
    }
}
