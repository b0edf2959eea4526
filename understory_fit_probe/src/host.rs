// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless host: wrap-flow layout plus a visibility sensor.
//!
//! [`FlowHost`] mounts the tree a [`FitProbe`] renders, places the
//! container's children in [`FlowLayout`] order, and implements
//! [`SensorHost`] by comparing each observed child with the container.
//! Measuring and delivering are separate steps so tests can interleave them
//! with commits, the way a real host runs sensor callbacks as queued tasks.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Rect, Size};
use smallvec::SmallVec;
use understory_visibility::{BatchCallback, Element, IntersectionEntry, Key, SensorHost, SensorOptions};

use crate::layout::FlowLayout;
use crate::probe::{FitProbe, View};
use crate::Error;

/// A node mounted by a [`FlowHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The container node.
    pub const ROOT: Self = Self(0);

    /// Raw index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Handle to a sensor created by a [`FlowHost`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FlowSensor(u64);

type SharedCallback = Rc<RefCell<BatchCallback<NodeId>>>;

struct Observed {
    node: NodeId,
    /// Intersecting flag and threshold band from the last report.
    last: Option<(bool, usize)>,
}

struct Registration {
    callback: SharedCallback,
    options: SensorOptions<NodeId>,
    targets: SmallVec<[Observed; 1]>,
}

/// Headless layout and sensor host for [`FitProbe`] trees.
pub struct FlowHost {
    layout: FlowLayout,
    root_mounted: bool,
    keyed: HashMap<Key, NodeId>,
    slots: HashMap<NodeId, usize>,
    next_node: u32,
    sensors: HashMap<u64, Registration>,
    next_sensor: u64,
    pending: VecDeque<(SharedCallback, Vec<IntersectionEntry<NodeId>>)>,
}

impl FlowHost {
    /// Creates a host with a container of `container` size holding items of `item` size.
    pub fn new(container: Size, item: Size) -> Result<Self, Error> {
        Ok(Self {
            layout: FlowLayout::new(container, item)?,
            root_mounted: false,
            keyed: HashMap::new(),
            slots: HashMap::new(),
            next_node: NodeId::ROOT.0 + 1,
            sensors: HashMap::new(),
            next_sensor: 0,
            pending: VecDeque::new(),
        })
    }

    /// The current layout.
    pub fn layout(&self) -> &FlowLayout {
        &self.layout
    }

    /// Resizes the container. Takes effect at the next [`measure`](Self::measure).
    pub fn resize(&mut self, container: Size) {
        self.layout.set_container(container);
        tracing::debug!(
            target: "understory_fit_probe",
            width = container.width,
            height = container.height,
            "container resized"
        );
    }

    /// Mounts `tree`: the top element becomes [`NodeId::ROOT`] and its
    /// children are laid out by visual position.
    ///
    /// Keyed children keep their node across mounts. Ties in visual position
    /// keep child order.
    pub fn mount(&mut self, tree: &Element<NodeId, View>) {
        tree.attach(&NodeId::ROOT);
        self.root_mounted = true;

        let mut order: Vec<(usize, usize)> = tree
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| (child.props.visual_position(), i))
            .collect();
        order.sort_unstable();

        self.slots.clear();
        let next = &mut self.next_node;
        for (slot, (_, i)) in order.into_iter().enumerate() {
            let child = &tree.children[i];
            let mut fresh = || {
                let id = NodeId(*next);
                *next += 1;
                id
            };
            let node = match child.key {
                Some(key) => *self.keyed.entry(key).or_insert_with(fresh),
                None => fresh(),
            };
            child.attach(&node);
            self.slots.insert(node, slot);
        }
    }

    /// Unmounts `tree`, clearing every reference it filled.
    pub fn unmount(&mut self, tree: &Element<NodeId, View>) {
        for child in &tree.children {
            child.detach();
        }
        tree.detach();
        self.slots.clear();
        self.root_mounted = false;
    }

    /// Slot of a mounted child.
    pub fn slot_of(&self, node: NodeId) -> Option<usize> {
        self.slots.get(&node).copied()
    }

    /// Bounds of a mounted node.
    pub fn rect_of(&self, node: NodeId) -> Option<Rect> {
        if node == NodeId::ROOT {
            return self.root_mounted.then(|| self.layout.container_rect());
        }
        self.slot_of(node).map(|slot| self.layout.slot_rect(slot))
    }

    /// Number of live sensors.
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Number of batches waiting for [`deliver`](Self::deliver).
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Measures every observed target and queues a batch per sensor whose
    /// targets changed state. A target's first measurement always counts as
    /// a change. Returns the number of batches queued.
    pub fn measure(&mut self) -> usize {
        if !self.root_mounted {
            return 0;
        }
        let container = self.layout.container_rect();
        let mut ids: Vec<u64> = self.sensors.keys().copied().collect();
        ids.sort_unstable();

        let mut queued = 0;
        for id in ids {
            let Some(registration) = self.sensors.get_mut(&id) else {
                continue;
            };
            if registration.options.root != NodeId::ROOT {
                continue;
            }
            let viewport = registration.options.root_margin.apply(container);
            let thresholds = &registration.options.thresholds;
            let mut entries = Vec::new();
            for observed in &mut registration.targets {
                let Some(&slot) = self.slots.get(&observed.node) else {
                    continue;
                };
                let entry = IntersectionEntry::measure(
                    observed.node,
                    self.layout.slot_rect(slot),
                    viewport,
                    thresholds,
                );
                let state = (entry.is_intersecting, thresholds.band(entry.intersection_ratio));
                if observed.last != Some(state) {
                    observed.last = Some(state);
                    entries.push(entry);
                }
            }
            if !entries.is_empty() {
                tracing::trace!(target: "understory_fit_probe", sensor = id, entries = entries.len(), "batch queued");
                self.pending
                    .push_back((Rc::clone(&registration.callback), entries));
                queued += 1;
            }
        }
        queued
    }

    /// Runs every queued batch, including those of sensors disconnected
    /// since they were measured. Returns the number of batches delivered.
    pub fn deliver(&mut self) -> usize {
        let mut delivered = 0;
        while let Some((callback, entries)) = self.pending.pop_front() {
            let mut guard = callback.borrow_mut();
            let callback: &mut BatchCallback<NodeId> = &mut guard;
            callback(&entries);
            delivered += 1;
        }
        delivered
    }

    /// [`measure`](Self::measure) then [`deliver`](Self::deliver).
    pub fn flush(&mut self) -> usize {
        self.measure();
        self.deliver()
    }

    /// Drives `probe` until it stops asking for renders or `max_rounds` is
    /// spent, and returns its answer.
    ///
    /// A round renders, mounts, commits, flushes and pumps.
    pub fn settle(
        &mut self,
        probe: &mut FitProbe<NodeId, Self>,
        max_rounds: usize,
    ) -> Result<Option<usize>, Error> {
        for _ in 0..max_rounds {
            let tree = probe.render()?;
            self.mount(&tree);
            probe.commit(self);
            self.flush();
            if !probe.pump() {
                break;
            }
        }
        Ok(probe.resolved())
    }
}

impl SensorHost<NodeId> for FlowHost {
    type Sensor = FlowSensor;

    fn create(&mut self, callback: BatchCallback<NodeId>, options: SensorOptions<NodeId>) -> FlowSensor {
        let id = self.next_sensor;
        self.next_sensor += 1;
        self.sensors.insert(
            id,
            Registration {
                callback: Rc::new(RefCell::new(callback)),
                options,
                targets: SmallVec::new(),
            },
        );
        FlowSensor(id)
    }

    fn observe(&mut self, sensor: &FlowSensor, target: &NodeId) {
        let Some(registration) = self.sensors.get_mut(&sensor.0) else {
            return;
        };
        if registration.targets.iter().all(|t| t.node != *target) {
            registration.targets.push(Observed {
                node: *target,
                last: None,
            });
        }
    }

    fn disconnect(&mut self, sensor: FlowSensor) {
        self.sensors.remove(&sensor.0);
    }
}

impl fmt::Debug for FlowHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowHost")
            .field("layout", &self.layout)
            .field("root_mounted", &self.root_mounted)
            .field("mounted", &self.slots.len())
            .field("sensors", &self.sensors.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
