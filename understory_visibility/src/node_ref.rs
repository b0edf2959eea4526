// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node references: shared slots, ref callbacks, and fan-out composition.
//!
//! A host fills an element's reference with the concrete node it rendered to
//! (and clears it with `None` when the node goes away). Several parties may
//! need the same node, so [`compose_refs`] merges any number of sinks into one
//! that forwards every write to each of them in order.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use smallvec::SmallVec;

/// A shared, clonable slot that holds the node an element rendered to.
///
/// Clones refer to the same slot.
pub struct NodeSlot<N>(Rc<RefCell<Option<N>>>);

impl<N> NodeSlot<N> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Stores `node`, replacing whatever the slot held.
    pub fn set(&self, node: Option<N>) {
        *self.0.borrow_mut() = node;
    }

    /// Returns `true` if no node is stored.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_none()
    }

    /// Returns `true` if both handles refer to the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<N: Clone> NodeSlot<N> {
    /// Returns a copy of the stored node, if any.
    pub fn get(&self) -> Option<N> {
        self.0.borrow().clone()
    }
}

impl<N> Clone for NodeSlot<N> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<N> Default for NodeSlot<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: fmt::Debug> fmt::Debug for NodeSlot<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeSlot").field(&*self.0.borrow()).finish()
    }
}

/// A ref callback: invoked with the node on attach and `None` on detach.
pub type RefCallback<N> = Rc<dyn Fn(Option<&N>)>;

/// Destination for a rendered node.
pub enum RefSink<N> {
    /// A direct slot the node is written into.
    Slot(NodeSlot<N>),
    /// A callback that receives the node.
    Callback(RefCallback<N>),
}

impl<N> RefSink<N> {
    /// Wraps a closure as a callback sink.
    pub fn callback(f: impl Fn(Option<&N>) + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }

    /// Returns `true` if both sinks write to the same slot or callback.
    pub fn same_target(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Slot(a), Self::Slot(b)) => a.ptr_eq(b),
            (Self::Callback(a), Self::Callback(b)) => {
                core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl<N: Clone> RefSink<N> {
    /// Writes `node` into this sink.
    pub fn fill(&self, node: Option<&N>) {
        fill_ref(self, node);
    }
}

impl<N> Clone for RefSink<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Slot(slot) => Self::Slot(slot.clone()),
            Self::Callback(cb) => Self::Callback(Rc::clone(cb)),
        }
    }
}

impl<N> fmt::Debug for RefSink<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(_) => f.write_str("RefSink::Slot(..)"),
            Self::Callback(_) => f.write_str("RefSink::Callback(..)"),
        }
    }
}

impl<N> From<NodeSlot<N>> for RefSink<N> {
    fn from(slot: NodeSlot<N>) -> Self {
        Self::Slot(slot)
    }
}

/// Writes `node` into `sink`, whichever kind it is.
pub fn fill_ref<N: Clone>(sink: &RefSink<N>, node: Option<&N>) {
    match sink {
        RefSink::Slot(slot) => slot.set(node.cloned()),
        RefSink::Callback(cb) => cb(node),
    }
}

/// Merges `sinks` into a single sink that fans each write out to all of them.
///
/// `None` entries are skipped. Writes reach the remaining sinks in iteration
/// order. A single remaining sink is returned as is, so its identity survives.
///
/// ```
/// use understory_visibility::{NodeSlot, RefSink, compose_refs};
///
/// let own = NodeSlot::<u32>::new();
/// let tracker = NodeSlot::<u32>::new();
/// let merged = compose_refs([Some(RefSink::from(own.clone())), Some(tracker.clone().into())]);
///
/// merged.fill(Some(&7));
/// assert_eq!(own.get(), Some(7));
/// assert_eq!(tracker.get(), Some(7));
/// ```
pub fn compose_refs<N, I>(sinks: I) -> RefSink<N>
where
    N: Clone + 'static,
    I: IntoIterator<Item = Option<RefSink<N>>>,
{
    let mut sinks: SmallVec<[RefSink<N>; 2]> = sinks.into_iter().flatten().collect();
    if sinks.len() == 1 {
        if let Some(only) = sinks.pop() {
            return only;
        }
    }
    RefSink::Callback(Rc::new(move |node: Option<&N>| {
        for sink in &sinks {
            fill_ref(sink, node);
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn slot_and_callback_both_receive_node() {
        let slot = NodeSlot::<u32>::new();
        let seen: Rc<RefCell<Vec<Option<u32>>>> = Rc::default();
        let log = Rc::clone(&seen);
        let cb = RefSink::callback(move |n: Option<&u32>| log.borrow_mut().push(n.copied()));

        let merged = compose_refs([Some(RefSink::Slot(slot.clone())), Some(cb)]);
        merged.fill(Some(&3));
        assert_eq!(slot.get(), Some(3));
        merged.fill(None);
        assert!(slot.is_empty());
        assert_eq!(*seen.borrow(), [Some(3), None]);
    }

    #[test]
    fn absent_sinks_are_skipped() {
        let slot = NodeSlot::<u32>::new();
        let original = RefSink::Slot(slot.clone());
        let merged = compose_refs([None, Some(original.clone()), None]);
        // A lone sink comes back unchanged.
        assert!(merged.same_target(&original));
        merged.fill(Some(&9));
        assert_eq!(slot.get(), Some(9));
    }

    #[test]
    fn writes_follow_sink_order() {
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let a = Rc::clone(&order);
        let b = Rc::clone(&order);
        let merged = compose_refs([
            Some(RefSink::callback(move |_: Option<&u32>| a.borrow_mut().push("first"))),
            Some(RefSink::callback(move |_: Option<&u32>| b.borrow_mut().push("second"))),
        ]);
        merged.fill(Some(&1));
        assert_eq!(*order.borrow(), ["first", "second"]);
    }

    #[test]
    fn empty_composition_is_inert() {
        let merged = compose_refs::<u32, _>([None, None]);
        merged.fill(Some(&1));
        assert!(matches!(merged, RefSink::Callback(_)));
    }
}
