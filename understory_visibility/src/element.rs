// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal element description: kind, key, props, node reference, children.
//!
//! This is not a component framework. It carries just enough for the wrapper
//! to inspect a child, decide whether it can take a node reference, and hand
//! a decorated copy back to whatever host mounts it.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::Error;
use crate::node_ref::{RefSink, fill_ref};

/// Stable identity of an element among its siblings.
pub type Key = u64;

/// What an element renders to, as far as node references are concerned.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A host primitive such as a box or text run. Always renders to a node.
    Primitive(&'static str),
    /// A composite that forwards an external reference to the node it renders.
    Forwarding(&'static str),
    /// A composite that keeps node references to itself.
    Opaque(&'static str),
    /// A memoised wrapper around another kind.
    Memo(Box<ElementKind>),
}

/// How an element treats an external node reference.
///
/// Resolved once per child inspection via [`ElementKind::ref_support`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefSupport {
    /// The element is the node; the reference is filled directly.
    Direct,
    /// The element forwards the reference to the node it renders.
    Forwarded,
    /// The element cannot take an external reference.
    Unsupported,
}

impl ElementKind {
    /// Wraps this kind in [`ElementKind::Memo`].
    #[must_use]
    pub fn memo(self) -> Self {
        Self::Memo(Box::new(self))
    }

    /// Looks through memo wrappers to the kind that actually renders.
    pub fn unwrapped(&self) -> &Self {
        let mut kind = self;
        while let Self::Memo(inner) = kind {
            kind = inner;
        }
        kind
    }

    /// Name of the rendered kind, ignoring memo wrappers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Primitive(name) | Self::Forwarding(name) | Self::Opaque(name) => name,
            Self::Memo(inner) => inner.name(),
        }
    }

    /// Capability check: can this element take an external node reference?
    pub fn ref_support(&self) -> RefSupport {
        match self {
            Self::Primitive(_) => RefSupport::Direct,
            Self::Forwarding(_) => RefSupport::Forwarded,
            Self::Opaque(_) => RefSupport::Unsupported,
            Self::Memo(inner) => inner.ref_support(),
        }
    }

    /// Shorthand for `ref_support() != RefSupport::Unsupported`.
    pub fn accepts_ref(&self) -> bool {
        self.ref_support() != RefSupport::Unsupported
    }
}

/// Identity of a child, compared across renders to detect replacement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChildIdentity {
    /// Kind of the child.
    pub kind: ElementKind,
    /// Key of the child, if it has one.
    pub key: Option<Key>,
}

/// An element: kind, optional key, props, optional node reference, and children.
#[derive(Debug)]
pub struct Element<N, P> {
    /// What this element renders to.
    pub kind: ElementKind,
    /// Identity among siblings.
    pub key: Option<Key>,
    /// Caller-defined payload (style, order, content).
    pub props: P,
    /// Reference filled with the rendered node.
    pub node_ref: Option<RefSink<N>>,
    /// Nested elements.
    pub children: Vec<Self>,
}

impl<N, P> Element<N, P> {
    /// Creates a childless element without key or reference.
    pub fn new(kind: ElementKind, props: P) -> Self {
        Self {
            kind,
            key: None,
            props,
            node_ref: None,
            children: Vec::new(),
        }
    }

    /// Sets the key.
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the node reference, replacing any previous one.
    #[must_use]
    pub fn with_ref(mut self, sink: impl Into<RefSink<N>>) -> Self {
        self.node_ref = Some(sink.into());
        self
    }

    /// Appends one child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Identity used to detect that a different child took this one's place.
    pub fn identity(&self) -> ChildIdentity {
        ChildIdentity {
            kind: self.kind.clone(),
            key: self.key,
        }
    }
}

impl<N: Clone, P> Element<N, P> {
    /// Called by a host after mounting: fills the reference with `node`.
    ///
    /// Elements that cannot take a reference are left alone.
    pub fn attach(&self, node: &N) {
        if !self.kind.accepts_ref() {
            return;
        }
        if let Some(sink) = &self.node_ref {
            fill_ref(sink, Some(node));
        }
    }

    /// Called by a host before unmounting: clears the reference.
    pub fn detach(&self) {
        if !self.kind.accepts_ref() {
            return;
        }
        if let Some(sink) = &self.node_ref {
            fill_ref(sink, None);
        }
    }
}

/// Returns the single element in `children`.
///
/// Any other count is a configuration error.
pub fn only_child<N, P>(children: Vec<Element<N, P>>) -> Result<Element<N, P>, Error> {
    let found = children.len();
    let mut iter = children.into_iter();
    match (iter.next(), iter.next()) {
        (Some(only), None) => Ok(only),
        _ => Err(Error::ChildCount { found }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeSlot;
    use alloc::vec;

    #[test]
    fn capability_follows_kind() {
        assert_eq!(
            ElementKind::Primitive("box").ref_support(),
            RefSupport::Direct
        );
        assert_eq!(
            ElementKind::Forwarding("item").ref_support(),
            RefSupport::Forwarded
        );
        assert!(!ElementKind::Opaque("label").accepts_ref());
    }

    #[test]
    fn memo_is_transparent() {
        let kind = ElementKind::Forwarding("item").memo().memo();
        assert_eq!(kind.ref_support(), RefSupport::Forwarded);
        assert_eq!(kind.name(), "item");
        assert!(!ElementKind::Opaque("label").memo().accepts_ref());
    }

    #[test]
    fn only_child_counts() {
        let none: Vec<Element<u32, ()>> = Vec::new();
        assert_eq!(only_child(none).unwrap_err(), Error::ChildCount { found: 0 });

        let two = vec![
            Element::<u32, ()>::new(ElementKind::Primitive("a"), ()),
            Element::new(ElementKind::Primitive("b"), ()),
        ];
        assert_eq!(only_child(two).unwrap_err(), Error::ChildCount { found: 2 });

        let one = vec![Element::<u32, ()>::new(ElementKind::Primitive("a"), ()).with_key(4)];
        assert_eq!(only_child(one).unwrap().key, Some(4));
    }

    #[test]
    fn attach_skips_opaque_elements() {
        let slot = NodeSlot::<u32>::new();
        let opaque = Element::<u32, ()>::new(ElementKind::Opaque("label"), ()).with_ref(slot.clone());
        opaque.attach(&1);
        assert!(slot.is_empty());

        let boxed = Element::<u32, ()>::new(ElementKind::Primitive("box"), ()).with_ref(slot.clone());
        boxed.attach(&2);
        assert_eq!(slot.get(), Some(2));
        boxed.detach();
        assert!(slot.is_empty());
    }
}
