//! The ephemeral navigation layer: parent-aware views over shared green trees.

use std::fmt;
use std::iter::successors;
use std::ops::Range;

use triomphe::Arc;

use crate::green::GreenTree;

/// The red contract: a parent-aware view of one green node.
///
/// Red views are navigation state, never shared and never interned; any
/// number of independent views may exist over the same green tree at once,
/// each with its own parent chain.
pub trait RedTree: Clone + Sized {
    /// The family's green counterpart.
    type Green: GreenTree;

    /// Materializes a view of `green` with no parent.
    fn new_root(green: Arc<Self::Green>) -> Self;

    /// Materializes a view of `green` sitting in `slot_index` of `parent`.
    fn new_child(green: Arc<Self::Green>, parent: &Self, slot_index: usize) -> Self;

    /// Returns the green node this view wraps.
    fn green(&self) -> &Arc<Self::Green>;

    /// Returns the parent view, or `None` at a root.
    fn parent(&self) -> Option<&Self>;

    /// Returns which parent slot this view occupies, or `None` at a root.
    fn index_in_parent(&self) -> Option<usize>;

    /// Returns the kind of the underlying green node.
    fn kind(&self) -> <Self::Green as GreenTree>::Kind {
        self.green().kind()
    }

    /// Materializes the child in `slot_index`, or `None` when that optional
    /// child is absent.
    ///
    /// Every call builds a fresh view; two calls for the same slot return
    /// independent instances.
    fn child(&self, slot_index: usize) -> Option<Self> {
        let green = self.green().slot(slot_index)?.clone();
        Some(Self::new_child(green, self, slot_index))
    }

    /// Materializes the non-absent children, in slot order.
    fn children(&self) -> RedChildren<'_, Self> {
        RedChildren { parent: self, slots: 0..self.green().slot_count() }
    }

    /// Walks from this view up through its parents to the root.
    fn ancestors(&self) -> impl Iterator<Item = &Self> {
        successors(Some(self), |view| view.parent())
    }
}

/// Cheap cloneable handle over a green node plus its parent chain; the
/// ready-made [`RedTree`] implementation tree families name as their red
/// root.
pub struct RedNode<G> {
    data: Arc<RedData<G>>,
}

struct RedData<G> {
    green: Arc<G>,
    /// Parent handle plus this view's slot index within it; `None` at a root.
    parent: Option<(RedNode<G>, usize)>,
}

impl<G> Clone for RedNode<G> {
    fn clone(&self) -> Self {
        Self { data: self.data.clone() }
    }
}

impl<G: GreenTree> RedNode<G> {
    /// Returns whether two handles are the same materialized view.
    ///
    /// Distinct materializations over one green tree never compare equal
    /// here; structural comparison belongs to the green layer's
    /// [`is_equivalent_to`](GreenTree::is_equivalent_to).
    pub fn ptr_eq(lhs: &Self, rhs: &Self) -> bool {
        Arc::ptr_eq(&lhs.data, &rhs.data)
    }
}

impl<G: GreenTree> RedTree for RedNode<G> {
    type Green = G;

    fn new_root(green: Arc<G>) -> Self {
        Self { data: Arc::new(RedData { green, parent: None }) }
    }

    fn new_child(green: Arc<G>, parent: &Self, slot_index: usize) -> Self {
        Self { data: Arc::new(RedData { green, parent: Some((parent.clone(), slot_index)) }) }
    }

    #[inline]
    fn green(&self) -> &Arc<G> {
        &self.data.green
    }

    #[inline]
    fn parent(&self) -> Option<&Self> {
        self.data.parent.as_ref().map(|(parent, _)| parent)
    }

    #[inline]
    fn index_in_parent(&self) -> Option<usize> {
        self.data.parent.as_ref().map(|&(_, index)| index)
    }
}

impl<G: GreenTree> fmt::Debug for RedNode<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedNode")
            .field("kind", &self.kind())
            .field("index_in_parent", &self.index_in_parent())
            .finish_non_exhaustive()
    }
}

/// Iterator over freshly materialized red children.
pub struct RedChildren<'a, R> {
    parent: &'a R,
    slots: Range<usize>,
}

impl<R> Clone for RedChildren<'_, R> {
    fn clone(&self) -> Self {
        Self { parent: self.parent, slots: self.slots.clone() }
    }
}

impl<R: RedTree> Iterator for RedChildren<'_, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        self.slots.by_ref().find_map(|index| self.parent.child(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

impl<R: RedTree> DoubleEndedIterator for RedChildren<'_, R> {
    fn next_back(&mut self) -> Option<R> {
        self.slots.by_ref().rev().find_map(|index| self.parent.child(index))
    }
}
