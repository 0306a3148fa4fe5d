//! The position-independent shape layer: kinds, slots, traversal, equivalence.

use std::ops::Range;
use std::{fmt, ptr};

use triomphe::Arc;

use crate::red::RedTree;

/// A closed enumeration of node kinds for one tree family.
pub trait NodeKind: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Returns the stable discriminant mixed into cache hashes.
    fn raw(self) -> u16;
}

/// The green contract: one immutable, position-independent node.
///
/// A green node knows its kind and its fixed child slots and nothing else.
/// It never refers to a parent, an offset, or any mutable state, which is
/// what lets whole subtrees be shared between trees and across threads.
pub trait GreenTree: Send + Sync + Sized + 'static {
    /// The family's kind enumeration.
    type Kind: NodeKind;
    /// The family's red counterpart.
    type Red: RedTree<Green = Self>;

    /// Returns the node's kind.
    fn kind(&self) -> Self::Kind;

    /// Returns the number of child slots, occupied or not.
    fn slot_count(&self) -> usize;

    /// Returns the child in `index`, or `None` when that optional child is
    /// absent.
    ///
    /// # Panics
    ///
    /// Panics when `index` is not a slot of this kind. Asking a shape for a
    /// slot it does not have is a defect in the calling code, not a
    /// recoverable condition.
    fn slot(&self, index: usize) -> Option<&Arc<Self>>;

    /// Returns whether this node may be shared through a
    /// [`NodeCache`](crate::NodeCache).
    ///
    /// Nodes wrapping per-instance-unique data return `false`; the cache
    /// then refuses them and everything built on top of them.
    fn is_cacheable(&self) -> bool {
        true
    }

    /// Returns a fingerprint of per-node data not covered by kind and child
    /// identities, such as a leaf's literal value.
    fn data_hash(&self) -> u32 {
        0
    }

    /// Returns whether two nodes of equal kind carry equal per-node data.
    fn data_eq(&self, _other: &Self) -> bool {
        true
    }

    /// Returns the child in `index`, panicking if the slot is empty.
    #[track_caller]
    fn required_slot(&self, index: usize) -> &Arc<Self> {
        let Some(child) = self.slot(index) else {
            panic!("{:?} is missing required slot {index}", self.kind())
        };
        child
    }

    /// Returns the non-absent direct children, in slot order.
    fn children(&self) -> Children<'_, Self> {
        Children { node: self, slots: 0..self.slot_count() }
    }

    /// Returns this node and every node below it, parents before children,
    /// siblings left to right.
    fn descendants(&self) -> Descendants<'_, Self> {
        Descendants { stack: vec![self] }
    }

    /// Returns whether two nodes have the same shape and data, whether or
    /// not they are the same allocation.
    fn is_equivalent_to(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        if self.kind() != other.kind()
            || self.slot_count() != other.slot_count()
            || !self.data_eq(other)
        {
            return false;
        }
        (0..self.slot_count()).all(|index| match (self.slot(index), other.slot(index)) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => lhs.is_equivalent_to(rhs),
            _ => false,
        })
    }
}

/// Panic for an access outside a node's slot range; `slot` implementations
/// call this from their fallthrough match arm.
#[cold]
#[track_caller]
pub fn slot_out_of_range<K: fmt::Debug>(kind: K, index: usize) -> ! {
    panic!("{kind:?} has no slot {index}")
}

/// Iterator over the non-absent direct children of a green node.
pub struct Children<'a, G> {
    node: &'a G,
    slots: Range<usize>,
}

impl<G> Clone for Children<'_, G> {
    fn clone(&self) -> Self {
        Self { node: self.node, slots: self.slots.clone() }
    }
}

impl<'a, G: GreenTree> Iterator for Children<'a, G> {
    type Item = &'a Arc<G>;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().find_map(|index| self.node.slot(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

impl<G: GreenTree> DoubleEndedIterator for Children<'_, G> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().rev().find_map(|index| self.node.slot(index))
    }
}

/// Pre-order iterator over a green node and everything below it.
pub struct Descendants<'a, G> {
    stack: Vec<&'a G>,
}

impl<G> Clone for Descendants<'_, G> {
    fn clone(&self) -> Self {
        Self { stack: self.stack.clone() }
    }
}

impl<'a, G: GreenTree> Iterator for Descendants<'a, G> {
    type Item = &'a G;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children().rev() {
            self.stack.push(&**child);
        }
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), None)
    }
}

#[cfg(test)]
mod tests {
    use triomphe::Arc;

    use super::GreenTree as _;
    use crate::testing::{TestKind, TestNode};

    #[test]
    fn slots_and_kinds() {
        let pair = TestNode::pair(Some(TestNode::leaf(1)), None);
        assert_eq!(pair.kind(), TestKind::Pair);
        assert_eq!(pair.slot_count(), 2);
        assert!(pair.slot(0).is_some());
        assert!(pair.slot(1).is_none());
    }

    #[test]
    fn required_slot_returns_the_child() {
        let leaf = TestNode::leaf(7);
        let pair = TestNode::pair(Some(leaf.clone()), None);
        assert!(Arc::ptr_eq(pair.required_slot(0), &leaf));
    }

    #[test]
    #[should_panic(expected = "missing required slot 1")]
    fn required_slot_panics_on_an_absent_child() {
        let pair = TestNode::pair(Some(TestNode::leaf(1)), None);
        pair.required_slot(1);
    }

    #[test]
    #[should_panic(expected = "has no slot 5")]
    fn slot_panics_out_of_range() {
        let pair = TestNode::pair(None, None);
        pair.slot(5);
    }

    #[test]
    fn children_skip_absent_slots() {
        let first = TestNode::leaf(1);
        let second = TestNode::leaf(2);
        let pair = TestNode::pair(Some(first.clone()), Some(second.clone()));
        let children: Vec<_> = pair.children().collect();
        assert_eq!(children.len(), 2);
        assert!(Arc::ptr_eq(children[0], &first));
        assert!(Arc::ptr_eq(children[1], &second));

        let gap = TestNode::pair(None, Some(second.clone()));
        let children: Vec<_> = gap.children().collect();
        assert_eq!(children.len(), 1);
        assert!(Arc::ptr_eq(children[0], &second));
    }

    #[test]
    fn children_iterate_from_both_ends() {
        let pair = TestNode::pair(Some(TestNode::leaf(1)), Some(TestNode::leaf(2)));
        let backwards: Vec<u32> = pair.children().rev().map(|child| child.data_hash()).collect();
        assert_eq!(backwards, [2, 1]);
    }

    #[test]
    fn descendants_are_preorder_and_complete() {
        // pair(pair(1, 2), 3) flattens to [outer, inner, 1, 2, 3]
        let inner = TestNode::pair(Some(TestNode::leaf(1)), Some(TestNode::leaf(2)));
        let outer = TestNode::pair(Some(inner), Some(TestNode::leaf(3)));
        let kinds: Vec<_> = outer.descendants().map(|node| node.kind()).collect();
        assert_eq!(
            kinds,
            [TestKind::Pair, TestKind::Pair, TestKind::Leaf, TestKind::Leaf, TestKind::Leaf]
        );
        let values: Vec<u32> = outer.descendants().map(|node| node.data_hash()).collect();
        assert_eq!(values, [0, 0, 1, 2, 3]);
    }

    #[test]
    fn descendants_restart_from_scratch() {
        let tree = TestNode::pair(Some(TestNode::leaf(1)), Some(TestNode::leaf(2)));
        let first: Vec<u32> = tree.descendants().map(|node| node.data_hash()).collect();
        let second: Vec<u32> = tree.descendants().map(|node| node.data_hash()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn equivalence_is_structural() {
        let lhs = TestNode::pair(Some(TestNode::leaf(1)), Some(TestNode::leaf(2)));
        let rhs = TestNode::pair(Some(TestNode::leaf(1)), Some(TestNode::leaf(2)));
        assert!(lhs.is_equivalent_to(&lhs));
        assert!(lhs.is_equivalent_to(&rhs));
        assert!(rhs.is_equivalent_to(&lhs));
    }

    #[test]
    fn equivalence_sees_values_kinds_and_gaps() {
        let one = TestNode::leaf(1);
        assert!(!one.is_equivalent_to(&TestNode::leaf(2)));
        assert!(!one.is_equivalent_to(&TestNode::opaque(1)));

        let left = TestNode::pair(Some(TestNode::leaf(1)), None);
        let right = TestNode::pair(None, Some(TestNode::leaf(1)));
        assert!(!left.is_equivalent_to(&right));
    }
}
