use triomphe::Arc;

use crate::{GreenTree, NodeKind, RedNode, slot_out_of_range};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum TestKind {
    Leaf,
    Pair,
    Opaque,
}

impl NodeKind for TestKind {
    fn raw(self) -> u16 {
        self as u16
    }
}

/// Minimal tree family for the in-crate tests: value leaves, two-slot pairs
/// with either side absent-able, and a non-cacheable opaque leaf.
#[derive(Debug)]
pub(crate) enum TestNode {
    Leaf { value: u32 },
    Pair { first: Option<Arc<TestNode>>, second: Option<Arc<TestNode>> },
    Opaque { token: u32 },
}

impl TestNode {
    pub(crate) fn leaf(value: u32) -> Arc<Self> {
        Arc::new(Self::Leaf { value })
    }

    pub(crate) fn pair(first: Option<Arc<Self>>, second: Option<Arc<Self>>) -> Arc<Self> {
        Arc::new(Self::Pair { first, second })
    }

    pub(crate) fn opaque(token: u32) -> Arc<Self> {
        Arc::new(Self::Opaque { token })
    }
}

impl GreenTree for TestNode {
    type Kind = TestKind;
    type Red = RedNode<Self>;

    fn kind(&self) -> TestKind {
        match self {
            Self::Leaf { .. } => TestKind::Leaf,
            Self::Pair { .. } => TestKind::Pair,
            Self::Opaque { .. } => TestKind::Opaque,
        }
    }

    fn slot_count(&self) -> usize {
        match self {
            Self::Pair { .. } => 2,
            Self::Leaf { .. } | Self::Opaque { .. } => 0,
        }
    }

    fn slot(&self, index: usize) -> Option<&Arc<Self>> {
        match (self, index) {
            (Self::Pair { first, .. }, 0) => first.as_ref(),
            (Self::Pair { second, .. }, 1) => second.as_ref(),
            _ => slot_out_of_range(self.kind(), index),
        }
    }

    fn is_cacheable(&self) -> bool {
        !matches!(self, Self::Opaque { .. })
    }

    fn data_hash(&self) -> u32 {
        match self {
            Self::Leaf { value } => *value,
            Self::Pair { .. } | Self::Opaque { .. } => 0,
        }
    }

    fn data_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf { value: lhs }, Self::Leaf { value: rhs }) => lhs == rhs,
            (Self::Opaque { token: lhs }, Self::Opaque { token: rhs }) => lhs == rhs,
            _ => true,
        }
    }
}
