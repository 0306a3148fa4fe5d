use std::fmt;

use holly::{GreenTree, NodeKind, RedNode, hash, slot_out_of_range};
use triomphe::Arc;

/// Kinds of the arithmetic family.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ArithKind {
    Constant,
    Add,
    Mul,
    Neg,
    Range,
    External,
}

impl NodeKind for ArithKind {
    fn raw(self) -> u16 {
        self as u16
    }
}

/// A green arithmetic node.
///
/// `Constant` and `External` are leaves. `External` stands in for a handle
/// into host state, unique per construction, so it is never deduplicated.
/// `Range` keeps both endpoints optional and exercises absent slots.
#[derive(Debug)]
pub enum ArithNode {
    Constant { value: i64 },
    Add { lhs: Arc<ArithNode>, rhs: Arc<ArithNode> },
    Mul { lhs: Arc<ArithNode>, rhs: Arc<ArithNode> },
    Neg { operand: Arc<ArithNode> },
    Range { start: Option<Arc<ArithNode>>, end: Option<Arc<ArithNode>> },
    External { handle: u64 },
}

/// Red view over the arithmetic family.
pub type ArithRed = RedNode<ArithNode>;

impl ArithNode {
    /// Builds an external reference. Each call is a distinct instance and
    /// stays out of every cache.
    pub fn external(handle: u64) -> Arc<Self> {
        Arc::new(Self::External { handle })
    }
}

impl GreenTree for ArithNode {
    type Kind = ArithKind;
    type Red = ArithRed;

    fn kind(&self) -> ArithKind {
        match self {
            Self::Constant { .. } => ArithKind::Constant,
            Self::Add { .. } => ArithKind::Add,
            Self::Mul { .. } => ArithKind::Mul,
            Self::Neg { .. } => ArithKind::Neg,
            Self::Range { .. } => ArithKind::Range,
            Self::External { .. } => ArithKind::External,
        }
    }

    fn slot_count(&self) -> usize {
        match self {
            Self::Constant { .. } | Self::External { .. } => 0,
            Self::Neg { .. } => 1,
            Self::Add { .. } | Self::Mul { .. } | Self::Range { .. } => 2,
        }
    }

    fn slot(&self, index: usize) -> Option<&Arc<Self>> {
        match (self, index) {
            (Self::Add { lhs, .. } | Self::Mul { lhs, .. }, 0) => Some(lhs),
            (Self::Add { rhs, .. } | Self::Mul { rhs, .. }, 1) => Some(rhs),
            (Self::Neg { operand }, 0) => Some(operand),
            (Self::Range { start, .. }, 0) => start.as_ref(),
            (Self::Range { end, .. }, 1) => end.as_ref(),
            _ => slot_out_of_range(self.kind(), index),
        }
    }

    fn is_cacheable(&self) -> bool {
        !matches!(self, Self::External { .. })
    }

    fn data_hash(&self) -> u32 {
        if let Self::Constant { value } = self {
            let bits = *value as u64;
            hash::combine((bits >> 32) as u32, bits as u32)
        } else {
            0
        }
    }

    fn data_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Constant { value: lhs }, Self::Constant { value: rhs }) => lhs == rhs,
            (Self::External { handle: lhs }, Self::External { handle: rhs }) => lhs == rhs,
            _ => true,
        }
    }
}

impl fmt::Display for ArithNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant { value } => write!(f, "{value}"),
            Self::Add { lhs, rhs } => write!(f, "({} + {})", **lhs, **rhs),
            Self::Mul { lhs, rhs } => write!(f, "({} * {})", **lhs, **rhs),
            Self::Neg { operand } => write!(f, "(-{})", **operand),
            Self::Range { start, end } => {
                f.write_str("(")?;
                if let Some(start) = start {
                    write!(f, "{}", **start)?;
                }
                f.write_str("..")?;
                if let Some(end) = end {
                    write!(f, "{}", **end)?;
                }
                f.write_str(")")
            }
            Self::External { handle } => write!(f, "external#{handle}"),
        }
    }
}
