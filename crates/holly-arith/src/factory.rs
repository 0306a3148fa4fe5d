use holly::{GreenTree as _, NodeCache};
use triomphe::Arc;

use crate::node::{ArithKind, ArithNode};

/// Builds arithmetic nodes through a shared [`NodeCache`], collapsing equal
/// shapes onto canonical instances.
///
/// Every constructor follows the same protocol: probe first, allocate on a
/// miss, then offer the fresh node back for admission. Children must come
/// from the same factory (or at least the same cache) for parents to dedup,
/// since admission requires every child to be resident.
#[derive(Clone, Copy, Debug)]
pub struct ArithFactory<'cache> {
    cache: &'cache NodeCache<ArithNode>,
}

impl<'cache> ArithFactory<'cache> {
    pub fn new(cache: &'cache NodeCache<ArithNode>) -> Self {
        Self { cache }
    }

    /// The cache this factory interns through.
    pub fn cache(&self) -> &'cache NodeCache<ArithNode> {
        self.cache
    }

    pub fn constant(&self, value: i64) -> Arc<ArithNode> {
        let probe = ArithNode::Constant { value };
        let (found, hash) =
            self.cache.try_get_leaf(ArithKind::Constant, probe.data_hash(), |node| {
                probe.data_eq(node)
            });
        if let Some(node) = found {
            return node;
        }
        let node = Arc::new(probe);
        self.cache.add(&node, hash);
        node
    }

    pub fn add(&self, lhs: Arc<ArithNode>, rhs: Arc<ArithNode>) -> Arc<ArithNode> {
        let (found, hash) = self.cache.try_get(ArithKind::Add, [Some(&lhs), Some(&rhs)]);
        if let Some(node) = found {
            return node;
        }
        let node = Arc::new(ArithNode::Add { lhs, rhs });
        if let Some(hash) = hash {
            self.cache.add(&node, hash);
        }
        node
    }

    pub fn mul(&self, lhs: Arc<ArithNode>, rhs: Arc<ArithNode>) -> Arc<ArithNode> {
        let (found, hash) = self.cache.try_get(ArithKind::Mul, [Some(&lhs), Some(&rhs)]);
        if let Some(node) = found {
            return node;
        }
        let node = Arc::new(ArithNode::Mul { lhs, rhs });
        if let Some(hash) = hash {
            self.cache.add(&node, hash);
        }
        node
    }

    pub fn neg(&self, operand: Arc<ArithNode>) -> Arc<ArithNode> {
        let (found, hash) = self.cache.try_get(ArithKind::Neg, [Some(&operand)]);
        if let Some(node) = found {
            return node;
        }
        let node = Arc::new(ArithNode::Neg { operand });
        if let Some(hash) = hash {
            self.cache.add(&node, hash);
        }
        node
    }

    pub fn range(
        &self,
        start: Option<Arc<ArithNode>>,
        end: Option<Arc<ArithNode>>,
    ) -> Arc<ArithNode> {
        let (found, hash) = self.cache.try_get(ArithKind::Range, [start.as_ref(), end.as_ref()]);
        if let Some(node) = found {
            return node;
        }
        let node = Arc::new(ArithNode::Range { start, end });
        if let Some(hash) = hash {
            self.cache.add(&node, hash);
        }
        node
    }
}
