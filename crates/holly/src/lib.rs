//! Two-layer immutable syntax trees: position-independent green nodes shared
//! through a verifying lock-free cache, plus ephemeral parent-aware red views
//! materialized on demand.
//!
//! A tree family implements [`GreenTree`] for its node type (usually emitted
//! by a grammar tool, but hand-written works the same), names [`RedNode`] as
//! its red counterpart, and routes construction through one shared
//! [`NodeCache`] so structurally identical subtrees collapse onto a single
//! allocation.

mod cache;
mod green;
pub mod hash;
mod red;

#[cfg(test)]
mod testing;

pub use cache::{CacheHash, NodeCache};
pub use green::{Children, Descendants, GreenTree, NodeKind, slot_out_of_range};
pub use red::{RedChildren, RedNode, RedTree};
