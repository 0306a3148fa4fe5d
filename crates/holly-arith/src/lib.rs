//! An arithmetic expression family over `holly`, written the way a node
//! generator would emit it: a closed kind set, one green node per shape,
//! and cache-consulting constructors.
//!
//! The family doubles as the reference client for the interning protocol:
//! leaves carry data, composites carry children, ranges leave slots absent,
//! and externals opt out of caching entirely.

mod factory;
mod node;

pub use factory::ArithFactory;
pub use node::{ArithKind, ArithNode, ArithRed};
