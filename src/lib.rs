//! Red-black tree index over ordered values, with parent-linked nodes
//! and insertion rebalancing.

mod depth;
mod error;
mod rbtree;

pub use crate::depth::Depth;
pub use crate::error::RbError;
pub use crate::rbtree::{Color, Node, RbTree, Stats};
