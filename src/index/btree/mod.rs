//! B+tree index implementation.
//!
//! - `node.rs` : Leaf and internal nodes, and the split primitives
//! - `tree.rs` : [`BpTreeMap`], search, insert, ordered and range access

mod node;
mod tree;

pub use tree::BpTreeMap;
