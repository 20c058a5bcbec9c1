//! B+tree nodes and the split primitives.
//!
//! A node is either a leaf (keys + values) or internal (separator keys +
//! children). Nodes own their children outright; a split hands the new
//! right sibling back to the caller as a [`Split`], and the parent is the
//! only place it gets linked in.

use std::fmt::Debug;

use crate::common::{Error, Result};

/// A B+tree node.
#[derive(Debug)]
pub(crate) enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Internal(InternalNode<K, V>),
}

/// Sorted keys with their values, `keys[i]` maps to `values[i]`.
#[derive(Debug)]
pub(crate) struct LeafNode<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
}

/// Separators and children.
///
/// `keys[i]` is the smallest key anywhere under `children[i + 1]`, so
/// `children.len() == keys.len() + 1` always holds.
#[derive(Debug)]
pub(crate) struct InternalNode<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<Box<Node<K, V>>>,
}

/// Result of splitting an overflowing node.
///
/// The caller inserts `separator` into its own keys and `right` directly
/// after the child that split.
#[derive(Debug)]
pub(crate) struct Split<K, V> {
    pub(crate) separator: K,
    pub(crate) right: Box<Node<K, V>>,
}

impl<K, V> Node<K, V> {
    /// An empty leaf with room for one overflow entry.
    pub(crate) fn empty_leaf(order: usize) -> Self {
        Node::Leaf(LeafNode {
            keys: Vec::with_capacity(order),
            values: Vec::with_capacity(order),
        })
    }

    /// The keys (leaf) or separators (internal) held by this node.
    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Leaf(leaf) => &leaf.keys,
            Node::Internal(inner) => &inner.keys,
        }
    }
}

impl<K: Ord + Clone + Debug, V> LeafNode<K, V> {
    /// Insert in sorted position, splitting if the leaf overflows.
    ///
    /// The key is first placed in sorted order, so for one call the leaf
    /// holds `order` entries (the merged buffer). Then the left half keeps
    /// `ceil(order / 2)` entries and the rest move to a new right leaf,
    /// whose first key becomes the separator.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if the key is already in the leaf; nothing
    ///   is modified in that case
    pub(crate) fn insert(&mut self, key: K, value: V, order: usize) -> Result<Option<Split<K, V>>> {
        let pos = match self.keys.binary_search(&key) {
            Ok(_) => return Err(Error::DuplicateKey(format!("{:?}", key))),
            Err(pos) => pos,
        };
        self.keys.insert(pos, key);
        self.values.insert(pos, value);

        // Room left: at most order - 1 keys
        if self.keys.len() < order {
            return Ok(None);
        }

        let left_len = (order + 1) / 2;
        let mut right_keys = Vec::with_capacity(order);
        let mut right_values = Vec::with_capacity(order);
        right_keys.extend(self.keys.drain(left_len..));
        right_values.extend(self.values.drain(left_len..));

        let separator = right_keys[0].clone();
        Ok(Some(Split {
            separator,
            right: Box::new(Node::Leaf(LeafNode {
                keys: right_keys,
                values: right_values,
            })),
        }))
    }
}

impl<K: Ord + Debug, V> InternalNode<K, V> {
    /// A new root over the two halves of the old one.
    pub(crate) fn new_root(separator: K, left: Box<Node<K, V>>, right: Box<Node<K, V>>, order: usize) -> Self {
        let mut keys = Vec::with_capacity(order);
        let mut children = Vec::with_capacity(order + 1);
        keys.push(separator);
        children.push(left);
        children.push(right);
        Self { keys, children }
    }

    /// Index of the child whose key range covers `key`.
    ///
    /// Separators equal to `key` send it right, since a separator is the
    /// minimum of its right subtree.
    #[inline]
    pub(crate) fn child_index(&self, key: &K) -> usize {
        self.keys.partition_point(|sep| sep <= key)
    }

    /// Link in a split of `children[idx]`, splitting this node in turn if
    /// it overflows.
    ///
    /// With `order` separators in the merged buffer, the left half keeps
    /// `floor(order / 2)` of them and their `floor(order / 2) + 1`
    /// children; the next separator moves up to the caller and the rest go
    /// to the new right node along with the remaining children.
    ///
    /// # Errors
    /// - `Error::StructuralInvariant` if the child and key counts disagree
    ///   after the split
    pub(crate) fn absorb(&mut self, idx: usize, split: Split<K, V>, order: usize) -> Result<Option<Split<K, V>>> {
        self.keys.insert(idx, split.separator);
        self.children.insert(idx + 1, split.right);

        if self.keys.len() < order {
            return Ok(None);
        }

        let left_len = order / 2;
        let mut right_keys: Vec<K> = Vec::with_capacity(order);
        let mut right_children = Vec::with_capacity(order + 1);
        right_keys.extend(self.keys.drain(left_len..));
        right_children.extend(self.children.drain(left_len + 1..));

        let separator = right_keys.remove(0);

        if self.children.len() != self.keys.len() + 1 || right_children.len() != right_keys.len() + 1 {
            return Err(Error::StructuralInvariant(format!(
                "internal split produced {}/{} and {}/{} children/keys",
                self.children.len(),
                self.keys.len(),
                right_children.len(),
                right_keys.len()
            )));
        }

        Ok(Some(Split {
            separator,
            right: Box::new(Node::Internal(InternalNode {
                keys: right_keys,
                children: right_children,
            })),
        }))
    }
}
