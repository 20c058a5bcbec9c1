//! The B+tree map.

use std::fmt::Debug;
use std::ops::{Bound, RangeBounds};

use tracing::debug;

use super::node::{InternalNode, Node, Split};
use crate::common::{Error, Result, DEFAULT_ORDER};
use crate::index::{IndexStats, KeyIndex};

/// An ordered map backed by a B+tree.
///
/// `ORDER` is the maximum number of children per node; a node holds at
/// most `ORDER - 1` keys. Values live only in the leaves, and every leaf
/// sits at the same depth.
///
/// # Architecture
/// ```text
///                 ┌──────────┐
///                 │  [ 6 ]   │            internal: separators
///                 └──┬────┬──┘
///          ┌─────────┘    └─────┐
///     ┌────┴─────┐         ┌────┴───┐
///     │ [ 2, 4 ] │         │  [ 8 ] │
///     └┬───┬───┬─┘         └─┬────┬─┘
///   [0,1][2,3][4,5]       [6,7] [8,9]     leaves: keys + values
/// ```
/// Separator `keys[i]` equals the smallest key under `children[i + 1]`.
///
/// # Growth
/// Inserts that overflow a leaf split it and push a separator into the
/// parent, which may split in turn. When the root splits, a new root with
/// two children is created; this is the only way the height changes.
///
/// # Example
/// ```
/// use tabledb::index::BpTreeMap;
///
/// let mut tree: BpTreeMap<u32, u32> = BpTreeMap::new();
/// for k in 0..10 {
///     tree.put(k, k * k).unwrap();
/// }
///
/// assert_eq!(tree.get(&7), Some(&49));
/// assert_eq!(tree.first_key().unwrap(), &0);
/// assert_eq!(tree.height(), 3);
/// ```
#[derive(Debug)]
pub struct BpTreeMap<K, V, const ORDER: usize = DEFAULT_ORDER> {
    /// Root node; a leaf until the first split.
    root: Box<Node<K, V>>,

    /// Number of stored pairs.
    len: usize,

    /// Number of levels, counting the leaves.
    height: usize,

    /// Access and growth counters.
    stats: IndexStats,
}

impl<K, V, const ORDER: usize> BpTreeMap<K, V, ORDER> {
    const VALID_ORDER: () = assert!(ORDER >= 3, "B+tree ORDER must be at least 3");

    /// Create an empty tree.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_ORDER;

        Self {
            root: Box::new(Node::empty_leaf(ORDER)),
            len: 0,
            height: 1,
            stats: IndexStats::new(),
        }
    }

    /// Maximum number of children per node.
    pub const fn order(&self) -> usize {
        ORDER
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels, counting the leaf level (an empty tree has 1).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Access and growth counters.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

impl<K: Ord + Clone + Debug, V, const ORDER: usize> BpTreeMap<K, V, ORDER> {
    // ========================================================================
    // Point access
    // ========================================================================

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.stats.record_lookup();

        let mut node = &*self.root;
        loop {
            self.stats.record_visit();
            match node {
                Node::Leaf(leaf) => {
                    return leaf.keys.binary_search(key).ok().map(|i| &leaf.values[i]);
                }
                Node::Internal(inner) => node = &inner.children[inner.child_index(key)],
            }
        }
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Insert a new key-value pair.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if the key is already present (the tree is
    ///   not modified)
    /// - `Error::StructuralInvariant` if split bookkeeping goes wrong
    pub fn put(&mut self, key: K, value: V) -> Result<()> {
        if let Some(split) = Self::insert_into(&mut self.root, key, value, &self.stats)? {
            self.grow_root(split);
        }
        self.len += 1;
        Ok(())
    }

    // ========================================================================
    // Ordered access
    // ========================================================================

    /// The smallest key.
    ///
    /// # Errors
    /// - `Error::EmptyStructure` if the tree holds no keys
    pub fn first_key(&self) -> Result<&K> {
        let mut node = &*self.root;
        while let Node::Internal(inner) = node {
            node = &inner.children[0];
        }
        node.keys().first().ok_or(Error::EmptyStructure)
    }

    /// The largest key.
    ///
    /// # Errors
    /// - `Error::EmptyStructure` if the tree holds no keys
    pub fn last_key(&self) -> Result<&K> {
        let mut node = &*self.root;
        while let Node::Internal(inner) = node {
            node = &inner.children[inner.children.len() - 1];
        }
        node.keys().last().ok_or(Error::EmptyStructure)
    }

    /// All pairs in ascending key order.
    pub fn entries(&self) -> Vec<(&K, &V)> {
        let mut out = Vec::with_capacity(self.len);
        Self::collect_in_order(&self.root, &mut out);
        out
    }

    /// Pairs whose keys fall within `bounds`, ascending.
    pub fn range<R: RangeBounds<K>>(&self, bounds: R) -> Vec<(&K, &V)> {
        self.entries()
            .into_iter()
            .filter(|(k, _)| bounds.contains(*k))
            .collect()
    }

    /// Pairs with `key < to_key`.
    pub fn head_map(&self, to_key: &K) -> Vec<(&K, &V)> {
        self.range((Bound::Unbounded, Bound::Excluded(to_key.clone())))
    }

    /// Pairs with `from_key <= key`.
    pub fn tail_map(&self, from_key: &K) -> Vec<(&K, &V)> {
        self.range((Bound::Included(from_key.clone()), Bound::Unbounded))
    }

    /// Pairs with `from_key <= key < to_key`.
    ///
    /// Empty when `from_key >= to_key`.
    pub fn sub_map(&self, from_key: &K, to_key: &K) -> Vec<(&K, &V)> {
        self.range((
            Bound::Included(from_key.clone()),
            Bound::Excluded(to_key.clone()),
        ))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Keys of every node, level by level from the root.
    ///
    /// Each level lists its nodes left to right. Useful as a compact,
    /// comparable picture of the tree's shape.
    pub fn levels(&self) -> Vec<Vec<Vec<K>>> {
        let mut levels = Vec::with_capacity(self.height);
        let mut current: Vec<&Node<K, V>> = vec![&*self.root];

        while !current.is_empty() {
            levels.push(current.iter().map(|n| n.keys().to_vec()).collect());
            current = current
                .into_iter()
                .flat_map(|n| match n {
                    Node::Internal(inner) => inner.children.iter().map(|c| &**c).collect::<Vec<_>>(),
                    Node::Leaf(_) => Vec::new(),
                })
                .collect();
        }
        levels
    }

    /// Verify every structural invariant of the tree.
    ///
    /// # Errors
    /// - `Error::StructuralInvariant` describing the first violation found
    pub fn check_invariants(&self) -> Result<()> {
        let mut leaf_depth = None;
        let mut count = 0;
        Self::check_node(&self.root, true, 1, None, None, &mut leaf_depth, &mut count)?;

        if count != self.len {
            return Err(Error::StructuralInvariant(format!(
                "tree holds {} entries but len is {}",
                count, self.len
            )));
        }
        if leaf_depth.unwrap_or(1) != self.height {
            return Err(Error::StructuralInvariant(format!(
                "leaves at depth {:?} but height is {}",
                leaf_depth, self.height
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Internal: insertion
    // ========================================================================

    /// Insert below `node`, returning a split the caller must link in.
    fn insert_into(node: &mut Node<K, V>, key: K, value: V, stats: &IndexStats) -> Result<Option<Split<K, V>>> {
        match node {
            Node::Leaf(leaf) => {
                let split = leaf.insert(key, value, ORDER)?;
                if let Some(split) = &split {
                    stats.record_split();
                    debug!(separator = ?split.separator, order = ORDER, "b+tree leaf split");
                }
                Ok(split)
            }
            Node::Internal(inner) => {
                let idx = inner.child_index(&key);
                let Some(child_split) = Self::insert_into(&mut inner.children[idx], key, value, stats)? else {
                    return Ok(None);
                };

                let split = inner.absorb(idx, child_split, ORDER)?;
                if let Some(split) = &split {
                    stats.record_split();
                    debug!(separator = ?split.separator, order = ORDER, "b+tree internal split");
                }
                Ok(split)
            }
        }
    }

    /// Replace the root with a new one over the two halves of a root split.
    fn grow_root(&mut self, split: Split<K, V>) {
        let old_root = std::mem::replace(&mut self.root, Box::new(Node::empty_leaf(ORDER)));
        self.root = Box::new(Node::Internal(InternalNode::new_root(
            split.separator,
            old_root,
            split.right,
            ORDER,
        )));
        self.height += 1;
        self.stats.record_expansion();
        debug!(height = self.height, "b+tree root split");
    }

    // ========================================================================
    // Internal: traversal and checking
    // ========================================================================

    fn collect_in_order<'a>(node: &'a Node<K, V>, out: &mut Vec<(&'a K, &'a V)>) {
        match node {
            Node::Leaf(leaf) => out.extend(leaf.keys.iter().zip(leaf.values.iter())),
            Node::Internal(inner) => {
                for child in &inner.children {
                    Self::collect_in_order(child, out);
                }
            }
        }
    }

    /// Check the subtree at `node`, whose keys must lie in `[lower, upper)`.
    /// Returns the subtree's smallest key.
    fn check_node<'a>(
        node: &'a Node<K, V>,
        is_root: bool,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        leaf_depth: &mut Option<usize>,
        count: &mut usize,
    ) -> Result<Option<&'a K>> {
        let violation = |msg: String| Err(Error::StructuralInvariant(msg));
        let keys = node.keys();

        if keys.len() > ORDER - 1 {
            return violation(format!("node holds {} keys, max is {}", keys.len(), ORDER - 1));
        }
        let min_keys = (ORDER + 1) / 2 - 1;
        if !is_root && keys.len() < min_keys {
            return violation(format!("node holds {} keys, min is {}", keys.len(), min_keys));
        }
        if keys.windows(2).any(|w| w[0] >= w[1]) {
            return violation(format!("keys not strictly ascending: {:?}", keys));
        }
        if let (Some(lo), Some(first)) = (lower, keys.first()) {
            if first < lo {
                return violation(format!("key {:?} below lower bound {:?}", first, lo));
            }
        }
        if let (Some(hi), Some(last)) = (upper, keys.last()) {
            if last >= hi {
                return violation(format!("key {:?} not below upper bound {:?}", last, hi));
            }
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.values.len() != leaf.keys.len() {
                    return violation(format!(
                        "leaf has {} keys but {} values",
                        leaf.keys.len(),
                        leaf.values.len()
                    ));
                }
                match *leaf_depth {
                    None => *leaf_depth = Some(depth),
                    Some(d) if d != depth => {
                        return violation(format!("leaves at depths {} and {}", d, depth));
                    }
                    Some(_) => {}
                }
                *count += leaf.keys.len();
                Ok(leaf.keys.first())
            }
            Node::Internal(inner) => {
                if inner.keys.is_empty() {
                    return violation("internal node without separators".to_string());
                }
                if inner.children.len() != inner.keys.len() + 1 {
                    return violation(format!(
                        "internal node has {} children for {} keys",
                        inner.children.len(),
                        inner.keys.len()
                    ));
                }

                let mut subtree_min = None;
                for (i, child) in inner.children.iter().enumerate() {
                    let lo = if i == 0 { lower } else { Some(&inner.keys[i - 1]) };
                    let hi = inner.keys.get(i).or(upper);
                    let child_min = Self::check_node(child, false, depth + 1, lo, hi, leaf_depth, count)?;

                    if i == 0 {
                        subtree_min = child_min;
                    } else if child_min != Some(&inner.keys[i - 1]) {
                        return violation(format!(
                            "separator {:?} is not the minimum of its right subtree ({:?})",
                            inner.keys[i - 1],
                            child_min
                        ));
                    }
                }
                Ok(subtree_min)
            }
        }
    }
}

impl<K, V, const ORDER: usize> Default for BpTreeMap<K, V, ORDER> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + Debug, V, const ORDER: usize> KeyIndex<K, V> for BpTreeMap<K, V, ORDER> {
    fn get(&self, key: &K) -> Option<&V> {
        BpTreeMap::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Result<()> {
        BpTreeMap::put(self, key, value)
    }

    fn entries(&self) -> Vec<(&K, &V)> {
        BpTreeMap::entries(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}
