//! Index structures.
//!
//! Both indexes implement the same map contract, [`KeyIndex`], so a
//! [`Table`](crate::table::Table) can be built over either one:
//! - [`BpTreeMap`] - B+tree, ordered; supports first/last key and ranges
//! - [`ExtHashMap`] - extendable hashing, unordered
//!
//! Supporting pieces:
//! - [`IndexStats`] - access and growth counters
//! - [`SharedIndex`] - reader-writer lock for callers sharing an index

pub mod btree;
pub mod hash;
mod shared;
mod stats;

pub use btree::BpTreeMap;
pub use hash::{BucketId, ExtHashMap};
pub use shared::SharedIndex;
pub use stats::{IndexStats, StatsSnapshot};

use crate::common::Result;

/// The map contract shared by every index.
///
/// Keys are unique: `put` on a present key is rejected with
/// `Error::DuplicateKey` and leaves the index unchanged.
pub trait KeyIndex<K, V> {
    /// Look up the value stored under `key`.
    fn get(&self, key: &K) -> Option<&V>;

    /// Insert a new key-value pair.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if the key is already present
    fn put(&mut self, key: K, value: V) -> Result<()>;

    /// Snapshot of every stored pair.
    ///
    /// Ordered indexes return ascending key order; others make no promise.
    fn entries(&self) -> Vec<(&K, &V)>;

    /// Number of stored pairs.
    fn len(&self) -> usize;

    /// Whether the index holds no pairs.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
