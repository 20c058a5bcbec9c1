//! Hash buckets and their identifiers.

use std::fmt;

/// Identifies a bucket in the hash index's bucket pool.
///
/// Using `usize` because:
/// 1. Buckets are stored in `Vec<Bucket>`
/// 2. Direct indexing without casting: `buckets[bucket_id.0]`
/// 3. Directory slots copy the id, so several slots alias one bucket
///
/// # Example
/// ```
/// use tabledb::index::BucketId;
///
/// let bucket_id = BucketId::new(5);
/// assert_eq!(bucket_id.0, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketId(pub usize);

impl BucketId {
    /// Create a new BucketId.
    #[inline]
    pub fn new(id: usize) -> Self {
        BucketId(id)
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bucket({})", self.0)
    }
}

/// A fixed-capacity bucket of key-value pairs.
///
/// Entries are unordered. `local_depth` is the number of low hash bits
/// shared by every key the bucket may hold.
#[derive(Debug)]
pub(crate) struct Bucket<K, V> {
    pub(crate) entries: Vec<(K, V)>,
    pub(crate) local_depth: u32,
}

impl<K, V> Bucket<K, V> {
    pub(crate) fn new_empty(local_depth: u32, slots: usize) -> Self {
        Self {
            entries: Vec::with_capacity(slots),
            local_depth,
        }
    }
}

impl<K: PartialEq, V> Bucket<K, V> {
    #[inline]
    pub(crate) fn find(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[inline]
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }
}
