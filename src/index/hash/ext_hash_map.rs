//! The extendable-hash map.

use std::fmt::Debug;

use tracing::debug;

use super::bucket::{Bucket, BucketId};
use crate::common::{Error, HashConfig, Result, StableHash, DEFAULT_SLOTS};
use crate::index::{IndexStats, KeyIndex};

/// A hash map using extendable hashing.
///
/// # Architecture
/// ```text
///   directory (2^global_depth slots)        bucket pool
///   ┌──────────┐
///   │ 000  ────┼──────────────────────▶ [Bucket0] local_depth 2
///   │ 001  ────┼──────────────────────▶ [Bucket1] local_depth 3
///   │ 010  ────┼──────────────────────▶ [Bucket2] local_depth 2
///   │ 011  ────┼──────────────────────▶ [Bucket3] local_depth 2
///   │ 100  ────┼─── aliases Bucket0
///   │ 101  ────┼──────────────────────▶ [Bucket4] local_depth 3
///   │ 110  ────┼─── aliases Bucket2
///   │ 111  ────┼─── aliases Bucket3
///   └──────────┘
/// ```
/// A key lives in the bucket named by the low `global_depth` bits of its
/// [`StableHash`]. A bucket with local depth `d` is referenced by exactly
/// `2^(global_depth - d)` slots: those whose low `d` bits match.
///
/// Directory slots hold [`BucketId`]s into the pool, so aliased slots see
/// one bucket, never copies.
///
/// # Growth
/// A full bucket splits on its next insert. If its local depth already
/// equals the global depth, the directory doubles first (each new slot
/// aliasing its twin). The insert then retries, splitting again if every
/// entry still lands on the same side.
///
/// # Example
/// ```
/// use tabledb::index::ExtHashMap;
///
/// let mut map: ExtHashMap<u32, &str> = ExtHashMap::new();
/// map.put(1, "one").unwrap();
/// map.put(5, "five").unwrap();
///
/// assert_eq!(map.get(&5), Some(&"five"));
/// assert_eq!(map.global_depth(), 2);
/// ```
#[derive(Debug)]
pub struct ExtHashMap<K, V, const SLOTS: usize = DEFAULT_SLOTS> {
    /// Every bucket ever allocated; `BucketId` indexes into this.
    buckets: Vec<Bucket<K, V>>,

    /// Slot `i` names the bucket for hashes whose low bits equal `i`.
    directory: Vec<BucketId>,

    /// Number of low hash bits used to pick a slot.
    global_depth: u32,

    /// The directory never doubles past this depth.
    max_global_depth: u32,

    /// Number of stored pairs.
    len: usize,

    /// Access and growth counters.
    stats: IndexStats,
}

impl<K, V, const SLOTS: usize> ExtHashMap<K, V, SLOTS> {
    const VALID_SLOTS: () = assert!(SLOTS >= 1, "hash bucket SLOTS must be at least 1");

    /// Create an empty map with the default configuration.
    pub fn new() -> Self {
        Self::build(HashConfig::default())
    }

    /// Create an empty map with the given configuration.
    ///
    /// The directory starts with `2^initial_global_depth` distinct buckets.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if the configuration fails validation
    pub fn with_config(config: HashConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: HashConfig) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_SLOTS;

        let depth = config.initial_global_depth;
        let size = config.initial_directory_len();

        Self {
            buckets: (0..size).map(|_| Bucket::new_empty(depth, SLOTS)).collect(),
            directory: (0..size).map(BucketId::new).collect(),
            global_depth: depth,
            max_global_depth: config.max_global_depth,
            len: 0,
            stats: IndexStats::new(),
        }
    }

    // ========================================================================
    // Public API: Info
    // ========================================================================

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of low hash bits used to index the directory.
    pub fn global_depth(&self) -> u32 {
        self.global_depth
    }

    /// Number of directory slots (always `2^global_depth`).
    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    /// The directory, slot by slot.
    pub fn directory(&self) -> &[BucketId] {
        &self.directory
    }

    /// Number of distinct buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Local depth of a bucket, or `None` for an unknown id.
    pub fn local_depth(&self, id: BucketId) -> Option<u32> {
        self.buckets.get(id.0).map(|b| b.local_depth)
    }

    /// Number of pairs stored in a bucket, or `None` for an unknown id.
    pub fn bucket_len(&self, id: BucketId) -> Option<usize> {
        self.buckets.get(id.0).map(|b| b.entries.len())
    }

    /// Directory slots that reference a bucket.
    pub fn slots_referencing(&self, id: BucketId) -> Vec<usize> {
        self.directory
            .iter()
            .enumerate()
            .filter(|&(_, &target)| target == id)
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Access and growth counters.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Directory slot for a hash value.
    #[inline]
    fn slot_of(&self, hash: u32) -> usize {
        (hash & ((1u32 << self.global_depth) - 1)) as usize
    }
}

impl<K: StableHash + Eq + Debug, V, const SLOTS: usize> ExtHashMap<K, V, SLOTS> {
    // ========================================================================
    // Public API: Lookup and insert
    // ========================================================================

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.stats.record_lookup();
        self.stats.record_visit();

        let id = self.bucket_for(key);
        self.buckets[id.0].find(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// The bucket `key` maps to under the current directory.
    pub fn bucket_for(&self, key: &K) -> BucketId {
        self.directory[self.slot_of(key.stable_hash())]
    }

    /// Insert a new key-value pair.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if the key is already present
    /// - `Error::DirectoryOverflow` if making room would need the directory
    ///   to grow past its maximum depth; splits done before that point are
    ///   kept and the map stays consistent
    pub fn put(&mut self, key: K, value: V) -> Result<()> {
        let hash = key.stable_hash();

        loop {
            let id = self.directory[self.slot_of(hash)];
            let bucket = &mut self.buckets[id.0];

            if bucket.contains(&key) {
                return Err(Error::DuplicateKey(format!("{:?}", key)));
            }
            if bucket.entries.len() < SLOTS {
                bucket.entries.push((key, value));
                self.len += 1;
                return Ok(());
            }

            // Full: split and retry, the key may still land in a full bucket
            self.split(id)?;
        }
    }

    /// All stored pairs, in no particular order.
    ///
    /// Each bucket is visited once, however many slots alias it.
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.buckets
            .iter()
            .flat_map(|b| b.entries.iter().map(|(k, v)| (k, v)))
            .collect()
    }

    // ========================================================================
    // Public API: Checking
    // ========================================================================

    /// Verify the directory and bucket invariants.
    ///
    /// # Errors
    /// - `Error::StructuralInvariant` describing the first violation found
    pub fn check_invariants(&self) -> Result<()> {
        let violation = |msg: String| Err(Error::StructuralInvariant(msg));

        if self.directory.len() != 1usize << self.global_depth {
            return violation(format!(
                "directory has {} slots at global depth {}",
                self.directory.len(),
                self.global_depth
            ));
        }

        let mut referencing: Vec<Vec<usize>> = vec![Vec::new(); self.buckets.len()];
        for (slot, id) in self.directory.iter().enumerate() {
            match referencing.get_mut(id.0) {
                Some(slots) => slots.push(slot),
                None => return violation(format!("slot {} names unknown {}", slot, id)),
            }
        }

        let mut count = 0;
        for (idx, (bucket, slots)) in self.buckets.iter().zip(&referencing).enumerate() {
            let id = BucketId::new(idx);
            let depth = bucket.local_depth;

            if depth > self.global_depth {
                return violation(format!(
                    "{} has local depth {} above global depth {}",
                    id, depth, self.global_depth
                ));
            }
            let expected = 1usize << (self.global_depth - depth);
            if slots.len() != expected {
                return violation(format!(
                    "{} at local depth {} is referenced by {} slots, expected {}",
                    id,
                    depth,
                    slots.len(),
                    expected
                ));
            }
            let mask = (1usize << depth) - 1;
            if slots.iter().any(|&s| s & mask != slots[0] & mask) {
                return violation(format!("{} is referenced by slots {:?} with different prefixes", id, slots));
            }
            if bucket.entries.len() > SLOTS {
                return violation(format!("{} holds {} entries, capacity is {}", id, bucket.entries.len(), SLOTS));
            }
            for (key, _) in &bucket.entries {
                let home = self.bucket_for(key);
                if home != id {
                    return violation(format!("key {:?} stored in {} but hashes to {}", key, id, home));
                }
            }
            count += bucket.entries.len();
        }

        if count != self.len {
            return violation(format!("map holds {} entries but len is {}", count, self.len));
        }
        Ok(())
    }

    // ========================================================================
    // Internal: Splitting
    // ========================================================================

    /// Split a full bucket in two, doubling the directory first if needed.
    ///
    /// The new sibling takes the entries (and the directory slots) whose
    /// hash has bit `local_depth` set.
    fn split(&mut self, id: BucketId) -> Result<()> {
        let local_depth = self.buckets[id.0].local_depth;

        if local_depth == self.global_depth {
            if self.global_depth >= self.max_global_depth {
                return Err(Error::DirectoryOverflow(self.max_global_depth));
            }
            self.double_directory();
        }

        let new_depth = local_depth + 1;
        let split_bit = 1u32 << local_depth;
        let sibling = BucketId::new(self.buckets.len());

        self.buckets.push(Bucket::new_empty(new_depth, SLOTS));
        self.buckets[id.0].local_depth = new_depth;

        // Half of the aliasing slots move to the sibling
        for (slot, target) in self.directory.iter_mut().enumerate() {
            if *target == id && (slot as u32) & split_bit != 0 {
                *target = sibling;
            }
        }

        let entries = std::mem::replace(&mut self.buckets[id.0].entries, Vec::with_capacity(SLOTS));
        let (moved, kept): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|(k, _)| k.stable_hash() & split_bit != 0);

        debug!(
            bucket = id.0,
            sibling = sibling.0,
            local_depth = new_depth,
            kept = kept.len(),
            moved = moved.len(),
            "hash bucket split"
        );

        self.buckets[id.0].entries = kept;
        self.buckets[sibling.0].entries = moved;
        self.stats.record_split();
        Ok(())
    }

    /// Double the directory; slot `i + 2^old_depth` aliases slot `i`.
    fn double_directory(&mut self) {
        self.directory.extend_from_within(..);
        self.global_depth += 1;
        self.stats.record_expansion();

        debug!(
            global_depth = self.global_depth,
            slots = self.directory.len(),
            "hash directory doubled"
        );
    }
}

impl<K, V, const SLOTS: usize> Default for ExtHashMap<K, V, SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StableHash + Eq + Debug, V, const SLOTS: usize> KeyIndex<K, V> for ExtHashMap<K, V, SLOTS> {
    fn get(&self, key: &K) -> Option<&V> {
        ExtHashMap::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Result<()> {
        ExtHashMap::put(self, key, value)
    }

    fn entries(&self) -> Vec<(&K, &V)> {
        ExtHashMap::entries(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}
