//! Index statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by an index.
///
/// Lookups take `&self`, so the counters are atomics rather than plain
/// integers. We use `Ordering::Relaxed` throughout: counters are
/// independent and only need atomicity.
///
/// What a "visit" and an "expansion" mean depends on the index:
///
/// | counter      | B+tree                    | extendable hash          |
/// |--------------|---------------------------|--------------------------|
/// | `visits`     | nodes touched by `get`    | buckets touched by `get` |
/// | `splits`     | leaf and internal splits  | bucket splits            |
/// | `expansions` | root splits (height + 1)  | directory doublings      |
///
/// # Example
/// ```
/// use tabledb::index::IndexStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = IndexStats::new();
/// stats.lookups.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.lookups.load(Ordering::Relaxed), 1);
/// ```
#[derive(Debug)]
pub struct IndexStats {
    /// Number of `get` calls.
    pub lookups: AtomicU64,

    /// Number of nodes or buckets visited by lookups.
    pub visits: AtomicU64,

    /// Number of node or bucket splits.
    pub splits: AtomicU64,

    /// Number of root splits or directory doublings.
    pub expansions: AtomicU64,
}

impl IndexStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            lookups: AtomicU64::new(0),
            visits: AtomicU64::new(0),
            splits: AtomicU64::new(0),
            expansions: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_visit(&self) {
        self.visits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_split(&self) {
        self.splits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_expansion(&self) {
        self.expansions.fetch_add(1, Ordering::Relaxed);
    }

    /// Average number of nodes/buckets visited per lookup.
    pub fn visits_per_lookup(&self) -> f64 {
        self.snapshot().visits_per_lookup()
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            visits: self.visits.load(Ordering::Relaxed),
            splits: self.splits.load(Ordering::Relaxed),
            expansions: self.expansions.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.lookups.store(0, Ordering::Relaxed);
        self.visits.store(0, Ordering::Relaxed);
        self.splits.store(0, Ordering::Relaxed);
        self.expansions.store(0, Ordering::Relaxed);
    }
}

impl Default for IndexStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub lookups: u64,
    pub visits: u64,
    pub splits: u64,
    pub expansions: u64,
}

impl StatsSnapshot {
    /// Average number of nodes/buckets visited per lookup.
    pub fn visits_per_lookup(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.visits as f64 / self.lookups as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ lookups: {}, visits/lookup: {:.2}, splits: {}, expansions: {} }}",
            self.lookups,
            self.visits_per_lookup(),
            self.splits,
            self.expansions
        )
    }
}
