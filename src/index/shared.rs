//! Reader-writer wrapper for sharing an index between threads.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::Result;
use crate::index::KeyIndex;

/// An index behind a reader-writer lock.
///
/// The index structures themselves do no locking: splits and directory
/// doubling rewrite nodes and slots in place. `SharedIndex` serializes
/// writers against everyone else, while lookups run concurrently.
///
/// # Thread Safety
/// - `get_cloned`, `read`: shared lock
/// - `put`, `write`: exclusive lock
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tabledb::index::{ExtHashMap, SharedIndex};
///
/// let index: Arc<SharedIndex<ExtHashMap<u32, u32>>> = Arc::new(SharedIndex::default());
/// index.put(1, 10).unwrap();
/// assert_eq!(index.get_cloned(&1), Some(10));
/// ```
#[derive(Debug, Default)]
pub struct SharedIndex<I> {
    inner: RwLock<I>,
}

impl<I> SharedIndex<I> {
    /// Wrap an index.
    pub fn new(index: I) -> Self {
        Self {
            inner: RwLock::new(index),
        }
    }

    /// Acquire the shared lock.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, I> {
        self.inner.read()
    }

    /// Acquire the exclusive lock.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, I> {
        self.inner.write()
    }

    /// Unwrap the index.
    pub fn into_inner(self) -> I {
        self.inner.into_inner()
    }

    /// Look up `key`, cloning the value out from under the lock.
    pub fn get_cloned<K, V: Clone>(&self, key: &K) -> Option<V>
    where
        I: KeyIndex<K, V>,
    {
        self.inner.read().get(key).cloned()
    }

    /// Insert under the exclusive lock.
    ///
    /// # Errors
    /// - Whatever the wrapped index's `put` returns
    pub fn put<K, V>(&self, key: K, value: V) -> Result<()>
    where
        I: KeyIndex<K, V>,
    {
        self.inner.write().put(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BpTreeMap;

    #[test]
    fn test_shared_put_get() {
        let shared: SharedIndex<BpTreeMap<u32, String>> = SharedIndex::default();

        shared.put(3, "three".to_string()).unwrap();
        assert!(shared.put(3, "again".to_string()).is_err());

        assert_eq!(shared.get_cloned(&3), Some("three".to_string()));
        assert_eq!(shared.get_cloned(&4), None);
        assert_eq!(shared.read().len(), 1);
    }

    #[test]
    fn test_guards_expose_index() {
        let shared = SharedIndex::new(BpTreeMap::<u32, u32>::new());
        {
            let mut tree = shared.write();
            for k in 0..10 {
                tree.put(k, k).unwrap();
            }
        }

        assert_eq!(shared.read().height(), 3);
        assert_eq!(shared.into_inner().len(), 10);
    }
}
