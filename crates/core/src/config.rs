//! Configuration constants for TableDB.

use crate::error::{Error, Result};

/// Maximum number of children per B+tree node.
///
/// A node holds at most `ORDER - 1` keys. Four is small enough that splits
/// happen after a handful of inserts, which keeps tree shapes easy to
/// reason about in tests.
pub const DEFAULT_ORDER: usize = 4;

/// Number of (key, value) slots in an extendable-hash bucket.
pub const DEFAULT_SLOTS: usize = 4;

/// Initial global depth of a hash directory (2^2 = 4 slots).
pub const DEFAULT_GLOBAL_DEPTH: u32 = 2;

/// Upper bound on the global depth of a hash directory.
///
/// A directory at this depth has 2^20 slots (8MB of bucket handles on a
/// 64-bit target). Growing past it means more than `SLOTS` keys agree on
/// every usable hash bit, which no amount of splitting can resolve.
pub const MAX_GLOBAL_DEPTH: u32 = 20;

/// Hard ceiling imposed by the 32-bit stable hash.
const HASH_BITS: u32 = 32;

/// Runtime settings for an extendable-hash index.
///
/// # Example
/// ```
/// use tabledb_core::HashConfig;
///
/// let config = HashConfig::default().with_initial_global_depth(3);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.initial_directory_len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    /// Global depth of the directory at construction time.
    pub initial_global_depth: u32,

    /// The directory never doubles beyond this depth.
    pub max_global_depth: u32,
}

impl HashConfig {
    /// Set the initial global depth.
    pub fn with_initial_global_depth(mut self, depth: u32) -> Self {
        self.initial_global_depth = depth;
        self
    }

    /// Set the maximum global depth.
    pub fn with_max_global_depth(mut self, depth: u32) -> Self {
        self.max_global_depth = depth;
        self
    }

    /// Number of directory slots at construction time.
    pub fn initial_directory_len(&self) -> usize {
        1usize << self.initial_global_depth
    }

    /// Check that the depths are consistent.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if the initial depth exceeds the maximum, or
    ///   the maximum exceeds the number of usable hash bits.
    pub fn validate(&self) -> Result<()> {
        if self.max_global_depth >= HASH_BITS {
            return Err(Error::InvalidConfig(format!(
                "max_global_depth {} must be below {}",
                self.max_global_depth, HASH_BITS
            )));
        }
        if self.initial_global_depth > self.max_global_depth {
            return Err(Error::InvalidConfig(format!(
                "initial_global_depth {} exceeds max_global_depth {}",
                self.initial_global_depth, self.max_global_depth
            )));
        }
        Ok(())
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            initial_global_depth: DEFAULT_GLOBAL_DEPTH,
            max_global_depth: MAX_GLOBAL_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_ORDER, 4);
        assert_eq!(DEFAULT_SLOTS, 4);

        let config = HashConfig::default();
        assert_eq!(config.initial_directory_len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_initial_above_max_rejected() {
        let config = HashConfig::default()
            .with_initial_global_depth(5)
            .with_max_global_depth(4);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_max_depth_bounded_by_hash_width() {
        let config = HashConfig::default().with_max_global_depth(32);
        assert!(config.validate().is_err());

        let config = HashConfig::default().with_max_global_depth(31);
        assert!(config.validate().is_ok());
    }
}
