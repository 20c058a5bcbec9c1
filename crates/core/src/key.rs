//! Composite index keys and stable hashing.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::Value;

// ============================================================================
// STABLE HASHING
// ============================================================================

/// A deterministic 32-bit hash.
///
/// `std::hash::Hash` output depends on the hasher (and `RandomState` is
/// seeded per process), so the extendable-hash directory uses this trait
/// instead. The low bits select a directory slot.
pub trait StableHash {
    fn stable_hash(&self) -> u32;
}

impl StableHash for u32 {
    /// Unsigned integers hash to themselves, so `k % 2^d` is the slot.
    #[inline]
    fn stable_hash(&self) -> u32 {
        *self
    }
}

impl StableHash for u64 {
    #[inline]
    fn stable_hash(&self) -> u32 {
        (*self ^ (*self >> 32)) as u32
    }
}

impl StableHash for i64 {
    #[inline]
    fn stable_hash(&self) -> u32 {
        (*self as u64).stable_hash()
    }
}

impl StableHash for i32 {
    #[inline]
    fn stable_hash(&self) -> u32 {
        *self as u32
    }
}

impl StableHash for str {
    fn stable_hash(&self) -> u32 {
        crc32fast::hash(self.as_bytes())
    }
}

impl StableHash for String {
    fn stable_hash(&self) -> u32 {
        self.as_str().stable_hash()
    }
}

impl StableHash for Value {
    /// CRC-32 over a tagged encoding, so `Int(1)` and `Text("\x01...")`
    /// do not collide by construction.
    fn stable_hash(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        match self {
            Value::Int(v) => {
                hasher.update(&[0]);
                hasher.update(&v.to_le_bytes());
            }
            Value::Float(v) => {
                hasher.update(&[1]);
                hasher.update(&v.to_bits().to_le_bytes());
            }
            Value::Text(v) => {
                hasher.update(&[2]);
                hasher.update(v.as_bytes());
            }
        }
        hasher.finalize()
    }
}

// ============================================================================
// COMPOSITE KEYS
// ============================================================================

/// An ordered tuple of values forming a primary key.
///
/// Equality and ordering are lexicographic over the values. Keys are
/// immutable once built.
///
/// # Example
/// ```
/// use tabledb_core::{CompositeKey, Value};
///
/// let a = CompositeKey::new(vec![Value::from(1977), Value::from("Star_Wars")]);
/// let b = CompositeKey::new(vec![Value::from(1977), Value::from("Superman")]);
/// assert!(a < b);
/// assert_eq!(a.to_string(), "(1977, Star_Wars)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey(Box<[Value]>);

impl CompositeKey {
    /// Create a key from its values.
    pub fn new(values: Vec<Value>) -> Self {
        CompositeKey(values.into_boxed_slice())
    }

    /// Build a key from the given column positions of a row.
    ///
    /// # Errors
    /// - `Error::InvalidArity` if a column position lies outside the row
    pub fn from_row(row: &[Value], cols: &[usize]) -> Result<Self> {
        let values = cols
            .iter()
            .map(|&col| {
                row.get(col).cloned().ok_or(Error::InvalidArity {
                    expected: col + 1,
                    actual: row.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(values))
    }

    /// Number of values in the key.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The key's values in order.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl StableHash for CompositeKey {
    /// Combines the element hashes as `h = 31 * h + e`, starting from 1.
    fn stable_hash(&self) -> u32 {
        self.0.iter().fold(1u32, |h, value| {
            h.wrapping_mul(31).wrapping_add(value.stable_hash())
        })
    }
}

impl From<Value> for CompositeKey {
    fn from(value: Value) -> Self {
        CompositeKey::new(vec![value])
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}
