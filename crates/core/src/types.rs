//! Core type definitions for TableDB.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

// ============================================================================
// ROWS
// ============================================================================

/// A row (tuple) of attribute values.
///
/// Rows are reference counted: indexes and derived tables hold another
/// handle to the same allocation instead of copying the values.
pub type Row = Arc<[Value]>;

// ============================================================================
// DOMAINS
// ============================================================================

/// The type of an attribute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Int,
    Float,
    Text,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Int => "Integer",
            Domain::Float => "Double",
            Domain::Text => "String",
        };
        f.write_str(name)
    }
}

impl FromStr for Domain {
    type Err = Error;

    /// Parse a domain name. Accepts the usual aliases for each type.
    ///
    /// # Example
    /// ```
    /// use tabledb_core::Domain;
    ///
    /// assert_eq!("Integer".parse::<Domain>().unwrap(), Domain::Int);
    /// assert_eq!("String".parse::<Domain>().unwrap(), Domain::Text);
    /// assert!("Blob".parse::<Domain>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Integer" | "Long" | "Short" | "Byte" | "Int" => Ok(Domain::Int),
            "Double" | "Float" => Ok(Domain::Float),
            "String" | "Character" | "Text" => Ok(Domain::Text),
            other => Err(Error::UnknownDomain(other.to_string())),
        }
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// A scalar attribute value.
///
/// Values are totally ordered so they can take part in index keys:
/// integers sort before floats, floats before text, and floats compare
/// with IEEE 754 total ordering (so `NaN` equals itself).
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// The domain this value belongs to.
    pub fn domain(&self) -> Domain {
        match self {
            Value::Int(_) => Domain::Int,
            Value::Float(_) => Domain::Float,
            Value::Text(_) => Domain::Text,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Int(_) => 0,
            Value::Float(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
