//! Error types for TableDB.

use thiserror::Error;

use crate::types::Domain;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in TableDB.
///
/// A lookup miss is not an error: `get` returns `None`. Everything here is
/// surfaced as a typed result to the caller, which decides whether to abort
/// or carry on (the table layer turns a rejected row into `false`).
#[derive(Debug, Error)]
pub enum Error {
    /// `first_key`/`last_key` on an index with no entries.
    #[error("structure is empty")]
    EmptyStructure,

    /// `put` on a key that is already present.
    ///
    /// The index is left exactly as it was before the call.
    #[error("duplicate key {0}")]
    DuplicateKey(String),

    /// Two attribute lists (or a row and a schema) disagree in length, or a
    /// key column points outside the row.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    InvalidArity { expected: usize, actual: usize },

    /// An attribute name that the table does not have.
    #[error("unknown attribute {0}")]
    UnknownAttribute(String),

    /// A domain name that does not map to a [`Domain`].
    #[error("unknown domain {0}")]
    UnknownDomain(String),

    /// A value whose type does not match its column.
    #[error("column {column} expects {expected}, got {actual}")]
    DomainMismatch {
        column: String,
        expected: Domain,
        actual: Domain,
    },

    /// Set operations on tables with different arity or domains.
    #[error("tables {left} and {right} are not union compatible")]
    Incompatible { left: String, right: String },

    /// The hash directory would have to grow past its configured depth.
    #[error("hash directory cannot grow past global depth {0}")]
    DirectoryOverflow(u32),

    /// Rejected configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal bookkeeping went wrong.
    ///
    /// This indicates a bug in the index code, never bad input.
    #[error("structural invariant violated: {0}")]
    StructuralInvariant(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DuplicateKey("(42)".to_string());
        assert_eq!(format!("{}", err), "duplicate key (42)");

        let err = Error::InvalidArity {
            expected: 2,
            actual: 3,
        };
        assert_eq!(format!("{}", err), "arity mismatch: expected 2, got 3");

        let err = Error::DomainMismatch {
            column: "year".to_string(),
            expected: Domain::Int,
            actual: Domain::Text,
        };
        assert_eq!(format!("{}", err), "column year expects Integer, got String");
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Err(Error::EmptyStructure)
        }

        assert!(matches!(might_fail(), Err(Error::EmptyStructure)));
    }
}
