//! Core types and constants for TableDB.
//!
//! This crate provides fundamental abstractions used throughout the database:
//!
//! # Types
//! - [`Value`] - A scalar attribute value (integer, float or text)
//! - [`Domain`] - The type tag of an attribute column
//! - [`Row`] - A shared, immutable sequence of attribute values
//! - [`CompositeKey`] - An ordered tuple of values used as an index key
//!
//! # Constants
//! - [`DEFAULT_ORDER`] - Default fanout of a B+tree node (4)
//! - [`DEFAULT_SLOTS`] - Default capacity of a hash bucket (4)
//!
//! # Error Handling
//! - [`Error`] - Unified error type
//! - [`Result<T>`] - Convenient result alias
//!
//! # Example
//! ```
//! use tabledb_core::{CompositeKey, StableHash, Value};
//!
//! let key = CompositeKey::new(vec![Value::from(7), Value::from("Star_Wars")]);
//! assert_eq!(key.len(), 2);
//!
//! // Hashes are stable across runs and processes
//! assert_eq!(key.stable_hash(), key.clone().stable_hash());
//! ```

// Declare modules
pub mod config;
pub mod error;
pub mod key;
pub mod types;

// Re-export commonly used items at crate root
// This allows users to write: use tabledb_core::CompositeKey;
// Instead of:            use tabledb_core::key::CompositeKey;
pub use config::{HashConfig, DEFAULT_GLOBAL_DEPTH, DEFAULT_ORDER, DEFAULT_SLOTS, MAX_GLOBAL_DEPTH};
pub use error::{Error, Result};
pub use key::{CompositeKey, StableHash};
pub use types::{Domain, Row, Value};
