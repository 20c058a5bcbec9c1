//! Common types and utilities shared across TableDB.
//!
//! This module re-exports the fundamental primitives from `tabledb-core`:
//! - Configuration constants
//! - Error types
//! - Values, rows and composite keys

pub use tabledb_core::config;
pub use tabledb_core::error;

pub use tabledb_core::{
    CompositeKey, Domain, Error, HashConfig, Result, Row, StableHash, Value, DEFAULT_GLOBAL_DEPTH,
    DEFAULT_ORDER, DEFAULT_SLOTS, MAX_GLOBAL_DEPTH,
};
