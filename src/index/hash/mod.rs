//! Extendable-hash index implementation.
//!
//! - `bucket.rs`       : [`BucketId`] and the fixed-capacity bucket
//! - `ext_hash_map.rs` : [`ExtHashMap`], directory doubling and bucket splits

mod bucket;
mod ext_hash_map;

pub use bucket::BucketId;
pub use ext_hash_map::ExtHashMap;
