//! Relational tables.
//!
//! A [`Table`] owns its rows and keeps a primary-key index over them. The
//! index implementation is a type parameter, so the same table code runs
//! on the B+tree or the extendable hash map.

mod relation;
mod schema;

pub use relation::Table;
pub use schema::Schema;
