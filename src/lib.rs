//! tabledb - An in-memory relational table engine with compile-time swappable indexes.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            tabledb                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Table Layer (table/)                     │   │
//! │  │   Schema + rows + select / project / union / minus / join│   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │       Index Layer (index/)  [Compile-Time Swappable]    │   │
//! │  │          B+tree  ←─OR─→  Extendable hash                 │   │
//! │  │        KeyIndex trait + IndexStats + SharedIndex         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            Core Types (tabledb-core)                     │   │
//! │  │      Value + Domain + CompositeKey + Error + config      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (Value, CompositeKey, Error, config)
//! - [`index`] - Ordered (B+tree) and hashed (extendable hash) indexes
//! - [`table`] - Tables and relational operators
//!
//! # Quick Start
//! ```
//! use tabledb::{Domain, Table};
//!
//! let mut student: Table = Table::new("student", &["id", "name"],
//!     &[Domain::Int, Domain::Text], &["id"]).unwrap();
//! let mut grade: Table = Table::new("grade", &["studId", "grade"],
//!     &[Domain::Int, Domain::Text], &["studId"]).unwrap();
//!
//! student.insert(vec![1.into(), "Ann".into()]);
//! grade.insert(vec![1.into(), "A".into()]);
//!
//! let joined = student.join(&["id"], &["studId"], &grade).unwrap();
//! assert_eq!(joined.schema().attributes(), &["id", "name", "grade"]);
//! ```

pub mod common;
pub mod index;
pub mod table;

// Re-export commonly used items at crate root for convenience
pub use common::{CompositeKey, Domain, Error, Result, Row, Value};

pub use index::{BpTreeMap, ExtHashMap, IndexStats, KeyIndex, SharedIndex, StatsSnapshot};
pub use table::{Schema, Table};
