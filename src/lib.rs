//! spanq - search queries for telemetry column stores.
//!
//! spanq compiles the free-text search expressions users type against spans
//! and logs into parameterized SQL conditions for a ClickHouse-style store.
//!
//! # Features
//!
//! - **Field resolution**: logical keys map to columns or attribute-map cells
//! - **Body search**: bare words use token matching, phrases and `*` patterns
//!   use case-insensitive pattern matching
//! - **Durations**: `duration>1.5ms` is normalized to nanoseconds
//! - **Boolean logic**: implicit `AND`, explicit `AND`/`OR`, grouping and
//!   value lists such as `source=(backend OR frontend)`
//! - **Safe output**: literals are always bound as arguments and escaped
//!
//! # Architecture
//!
//! - `query`: lexer, field resolver, term compiler and boolean combinator
//! - `sql`: statement builder and literal escaping
//! - `core`: configuration and errors
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```
//! use spanq_lib::core::TableConfig;
//! use spanq_lib::query::assign_search_filters;
//! use spanq_lib::sql::{Flavor, SelectBuilder};
//!
//! let table = TableConfig::traces();
//! let mut sb = SelectBuilder::new().select(&["*"]).from("t");
//! assign_search_filters(&mut sb, "span_name:gorm.Query", &table).unwrap();
//!
//! let sql = sb.build_with_flavor(Flavor::ClickHouse).unwrap();
//! assert_eq!(sql, "SELECT * FROM t WHERE toString(SpanName) = 'gorm.Query'");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod query;
pub mod sql;

// Re-export core types for convenience
pub use crate::core::{Config, Result};
