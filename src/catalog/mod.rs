//! Catalog Management Module
//!
//! This module holds the data side of the engine: column domains and values,
//! schemas, in-memory tables with their relational operations, the table
//! registry, and the loader that reads tables from disk.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod loader;
pub mod schema;
pub mod table;

// Re-export key types
pub use self::catalog::{Catalog, TableProvider};
pub use self::domain::{parse_domain, Domain, Value, ValueKind};
pub use self::error::{DomainSyntaxError, DomainValueError, EvalError, LookupError, SchemaError};
pub use self::loader::{CsvLoader, LoaderConfig};
pub use self::schema::{Column, MergePolicy, Schema};
pub use self::table::Table;
