// Relql Query Engine

pub mod catalog;
pub mod query;

// Re-export key items for convenient access
pub use catalog::{Catalog, CsvLoader, Domain, LoaderConfig, Schema, Table, TableProvider, Value};
pub use query::executor::engine::ExecutionEngine;
pub use query::executor::result::{QueryError, QueryResult};
pub use query::parser::{parse, Parser, Query};
