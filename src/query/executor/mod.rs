// Query Executor Module
//
// This module is responsible for executing parsed queries and producing
// result tables.

pub mod engine;
pub mod expression_eval;
pub mod result;

// Export key types
pub use self::engine::ExecutionEngine;
pub use self::expression_eval::{BoundExpr, BoundPredicate};
pub use self::result::{QueryError, QueryResult};
