// Query Result Implementation
//
// This module defines the error union surfaced by query execution and the
// result alias used throughout the engine.

use thiserror::Error;

use crate::catalog::error::{
    DomainSyntaxError, DomainValueError, EvalError, LookupError, SchemaError,
};
use crate::query::parser::ParseError;

/// Errors that can occur during query execution.
///
/// Each variant wraps the error of one stage unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Domain error: {0}")]
    DomainSyntax(#[from] DomainSyntaxError),

    #[error("Value error: {0}")]
    DomainValue(#[from] DomainValueError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
