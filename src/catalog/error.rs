// Catalog Error Types
//
// Error enums raised by domains, schemas, table providers and expression
// evaluation.

use thiserror::Error;

/// A textual domain declaration could not be understood
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainSyntaxError {
    #[error("cannot recognize \"{0}\" as any valid domain")]
    UnknownDomain(String),
    #[error("unclosed parentheses in \"{0}\"")]
    UnclosedParentheses(String),
    #[error("{domain} domain expected an integer max length argument, got \"{argument}\"")]
    InvalidArgument { domain: String, argument: String },
}

/// A value does not fit its target domain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not parse \"{value}\" into {domain} domain: {reason}")]
pub struct DomainValueError {
    pub domain: String,
    pub value: String,
    pub reason: String,
}

impl DomainValueError {
    pub fn new(domain: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        DomainValueError {
            domain: domain.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Column resolution and table shape errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("a column called \"{0}\" is not present in the schema")]
    UnknownColumn(String),
    #[error("a column called \"{0}\" is already present in the schema")]
    DuplicateColumn(String),
    #[error("reference to column \"{0}\" is ambiguous")]
    AmbiguousColumn(String),
    #[error("cannot select all (*) together with other columns")]
    WildcardWithColumns,
    #[error("buffer of {cells} cells does not divide into rows of {columns} columns")]
    RowShape { cells: usize, columns: usize },
}

/// Source table resolution errors raised by table providers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("table \"{0}\" does not exist")]
    UnknownTable(String),
    #[error("no source tables were given")]
    NoTables,
    #[error("table names must be plain file names, got \"{0}\"")]
    InvalidName(String),
    #[error("table \"{table}\" could not be read: {reason}")]
    Unreadable { table: String, reason: String },
    #[error("table \"{table}\" is malformed at line {line}: {reason}")]
    Malformed { table: String, line: usize, reason: String },
}

/// Failures while evaluating an arithmetic operand
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("operator {op} is not supported between {lhs} and {rhs}")]
    UnsupportedOperation { op: String, lhs: String, rhs: String },
    #[error("integer overflow evaluating {0}")]
    Overflow(String),
    #[error("division by zero evaluating {0}")]
    DivisionByZero(String),
    #[error("date out of range evaluating {0}")]
    DateOutOfRange(String),
}
