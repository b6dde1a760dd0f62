// Query Execution Engine Implementation
//
// This module binds parsed queries to tables supplied by a table provider and
// runs them through the fixed From -> Where -> Select pipeline.

use log::debug;

use crate::catalog::{LookupError, Table, TableProvider};
use crate::query::executor::result::QueryResult;
use crate::query::parser::ast::Query;
use crate::query::parser::parse;

impl Query {
    /// Execute this query against `provider`.
    ///
    /// Source tables are joined left to right, then filtered, then
    /// projected. The first failing stage ends execution with its error.
    pub fn run<P: TableProvider + ?Sized>(&self, provider: &P) -> QueryResult<Table> {
        // From
        let sources = provider.get_tables(&self.tables)?;
        let mut sources = sources.into_iter();
        let mut working = match sources.next() {
            Some(first) => first,
            None => return Err(LookupError::NoTables.into()),
        };
        for next in sources {
            working = working.join(&next, None)?;
        }
        debug!(
            "from {}: {} row(s), {} column(s)",
            self.tables.join(", "),
            working.row_count(),
            working.column_count()
        );

        // Where
        if let Some(predicate) = &self.predicate {
            working = working.filter(predicate)?;
            debug!("where {}: {} row(s) left", predicate, working.row_count());
        }

        // Select
        let result = working.project(self.selected.as_slice())?;
        debug!("select {}: {} column(s)", self.selected.join(", "), result.column_count());
        Ok(result)
    }
}

/// Runs query text against the tables of a provider
pub struct ExecutionEngine<P: TableProvider> {
    provider: P,
}

impl<P: TableProvider> ExecutionEngine<P> {
    pub fn new(provider: P) -> Self {
        ExecutionEngine { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Parse and execute a query string
    pub fn execute_query(&self, sql: &str) -> QueryResult<Table> {
        let query = parse(sql)?;
        self.run(&query)
    }

    /// Execute an already parsed query
    pub fn run(&self, query: &Query) -> QueryResult<Table> {
        query.run(&self.provider)
    }
}
