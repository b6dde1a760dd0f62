// Table Module
//
// This module defines the Table type: a schema plus a flat row-major buffer
// of values, and the relational operations (project, filter, join) over it.
// Every operation returns a new table and leaves its receiver untouched.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::domain::Value;
use super::error::SchemaError;
use super::schema::{Column, MergePolicy, Schema};
use crate::query::executor::expression_eval::BoundPredicate;
use crate::query::executor::result::QueryResult;
use crate::query::parser::ast::{Predicate, WILDCARD};

/// Narrowest cell drawn by `Display`
const MIN_CELL_WIDTH: usize = 10;

/// Source of fresh names for join results
static JOIN_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn anonymous_name() -> String {
    format!("#join{}", JOIN_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// An in-memory table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name
    name: String,
    /// Column layout
    schema: Schema,
    /// Row `i`, column `j` lives at `cells[i * schema.len() + j]`
    cells: Vec<Value>,
}

impl Table {
    /// Create a table from a flat buffer, checking it splits into whole rows
    pub fn new(name: impl Into<String>, schema: Schema, cells: Vec<Value>) -> Result<Self, SchemaError> {
        let columns = schema.len();
        let whole_rows = if columns == 0 {
            cells.is_empty()
        } else {
            cells.len() % columns == 0
        };
        if !whole_rows {
            return Err(SchemaError::RowShape {
                cells: cells.len(),
                columns,
            });
        }
        Ok(Table {
            name: name.into(),
            schema,
            cells,
        })
    }

    /// Create a table from individual rows
    pub fn from_rows(name: impl Into<String>, schema: Schema, rows: Vec<Vec<Value>>) -> Result<Self, SchemaError> {
        let columns = schema.len();
        let mut cells = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            if row.len() != columns {
                return Err(SchemaError::RowShape {
                    cells: row.len(),
                    columns,
                });
            }
            cells.extend(row);
        }
        Table::new(name, schema, cells)
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn row_count(&self) -> usize {
        match self.schema.len() {
            0 => 0,
            columns => self.cells.len() / columns,
        }
    }

    /// Iterate rows as slices of the buffer
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.cells.chunks_exact(self.schema.len().max(1))
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        let columns = self.schema.len();
        let start = index.checked_mul(columns)?;
        let end = start.checked_add(columns)?;
        self.cells.get(start..end).filter(|_| columns > 0)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        if column >= self.schema.len() {
            return None;
        }
        let index = row.checked_mul(self.schema.len())?.checked_add(column)?;
        self.cells.get(index)
    }

    /// Keep the named columns in the requested order.
    ///
    /// A lone `*` keeps every column in schema order.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, SchemaError> {
        let wildcard = names.iter().any(|n| n.as_ref() == WILDCARD);
        if wildcard {
            if names.len() > 1 {
                return Err(SchemaError::WildcardWithColumns);
            }
            return Table::new(self.name.clone(), self.schema.clone(), self.cells.clone());
        }

        let positions = names
            .iter()
            .map(|name| self.schema.lookup(name.as_ref()).map(|(pos, _)| pos))
            .collect::<Result<Vec<_>, _>>()?;
        let columns: Vec<Column> = positions
            .iter()
            .filter_map(|&pos| self.schema.column(pos).cloned())
            .collect();
        let schema = Schema::new(columns)?;

        let mut cells = Vec::with_capacity(self.row_count() * positions.len());
        for row in self.rows() {
            cells.extend(positions.iter().map(|&pos| row[pos].clone()));
        }
        debug!("projected {} onto {} column(s)", self.name, positions.len());
        Table::new(self.name.clone(), schema, cells)
    }

    /// Keep the rows satisfying `predicate`.
    ///
    /// The predicate is validated against the schema before any row is read.
    pub fn filter(&self, predicate: &Predicate) -> QueryResult<Table> {
        let bound = BoundPredicate::bind(predicate, &self.schema)?;
        let mut cells = Vec::new();
        for row in self.rows() {
            if bound.matches(row)? {
                cells.extend_from_slice(row);
            }
        }
        let table = Table::new(self.name.clone(), self.schema.clone(), cells)?;
        debug!(
            "filtered {} by {}: {} of {} row(s) kept",
            self.name,
            predicate,
            table.row_count(),
            self.row_count()
        );
        Ok(table)
    }

    /// Nested-loop join: every row of `self` paired with every row of
    /// `other`, left rows outermost, optionally restricted by `predicate`
    /// over the merged schema.
    pub fn join(&self, other: &Table, predicate: Option<&Predicate>) -> QueryResult<Table> {
        let schema = self.schema.merge(&other.schema, MergePolicy::Tolerate)?;
        let bound = predicate
            .map(|p| BoundPredicate::bind(p, &schema))
            .transpose()?;

        let mut cells = Vec::with_capacity(self.row_count() * other.row_count() * schema.len());
        let mut joined: Vec<Value> = Vec::with_capacity(schema.len());
        for left in self.rows() {
            for right in other.rows() {
                joined.clear();
                joined.extend_from_slice(left);
                joined.extend_from_slice(right);
                let keep = match &bound {
                    Some(bound) => bound.matches(&joined)?,
                    None => true,
                };
                if keep {
                    cells.extend_from_slice(&joined);
                }
            }
        }

        let table = Table::new(anonymous_name(), schema, cells)?;
        debug!(
            "joined {} and {} into {} with {} row(s)",
            self.name,
            other.name,
            table.name,
            table.row_count()
        );
        Ok(table)
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<&[Value]> = self.rows().collect();
        let mut state = serializer.serialize_struct("Table", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("columns", self.schema.columns())?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

/// Center `text` in `width` columns, cutting it short with `...` if needed
fn fit_cell(text: &str, width: usize) -> String {
    let length = text.chars().count();
    if length > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        return format!("{}...", kept);
    }
    format!("{:^width$}", text, width = width)
}

fn write_rule(f: &mut fmt::Formatter<'_>, widths: &[usize], left: char, middle: char, right: char) -> fmt::Result {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    writeln!(f, "{}{}{}", left, segments.join(&middle.to_string()), right)
}

fn write_row<'a>(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: impl Iterator<Item = &'a str>) -> fmt::Result {
    let cells: Vec<String> = cells.zip(widths).map(|(c, w)| fit_cell(c, *w)).collect();
    writeln!(f, "│ {} │", cells.join(" │ "))
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.schema.is_empty() {
            return writeln!(f, "(no columns)");
        }

        let headers = self.schema.column_names();
        let widths: Vec<usize> = headers
            .iter()
            .map(|h| h.chars().count().max(MIN_CELL_WIDTH))
            .collect();

        write_rule(f, &widths, '┌', '┬', '┐')?;
        write_row(f, &widths, headers.iter().copied())?;
        write_rule(f, &widths, '├', '┼', '┤')?;
        for row in self.rows() {
            let rendered: Vec<String> = row.iter().map(Value::to_string).collect();
            write_row(f, &widths, rendered.iter().map(String::as_str))?;
        }
        write_rule(f, &widths, '└', '┴', '┘')
    }
}
