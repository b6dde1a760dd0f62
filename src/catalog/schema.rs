// Schema Management Module
//
// This module defines the Schema type: an ordered list of columns, each with a
// domain, indexed case-insensitively by name.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::domain::Domain;
use super::error::SchemaError;

/// Represents a column in a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name
    name: String,
    /// Source table the column came from, if known
    qualifier: Option<String>,
    /// Column domain
    domain: Domain,
}

impl Column {
    /// Create a new unqualified column
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Column {
            name: name.into(),
            qualifier: None,
            domain,
        }
    }

    /// Create a column belonging to `table`
    pub fn qualified(table: impl Into<String>, name: impl Into<String>, domain: Domain) -> Self {
        Column {
            name: name.into(),
            qualifier: Some(table.into()),
            domain,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// `table.column` when qualified, the bare name otherwise
    pub fn qualified_name(&self) -> String {
        match &self.qualifier {
            Some(table) => format!("{}.{}", table, self.name),
            None => self.name.clone(),
        }
    }

    fn key(&self) -> String {
        self.qualified_name().to_lowercase()
    }
}

/// How `Schema::merge` treats a column name present on both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep both columns; unqualified references to them become ambiguous
    Tolerate,
    /// Fail with `SchemaError::DuplicateColumn` when the bare names match,
    /// whatever table each side came from
    Reject,
}

/// Ordered columns with a case-insensitive name index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    columns: Vec<Column>,
    /// Lowercased column name to every position holding that name
    positions: HashMap<String, Vec<usize>>,
}

impl Schema {
    /// Build a schema, rejecting duplicate column names
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let mut schema = Schema::default();
        for column in columns {
            if schema.contains_key(&column.key()) {
                return Err(SchemaError::DuplicateColumn(column.qualified_name()));
            }
            schema.push(column);
        }
        Ok(schema)
    }

    fn push(&mut self, column: Column) {
        self.positions
            .entry(column.name.to_lowercase())
            .or_default()
            .push(self.columns.len());
        self.columns.push(column);
    }

    fn contains_key(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key() == key)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Resolve `name` or `table.name` to its position and domain
    pub fn lookup(&self, name: &str) -> Result<(usize, &Domain), SchemaError> {
        let (qualifier, column) = match name.split_once('.') {
            Some((table, column)) => (Some(table), column),
            None => (None, name),
        };

        let candidates: Vec<usize> = self
            .positions
            .get(&column.to_lowercase())
            .into_iter()
            .flatten()
            .copied()
            .filter(|&pos| match qualifier {
                Some(table) => self.columns[pos]
                    .qualifier()
                    .is_some_and(|q| q.eq_ignore_ascii_case(table)),
                None => true,
            })
            .collect();

        match candidates.as_slice() {
            [] => Err(SchemaError::UnknownColumn(name.to_string())),
            [pos] => Ok((*pos, &self.columns[*pos].domain)),
            _ => Err(SchemaError::AmbiguousColumn(name.to_string())),
        }
    }

    /// Concatenate two schemas and re-index
    pub fn merge(&self, other: &Schema, policy: MergePolicy) -> Result<Schema, SchemaError> {
        let mut merged = self.clone();
        for column in &other.columns {
            if policy == MergePolicy::Reject && merged.positions.contains_key(&column.name.to_lowercase()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
            merged.push(column.clone());
        }
        Ok(merged)
    }

    /// Copy of this schema with one column renamed
    pub fn rename_column(&self, old: &str, new: &str) -> Result<Schema, SchemaError> {
        let (position, _) = self.lookup(old)?;
        let mut columns = self.columns.clone();
        columns[position].name = new.to_string();
        Schema::new(columns)
    }

    /// Copy of this schema with every column attributed to `table`
    pub fn with_qualifier(&self, table: &str) -> Result<Schema, SchemaError> {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::qualified(table, c.name.clone(), c.domain.clone()))
            .collect();
        Schema::new(columns)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "Column #{} \"{}\" : {}", i, column.qualified_name(), column.domain)?;
        }
        Ok(())
    }
}
