// Table Registry Module
//
// This module defines the table provider seam used by the executor and the
// in-memory catalog that implements it.

use std::sync::Arc;

use linked_hash_map::LinkedHashMap;
use log::debug;
use parking_lot::RwLock;

use super::error::LookupError;
use super::table::Table;

/// Supplies source tables to the query executor
pub trait TableProvider {
    /// Fetch the named tables in the order given.
    ///
    /// Fails on the first unknown name; an empty list is an error.
    fn get_tables(&self, names: &[String]) -> Result<Vec<Table>, LookupError>;
}

impl<P: TableProvider + ?Sized> TableProvider for &P {
    fn get_tables(&self, names: &[String]) -> Result<Vec<Table>, LookupError> {
        (**self).get_tables(names)
    }
}

impl<P: TableProvider + ?Sized> TableProvider for Arc<P> {
    fn get_tables(&self, names: &[String]) -> Result<Vec<Table>, LookupError> {
        (**self).get_tables(names)
    }
}

/// The Catalog is the in-memory registry of loaded tables.
///
/// Names are matched case-insensitively and listed in registration order.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: RwLock<LinkedHashMap<String, Table>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its own name, returning any table it replaces
    pub fn register(&self, table: Table) -> Option<Table> {
        let key = table.name().to_lowercase();
        debug!("registering table {} ({} rows)", table.name(), table.row_count());
        self.tables.write().insert(key, table)
    }

    /// Drop a table from the catalog
    pub fn remove(&self, name: &str) -> Option<Table> {
        self.tables.write().remove(&name.to_lowercase())
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(&name.to_lowercase())
    }

    /// Get a copy of a table
    pub fn get_table(&self, name: &str) -> Option<Table> {
        self.tables.read().get(&name.to_lowercase()).cloned()
    }

    /// Table names in registration order
    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().values().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

impl TableProvider for Catalog {
    fn get_tables(&self, names: &[String]) -> Result<Vec<Table>, LookupError> {
        if names.is_empty() {
            return Err(LookupError::NoTables);
        }
        let tables = self.tables.read();
        names
            .iter()
            .map(|name| {
                tables
                    .get(&name.to_lowercase())
                    .cloned()
                    .ok_or_else(|| LookupError::UnknownTable(name.clone()))
            })
            .collect()
    }
}
