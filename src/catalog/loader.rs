// Table Loader Module
//
// This module reads tables from delimited text files. A table file holds the
// column names on its first line, the domain declarations on its second, and
// one comma-separated row per remaining line.

use std::fs;
use std::path::{Path, PathBuf};

use log::{trace, warn};

use super::catalog::Catalog;
use super::domain::{parse_domain, Domain};
use super::error::LookupError;
use super::schema::{Column, Schema};
use super::table::Table;
use crate::query::executor::result::QueryResult;

const FIELD_SEPARATOR: char = ',';

/// Where table files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Directory holding the table files
    pub root: PathBuf,
    /// File extension, without the leading dot
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            root: PathBuf::from("Tables"),
            extension: "csv".to_string(),
        }
    }
}

/// Loads tables from `<root>/<name>.<extension>`
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    config: LoaderConfig,
}

impl CsvLoader {
    pub fn new(config: LoaderConfig) -> Self {
        CsvLoader { config }
    }

    /// Loader reading `.csv` files from `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        CsvLoader::new(LoaderConfig {
            root: root.as_ref().to_path_buf(),
            ..LoaderConfig::default()
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Path of the file backing `name`; names must be plain file names
    pub fn path_for(&self, name: &str) -> Result<PathBuf, LookupError> {
        let plain = !name.is_empty()
            && !name.contains(['/', '\\'])
            && !name.contains("..")
            && !name.contains(std::path::MAIN_SEPARATOR);
        if !plain {
            return Err(LookupError::InvalidName(name.to_string()));
        }
        Ok(self.config.root.join(format!("{}.{}", name, self.config.extension)))
    }

    /// Read and parse one table
    pub fn load(&self, name: &str) -> QueryResult<Table> {
        let path = self.path_for(name)?;
        trace!("loading table {} from {}", name, path.display());
        let text = fs::read_to_string(&path).map_err(|e| LookupError::Unreadable {
            table: name.to_string(),
            reason: e.to_string(),
        })?;
        parse_table(name, &text)
    }

    /// Load every named table into `catalog`, stopping at the first failure
    pub fn load_into(&self, catalog: &Catalog, names: &[String]) -> QueryResult<()> {
        for name in names {
            let table = self.load(name)?;
            catalog.register(table);
        }
        Ok(())
    }
}

/// Parse the contents of a table file
pub fn parse_table(name: &str, text: &str) -> QueryResult<Table> {
    let malformed = |line: usize, reason: String| LookupError::Malformed {
        table: name.to_string(),
        line,
        reason,
    };

    let mut lines = text.lines().map(|l| l.trim_end_matches('\r')).enumerate();
    let (_, header) = lines
        .next()
        .ok_or_else(|| malformed(1, "missing column names".to_string()))?;
    let (_, declarations) = lines
        .next()
        .ok_or_else(|| malformed(2, "missing domain declarations".to_string()))?;

    let names: Vec<&str> = header.split(FIELD_SEPARATOR).map(str::trim).collect();
    let domains = declarations
        .split(FIELD_SEPARATOR)
        .map(|d| parse_domain(d.trim()))
        .collect::<Result<Vec<Domain>, _>>()?;
    if names.len() != domains.len() {
        return Err(malformed(
            2,
            format!("{} column names but {} domain declarations", names.len(), domains.len()),
        )
        .into());
    }

    let columns = names
        .iter()
        .zip(domains)
        .map(|(column, domain)| Column::qualified(name, *column, domain))
        .collect();
    let schema = Schema::new(columns)?;

    let mut cells = Vec::new();
    let mut skipped = 0;
    for (index, line) in lines {
        if line.trim().is_empty() {
            skipped += 1;
            continue;
        }
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != schema.len() {
            return Err(malformed(
                index + 1,
                format!("expected {} cells but got {}", schema.len(), fields.len()),
            )
            .into());
        }
        for (field, column) in fields.iter().zip(schema.columns()) {
            cells.push(column.domain().parse_value(field)?);
        }
    }
    if skipped > 0 {
        warn!("skipped {} blank line(s) in table {}", skipped, name);
    }

    Ok(Table::new(name, schema, cells)?)
}
