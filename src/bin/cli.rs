use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use relql::catalog::{Catalog, CsvLoader, LoaderConfig, Table};
use relql::query::executor::engine::ExecutionEngine;
use relql::query::executor::result::QueryResult;
use relql::query::parser::parse;

const HISTORY_FILE: &str = ".relql_history";
const EXIT_COMMAND: &str = "EXIT";

#[derive(Parser)]
#[command(author, version, about = "relql - run SELECT queries over delimited table files")]
struct Cli {
    /// Directory holding the table files
    #[arg(short = 'd', long, default_value = "Tables")]
    tables_dir: PathBuf,

    /// Table to load at start-up (repeatable)
    #[arg(short, long = "table")]
    tables: Vec<String>,

    /// How results are printed
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive shell
    Shell,

    /// Execute a query directly
    Query {
        /// Query to execute
        query: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Loaded tables plus the engine querying them
struct Session {
    catalog: Arc<Catalog>,
    loader: CsvLoader,
    engine: ExecutionEngine<Arc<Catalog>>,
    format: OutputFormat,
}

impl Session {
    fn new(tables_dir: PathBuf, format: OutputFormat) -> Self {
        let catalog = Arc::new(Catalog::new());
        let loader = CsvLoader::new(LoaderConfig {
            root: tables_dir,
            ..LoaderConfig::default()
        });
        Session {
            engine: ExecutionEngine::new(catalog.clone()),
            catalog,
            loader,
            format,
        }
    }

    fn preload(&self, names: &[String]) -> Result<()> {
        self.loader
            .load_into(&self.catalog, names)
            .with_context(|| format!("Failed to load tables from {}", self.loader.config().root.display()))
    }

    /// Run a query, first loading any source table not yet in the catalog
    fn execute_query(&self, sql: &str) -> QueryResult<Table> {
        let query = parse(sql)?;
        for name in &query.tables {
            if !self.catalog.table_exists(name) {
                self.catalog.register(self.loader.load(name)?);
            }
        }
        self.engine.run(&query)
    }

    fn render(&self, table: &Table) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(format!("{}({} rows)", table, table.row_count())),
            OutputFormat::Json => serde_json::to_string_pretty(table).context("Failed to encode result"),
        }
    }

    fn list_tables(&self) {
        let names = self.catalog.table_names();
        if names.is_empty() {
            println!("No tables loaded.");
        }
        for name in names {
            println!("{}", name);
        }
    }

    fn describe(&self, name: &str) {
        match self.catalog.get_table(name) {
            Some(table) => println!("{}", table.schema()),
            None => println!("Table {} is not loaded.", name),
        }
    }
}

/// Append `line` to the pending statement; returns the statement once a line
/// containing `;` completes it.
fn take_statement(pending: &mut String, line: &str) -> Option<String> {
    if !pending.is_empty() {
        pending.push(' ');
    }
    pending.push_str(line);
    if line.contains(';') {
        Some(std::mem::take(pending))
    } else {
        None
    }
}

fn run_shell(session: &Session) -> Result<()> {
    println!("Welcome to relql. End each query with a semicolon; type {} to quit.", EXIT_COMMAND);

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    if let Err(err) = rl.load_history(HISTORY_FILE) {
        if !err.to_string().contains("No such file or directory") {
            println!("Error loading history: {}", err);
        }
    }

    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() { "relql> " } else { "  ...> " };
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if line.eq_ignore_ascii_case(EXIT_COMMAND) {
                    break;
                }
                if pending.is_empty() {
                    if line == "help" {
                        print_help();
                        continue;
                    }
                    if line == ".tables" {
                        session.list_tables();
                        continue;
                    }
                    if let Some(name) = line.strip_prefix(".schema") {
                        session.describe(name.trim());
                        continue;
                    }
                }

                if let Some(statement) = take_statement(&mut pending, line) {
                    match session.execute_query(&statement) {
                        Ok(table) => println!("{}", session.render(&table)?),
                        Err(err) => println!("Error: {}", err),
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
                println!("CTRL-C");
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        println!("Error saving history: {}", err);
    }
    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!("  SELECT <cols> FROM <tables> [WHERE <col> <op> <expr>];  - Run a query");
    println!("  .tables                       - List loaded tables");
    println!("  .schema <table>               - Show a table's columns");
    println!("  help                          - Display this help message");
    println!("  {}                          - Exit the shell", EXIT_COMMAND);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let session = Session::new(cli.tables_dir, cli.format);
    session.preload(&cli.tables)?;

    match &cli.command {
        Some(Commands::Query { query }) => match session.execute_query(query) {
            Ok(table) => println!("{}", session.render(&table)?),
            Err(err) => bail!("Error executing query: {}", err),
        },
        Some(Commands::Shell) | None => run_shell(&session)?,
    }

    Ok(())
}
