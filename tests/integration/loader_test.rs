use anyhow::Result;
use relql::catalog::{Catalog, CsvLoader, LoaderConfig, LookupError, TableProvider, Value};
use relql::query::executor::engine::ExecutionEngine;
use relql::query::executor::result::QueryError;

#[path = "../common/mod.rs"]
mod common;
use common::{column_values, create_table_dir, text};

const STUDENT_CSV: &str = "SId,Name,Enrolled\ninteger,varchar(40),date\n0,John Doe,01/09/2019\n1,Alice Bob,15/09/2020\n";
const COURSE_CSV: &str = "CId,Title,Owner\ninteger,varchar(20),integer\n10,Algebra,1\n11,Biology,0\n";

#[test]
fn test_load_and_query() -> Result<()> {
    let dir = create_table_dir(&[("Student", STUDENT_CSV), ("Course", COURSE_CSV)])?;
    let loader = CsvLoader::with_root(dir.path());
    let catalog = Catalog::new();
    loader.load_into(&catalog, &["Student".to_string(), "Course".to_string()])?;
    assert_eq!(catalog.table_names(), vec!["Student", "Course"]);

    let engine = ExecutionEngine::new(&catalog);
    let result = engine.execute_query("SELECT Name FROM Student WHERE Enrolled > 1\\1\\2020;")?;
    assert_eq!(column_values(&result, 0), vec![text("Alice Bob")]);

    let result = engine.execute_query("SELECT Title FROM Student, Course WHERE Owner = SId")?;
    assert_eq!(column_values(&result, 0), vec![text("Biology"), text("Algebra")]);
    Ok(())
}

#[test]
fn test_date_arithmetic_in_where() -> Result<()> {
    let dir = create_table_dir(&[("Student", STUDENT_CSV)])?;
    let catalog = Catalog::new();
    CsvLoader::with_root(dir.path()).load_into(&catalog, &["Student".to_string()])?;

    let engine = ExecutionEngine::new(catalog);
    let result = engine.execute_query("SELECT SId FROM Student WHERE Enrolled >= 1\\9\\2020 - 366")?;
    assert_eq!(column_values(&result, 0), vec![Value::Integer(0), Value::Integer(1)]);
    Ok(())
}

#[test]
fn test_custom_extension() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("Student.tbl"), STUDENT_CSV)?;
    let loader = CsvLoader::new(LoaderConfig {
        root: dir.path().to_path_buf(),
        extension: "tbl".to_string(),
    });
    let table = loader.load("Student")?;
    assert_eq!(table.row_count(), 2);
    Ok(())
}

#[test]
fn test_loader_errors() -> Result<()> {
    let dir = create_table_dir(&[
        ("Short", "A,B\ninteger,integer\n1,2\n3\n"),
        ("BadDomain", "A\nvarchar(abc)\n"),
        ("BadValue", "A\nvarchar(3)\nabcdef\n"),
    ])?;
    let loader = CsvLoader::with_root(dir.path());

    assert!(matches!(
        loader.load("Missing"),
        Err(QueryError::Lookup(LookupError::Unreadable { .. }))
    ));
    assert!(matches!(
        loader.load("../Short"),
        Err(QueryError::Lookup(LookupError::InvalidName(_)))
    ));
    assert!(matches!(
        loader.load("Short"),
        Err(QueryError::Lookup(LookupError::Malformed { line: 4, .. }))
    ));
    assert!(matches!(loader.load("BadDomain"), Err(QueryError::DomainSyntax(_))));
    assert!(matches!(loader.load("BadValue"), Err(QueryError::DomainValue(_))));

    // A failed load registers nothing after the failure
    let catalog = Catalog::new();
    let names = vec!["Short".to_string()];
    assert!(loader.load_into(&catalog, &names).is_err());
    assert_eq!(catalog.get_tables(&names), Err(LookupError::UnknownTable("Short".to_string())));
    Ok(())
}
