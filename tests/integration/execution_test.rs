use anyhow::Result;
use relql::catalog::{LookupError, SchemaError, Value};
use relql::query::executor::engine::ExecutionEngine;
use relql::query::executor::result::QueryError;
use relql::query::parser::ast::{CompareOp, MathExpr, Predicate};
use relql::query::parser::{parse, ParseError};

// Declare the common module for test utilities using a path attribute
#[path = "../common/mod.rs"]
mod common;
use common::{column_values, create_test_catalog, student_table, text};

#[test]
fn test_scenario_query() -> Result<()> {
    let engine = ExecutionEngine::new(create_test_catalog()?);
    let result = engine.execute_query("SELECT Name FROM Student WHERE SId > 0;")?;

    assert_eq!(result.row_count(), 1);
    assert_eq!(result.column_count(), 1);
    assert_eq!(result.cell(0, 0), Some(&text("Alice Bob")));
    Ok(())
}

#[test]
fn test_query_run_against_provider() -> Result<()> {
    let catalog = create_test_catalog()?;
    let query = parse("SELECT SId FROM Student")?;
    let result = query.run(&catalog)?;
    assert_eq!(column_values(&result, 0), vec![Value::Integer(0), Value::Integer(1)]);
    Ok(())
}

#[test]
fn test_project_then_permuted_project() -> Result<()> {
    let student = student_table()?;
    let first = student.project(&["SId", "Name"])?;
    let second = first.project(&["Name", "SId"])?;
    assert_eq!(second.schema().column_names(), vec!["Name", "SId"]);

    let narrowed = first.project(&["Name"])?;
    assert_eq!(narrowed.schema().column_names(), vec!["Name"]);
    assert_eq!(column_values(&narrowed, 0), vec![text("John Doe"), text("Alice Bob")]);

    // Receivers are never modified
    assert_eq!(student.schema().column_names(), vec!["SId", "Name"]);
    assert_eq!(student.row_count(), 2);
    Ok(())
}

#[test]
fn test_filter_is_idempotent() -> Result<()> {
    let student = student_table()?;
    let predicate = Predicate::new("Name", CompareOp::NotEquals, MathExpr::literal(text("john doe")));
    let once = student.filter(&predicate)?;
    let twice = once.filter(&predicate)?;
    assert_eq!(once, twice);
    assert_eq!(once.row_count(), 1);
    Ok(())
}

#[test]
fn test_wildcard_after_filter() -> Result<()> {
    let student = student_table()?;
    let predicate = Predicate::new("SId", CompareOp::GreaterEquals, MathExpr::literal(Value::Integer(1)));
    let filtered = student.filter(&predicate)?;
    let selected = filtered.project(&["*"])?;

    assert_eq!(selected.schema(), student.schema());
    assert_eq!(selected.row_count(), 1);
    assert_eq!(selected.row(0), Some(&[Value::Integer(1), text("Alice Bob")][..]));
    Ok(())
}

#[test]
fn test_where_with_arithmetic_operand() -> Result<()> {
    let engine = ExecutionEngine::new(create_test_catalog()?);

    let result = engine.execute_query("SELECT Name FROM Student WHERE SId = 3 - 2 * 1;")?;
    assert_eq!(column_values(&result, 0), vec![text("Alice Bob")]);

    let result = engine.execute_query("SELECT Name FROM Student WHERE SId < SId + 1")?;
    assert_eq!(result.row_count(), 2);

    let result = engine.execute_query("SELECT Name FROM Student WHERE Name = 'alice' + ' bob'")?;
    assert_eq!(column_values(&result, 0), vec![text("Alice Bob")]);
    Ok(())
}

#[test]
fn test_string_comparison_is_case_insensitive() -> Result<()> {
    let engine = ExecutionEngine::new(create_test_catalog()?);
    let result = engine.execute_query("SELECT SId FROM Student WHERE Name = 'JOHN DOE'")?;
    assert_eq!(column_values(&result, 0), vec![Value::Integer(0)]);

    let result = engine.execute_query("SELECT SId FROM Student WHERE Name > 'b'")?;
    assert_eq!(column_values(&result, 0), vec![Value::Integer(0)]);
    Ok(())
}

#[test]
fn test_errors_short_circuit() -> Result<()> {
    let engine = ExecutionEngine::new(create_test_catalog()?);

    assert_eq!(
        engine.execute_query("SELECT *, Name FROM Student"),
        Err(QueryError::Parse(ParseError::WildcardWithColumns))
    );
    assert_eq!(
        engine.execute_query("SELECT Name FROM Nobody WHERE Age = 1"),
        Err(QueryError::Lookup(LookupError::UnknownTable("Nobody".to_string())))
    );
    assert_eq!(
        engine.execute_query("SELECT Name FROM Student WHERE Age = 1"),
        Err(QueryError::Schema(SchemaError::UnknownColumn("Age".to_string())))
    );
    assert!(matches!(
        engine.execute_query("SELECT Name FROM Student WHERE SId = 'one'"),
        Err(QueryError::DomainValue(_))
    ));
    assert!(matches!(
        engine.execute_query("SELECT Name FROM Student WHERE SId = SId / 0"),
        Err(QueryError::Eval(_))
    ));
    Ok(())
}

#[test]
fn test_empty_result_keeps_schema() -> Result<()> {
    let engine = ExecutionEngine::new(create_test_catalog()?);
    let result = engine.execute_query("SELECT SId, Name FROM Student WHERE SId > 100")?;
    assert_eq!(result.row_count(), 0);
    assert_eq!(result.schema().column_names(), vec!["SId", "Name"]);
    Ok(())
}
