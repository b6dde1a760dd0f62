#![allow(dead_code)]

use std::fs;

use anyhow::Result;
use tempfile::TempDir;

use relql::catalog::{Catalog, Column, Domain, Schema, Table, Value};

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

// The two-row Student table used across the integration tests
pub fn student_table() -> Result<Table> {
    let schema = Schema::new(vec![
        Column::qualified("Student", "SId", Domain::Integer),
        Column::qualified("Student", "Name", Domain::VarChar { max_len: 40 }),
    ])?;
    let table = Table::from_rows(
        "Student",
        schema,
        vec![
            vec![Value::Integer(0), text("John Doe")],
            vec![Value::Integer(1), text("Alice Bob")],
        ],
    )?;
    Ok(table)
}

// A Course table whose Name column collides with Student.Name
pub fn course_table() -> Result<Table> {
    let schema = Schema::new(vec![
        Column::qualified("Course", "CId", Domain::Integer),
        Column::qualified("Course", "Name", Domain::VarChar { max_len: 20 }),
        Column::qualified("Course", "Owner", Domain::Integer),
    ])?;
    let table = Table::from_rows(
        "Course",
        schema,
        vec![
            vec![Value::Integer(10), text("Algebra"), Value::Integer(1)],
            vec![Value::Integer(11), text("Biology"), Value::Integer(0)],
            vec![Value::Integer(12), text("Chemistry"), Value::Integer(1)],
        ],
    )?;
    Ok(table)
}

// Catalog holding Student and Course
pub fn create_test_catalog() -> Result<Catalog> {
    let catalog = Catalog::new();
    catalog.register(student_table()?);
    catalog.register(course_table()?);
    Ok(catalog)
}

// Write table files into a fresh temporary directory
pub fn create_table_dir(files: &[(&str, &str)]) -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    for (name, contents) in files {
        fs::write(dir.path().join(format!("{}.csv", name)), contents)?;
    }
    Ok(dir)
}

// Column values of a table, row by row
pub fn column_values(table: &Table, column: usize) -> Vec<Value> {
    table.rows().map(|row| row[column].clone()).collect()
}
