use anyhow::Result;
use chrono::NaiveDate;
use relql::catalog::{parse_domain, Domain, DomainSyntaxError, EvalError, Value};
use relql::query::parser::ast::{ArithOp, CompareOp};

fn date(day: u32, month: u32, year: i32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

#[test]
fn test_bounded_string_length() -> Result<()> {
    let domain = Domain::VarChar { max_len: 3 };
    assert!(!domain.can_validate(&Value::Text("hello".to_string())));
    assert!(domain.can_validate(&Value::Text("hey".to_string())));

    let err = domain.parse_value("hello").unwrap_err();
    assert_eq!(err.domain, "varchar(3)");
    assert_eq!(err.value, "hello");
    assert!(err.reason.contains("max length (3)"), "reason: {}", err.reason);
    Ok(())
}

#[test]
fn test_domain_declarations() -> Result<()> {
    assert_eq!(parse_domain("integer")?, Domain::Integer);
    assert_eq!(parse_domain("date")?, Domain::Date);
    assert_eq!(parse_domain("varchar(40)")?, Domain::VarChar { max_len: 40 });
    assert_eq!("VARCHAR(12)".parse::<Domain>()?, Domain::VarChar { max_len: 12 });
    Ok(())
}

#[test]
fn test_malformed_domain_declarations() {
    assert!(matches!(
        parse_domain("varchar(abc)"),
        Err(DomainSyntaxError::InvalidArgument { .. })
    ));
    assert!(matches!(parse_domain("varchar(40"), Err(DomainSyntaxError::UnclosedParentheses(_))));
    assert!(matches!(parse_domain("text"), Err(DomainSyntaxError::UnknownDomain(_))));
    assert!(matches!(parse_domain("float(3)"), Err(DomainSyntaxError::UnknownDomain(_))));
}

#[test]
fn test_value_parsing_errors_name_domain() {
    let err = Domain::Integer.parse_value("12a").unwrap_err();
    assert_eq!(err.domain, "integer");
    assert_eq!(err.value, "12a");

    let err = Domain::Date.parse_value("2020-01-01").unwrap_err();
    assert_eq!(err.domain, "date");
    assert!(err.reason.contains("date"));
}

#[test]
fn test_dates_parse_and_compare() -> Result<()> {
    assert_eq!(Domain::Date.parse_value("5/11/2021")?, date(5, 11, 2021));
    assert!(Domain::Date.compare(CompareOp::Less, &date(31, 12, 2020), &date(1, 1, 2021)));
    assert!(Domain::Date.compare(CompareOp::NotEquals, &date(1, 1, 2021), &date(2, 1, 2021)));
    Ok(())
}

#[test]
fn test_varchar_comparisons_fold_case() {
    let domain = Domain::VarChar { max_len: 20 };
    let lower = Value::Text("alice".to_string());
    let upper = Value::Text("ALICE".to_string());
    assert!(domain.compare(CompareOp::Equals, &lower, &upper));
    assert!(domain.compare(CompareOp::GreaterEquals, &lower, &upper));
    assert!(!domain.compare(CompareOp::NotEquals, &lower, &upper));
    assert!(domain.compare(CompareOp::Less, &Value::Text("Bob".to_string()), &Value::Text("carol".to_string())));
}

#[test]
fn test_domain_arithmetic() -> Result<()> {
    assert_eq!(
        Domain::Integer.arithmetic(ArithOp::Modulo, &Value::Integer(7), &Value::Integer(3))?,
        Value::Integer(1)
    );
    assert_eq!(
        Domain::Date.arithmetic(ArithOp::Add, &date(28, 2, 2020), &Value::Integer(2))?,
        date(1, 3, 2020)
    );
    assert_eq!(
        Domain::Date.arithmetic(ArithOp::Subtract, &date(1, 3, 2020), &date(28, 2, 2020))?,
        Value::Integer(2)
    );
    assert!(matches!(
        Domain::Integer.arithmetic(ArithOp::Divide, &Value::Integer(1), &Value::Integer(0)),
        Err(EvalError::DivisionByZero(_))
    ));
    assert!(matches!(
        Domain::Integer.arithmetic(ArithOp::Multiply, &Value::Integer(i64::MAX), &Value::Integer(2)),
        Err(EvalError::Overflow(_))
    ));
    assert!(matches!(
        Domain::VarChar { max_len: 5 }.arithmetic(
            ArithOp::Subtract,
            &Value::Text("a".to_string()),
            &Value::Text("b".to_string())
        ),
        Err(EvalError::UnsupportedOperation { .. })
    ));
    Ok(())
}
