use anyhow::Result;
use relql::catalog::Value;
use relql::query::parser::ast::{ArithOp, CompareOp, ExprNode, MathExpr, WILDCARD};
use relql::query::parser::lexer::{tokenize, TokenKind};
use relql::query::parser::{parse, Expected, Keyword, ParseError, Parser};

#[test]
fn test_scenario_query_tokens() -> Result<()> {
    let tokens = tokenize("SELECT Name FROM Student WHERE SId > 0;")?;
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword,
            TokenKind::Identifier,
            TokenKind::Keyword,
            TokenKind::Identifier,
            TokenKind::Keyword,
            TokenKind::Identifier,
            TokenKind::CompareOp,
            TokenKind::Integer,
            TokenKind::Terminator,
            TokenKind::EndOfInput,
        ]
    );
    Ok(())
}

#[test]
fn test_scenario_query_structure() -> Result<()> {
    let query = parse("SELECT Name FROM Student WHERE SId > 0;")?;
    assert_eq!(query.selected, vec!["Name"]);
    assert_eq!(query.tables, vec!["Student"]);

    let predicate = query.predicate.expect("Expected WHERE clause");
    assert_eq!(predicate.attribute.name, "SId");
    assert_eq!(predicate.op, CompareOp::Greater);
    assert_eq!(predicate.operand, MathExpr::literal(Value::Integer(0)));
    Ok(())
}

#[test]
fn test_keywords_are_case_insensitive() -> Result<()> {
    let query = parse("select * from Student, Course")?;
    assert_eq!(query.selected, vec![WILDCARD]);
    assert_eq!(query.tables, vec!["Student", "Course"]);
    assert!(query.predicate.is_none());
    Ok(())
}

#[test]
fn test_arithmetic_precedence() -> Result<()> {
    let cases = [
        ("a + b * c", "a + (b * c)"),
        ("a * b + c", "(a * b) + c"),
        ("a + b * c % d", "a + ((b * c) % d)"),
        ("a - b - c", "(a - b) - c"),
        ("a % b * c", "a % (b * c)"),
        ("(a + b) * c", "(a + b) * c"),
        ("a * (b + c) / d", "(a * (b + c)) / d"),
    ];
    for (input, expected) in cases {
        let expr = Parser::new(input)?.parse_math_expr()?;
        assert_eq!(expr.to_string(), expected, "input: {}", input);
    }
    Ok(())
}

#[test]
fn test_root_operator_is_lowest_precedence() -> Result<()> {
    let query = parse("SELECT a FROM t WHERE a = b + c * d")?;
    let operand = query.predicate.expect("Expected WHERE clause").operand;
    match operand.node(operand.root()) {
        ExprNode::Binary { op, .. } => assert_eq!(*op, ArithOp::Add),
        other => panic!("Expected binary root, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_literals() -> Result<()> {
    let query = parse("SELECT a FROM t WHERE born >= 24\\12\\1999")?;
    let predicate = query.predicate.expect("Expected WHERE clause");
    assert_eq!(predicate.op, CompareOp::GreaterEquals);
    assert_eq!(predicate.operand.to_string(), "24\\12\\1999");

    let query = parse("SELECT a FROM t WHERE name <> 'John Doe'")?;
    let predicate = query.predicate.expect("Expected WHERE clause");
    assert_eq!(predicate.op, CompareOp::NotEquals);
    assert_eq!(predicate.operand, MathExpr::literal(Value::Text("John Doe".to_string())));

    let query = parse("SELECT a FROM t WHERE a = -3")?;
    let predicate = query.predicate.expect("Expected WHERE clause");
    assert_eq!(predicate.operand, MathExpr::literal(Value::Integer(-3)));
    Ok(())
}

#[test]
fn test_invalid_date_literal_reported() {
    let result = parse("SELECT a FROM t WHERE born = 31\\02\\1999");
    match result {
        Err(ParseError::InvalidLiteral { kind, text, .. }) => {
            assert_eq!(kind, TokenKind::Date);
            assert_eq!(text, "31\\02\\1999");
        }
        other => panic!("Expected invalid literal error, got {:?}", other),
    }
}

#[test]
fn test_wildcard_with_columns_rejected() {
    assert_eq!(parse("SELECT *, Name FROM Student"), Err(ParseError::WildcardWithColumns));
    assert_eq!(parse("SELECT Name, * FROM Student"), Err(ParseError::WildcardWithColumns));
}

#[test]
fn test_structural_errors() {
    assert!(matches!(
        parse("SELECT Name"),
        Err(ParseError::UnexpectedEndOfInput {
            expected: Expected::Keyword(Keyword::From)
        })
    ));
    assert!(matches!(
        parse("SELECT Name FROM Student WHERE"),
        Err(ParseError::UnexpectedEndOfInput { .. })
    ));
    assert!(matches!(
        parse("SELECT Name FROM Student; SELECT"),
        Err(ParseError::TrailingContent { .. })
    ));
    assert!(matches!(
        parse("SELECT Name FROM Student WHERE * = 1"),
        Err(ParseError::UnexpectedToken { .. })
    ));
    assert!(matches!(parse("SELECT Name FROM Student WHERE a ? 1"), Err(ParseError::Lex(_))));
}

#[test]
fn test_error_messages_name_expected_and_found() {
    let err = parse("SELECT Name FROM 42").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("42"), "message: {}", message);
}
