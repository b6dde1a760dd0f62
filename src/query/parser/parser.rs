// SQL Parser Implementation
//
// This module implements a recursive descent parser for SQL that converts
// tokens from the lexer into a `Query`. The parser keeps one token of
// lookahead and never moves its cursor backwards.

use std::fmt;

use log::debug;
use thiserror::Error;

use super::ast::*;
use super::lexer::{Keyword, LexError, Lexer, Token, TokenKind};
use crate::catalog::domain::{parse_date, Value};

/// What a sub-parser was looking for when it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Kind(TokenKind),
    OneOf(Vec<TokenKind>),
    Keyword(Keyword),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Kind(kind) => write!(f, "{}", kind),
            Expected::OneOf(kinds) => {
                let names: Vec<String> = kinds.iter().map(ToString::to_string).collect();
                f.write_str(&names.join(" or "))
            }
            Expected::Keyword(keyword) => write!(f, "keyword {}", keyword),
        }
    }
}

impl From<&[TokenKind]> for Expected {
    fn from(kinds: &[TokenKind]) -> Self {
        match kinds {
            [kind] => Expected::Kind(*kind),
            _ => Expected::OneOf(kinds.to_vec()),
        }
    }
}

/// SQL Parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: Expected },
    #[error("unexpected token at position {position}: expected {expected} but got {found}({text}) instead")]
    UnexpectedToken {
        expected: Expected,
        found: TokenKind,
        text: String,
        position: usize,
    },
    #[error("unexpected keyword in context: expected {expected} clause {context} but got keyword {found} instead")]
    UnexpectedKeyword {
        expected: Keyword,
        found: Keyword,
        context: &'static str,
        position: usize,
    },
    #[error("unexpected trailing content after end of query at position {position}: \"{text}\"")]
    TrailingContent { text: String, position: usize },
    #[error("cannot select all (*) together with other columns")]
    WildcardWithColumns,
    #[error("invalid {kind} literal \"{text}\" at position {position}: {reason}")]
    InvalidLiteral {
        kind: TokenKind,
        text: String,
        position: usize,
        reason: String,
    },
    #[error("parentheses nested too deeply at position {position} (limit {})", MAX_NESTING)]
    NestingTooDeep { position: usize },
    #[error("expression too long at position {position} (limit {} operands)", MAX_OPERANDS)]
    ExpressionTooLong { position: usize },
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Tokens that may open an arithmetic operand
const OPERAND_START: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::Integer,
    TokenKind::String,
    TokenKind::Date,
    TokenKind::LeftParen,
];

/// Deepest run of nested parentheses accepted in an expression
pub const MAX_NESTING: usize = 256;

/// Most operands accepted in one expression
pub const MAX_OPERANDS: usize = 1024;

/// SQL Parser for constructing a `Query` from SQL tokens
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    /// Parentheses currently open
    depth: usize,
    /// Operands read by the current `parse_math_expr` call tree
    operands: usize,
}

impl Parser {
    /// Create a new parser from a SQL query string
    pub fn new(input: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        debug!("tokenized query into {} tokens", tokens.len() - 1);
        Ok(Self::from_tokens(tokens))
    }

    /// Create a parser from an already materialized token stream
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EndOfInput) {
            let position = tokens.last().map_or(0, |t| t.position + t.text.len());
            tokens.push(Token {
                kind: TokenKind::EndOfInput,
                text: String::new(),
                position,
            });
        }
        Parser {
            tokens,
            cursor: 0,
            depth: 0,
            operands: 0,
        }
    }

    /// The current token; the trailing `EndOfInput` once the stream is consumed
    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.cursor.min(last)]
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume the current token
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EndOfInput {
            self.cursor += 1;
        }
        token
    }

    fn unexpected(&self, expected: Expected) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::EndOfInput {
            ParseError::UnexpectedEndOfInput { expected }
        } else {
            ParseError::UnexpectedToken {
                expected,
                found: token.kind,
                text: token.text.clone(),
                position: token.position,
            }
        }
    }

    /// Consume the current token if it is one of `kinds`
    fn expect(&mut self, kinds: &[TokenKind]) -> ParseResult<Token> {
        if kinds.contains(&self.peek().kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(Expected::from(kinds)))
        }
    }

    /// Consume a specific keyword
    fn expect_keyword(&mut self, keyword: Keyword, context: &'static str) -> ParseResult<()> {
        if !self.current_is(TokenKind::Keyword) {
            return Err(self.unexpected(Expected::Keyword(keyword)));
        }
        let token = self.advance();
        match token.keyword() {
            Some(found) if found == keyword => Ok(()),
            Some(found) => Err(ParseError::UnexpectedKeyword {
                expected: keyword,
                found,
                context,
                position: token.position,
            }),
            None => Err(ParseError::UnexpectedToken {
                expected: Expected::Keyword(keyword),
                found: token.kind,
                text: token.text,
                position: token.position,
            }),
        }
    }

    /// Parse a full query; any token left after it is an error
    pub fn parse_query(&mut self) -> ParseResult<Query> {
        let selected = self.parse_select_clause()?;
        let tables = self.parse_from_clause()?;
        let predicate = self.parse_where_clause()?;

        if self.current_is(TokenKind::Terminator) {
            self.advance();
        }
        if !self.current_is(TokenKind::EndOfInput) {
            let token = self.peek();
            return Err(ParseError::TrailingContent {
                text: token.text.clone(),
                position: token.position,
            });
        }

        let query = Query {
            selected,
            tables,
            predicate,
        };
        debug!("parsed query: {}", query);
        Ok(query)
    }

    /// `SELECT ("*" | attr) ("," attr)*`
    fn parse_select_clause(&mut self) -> ParseResult<Vec<String>> {
        self.expect_keyword(Keyword::Select, "at the start of query")?;

        let mut selected = vec![self.parse_selected_column()?];
        while self.current_is(TokenKind::Comma) {
            self.advance();
            selected.push(self.parse_selected_column()?);
        }

        if selected.len() > 1 && selected.iter().any(|name| name == WILDCARD) {
            return Err(ParseError::WildcardWithColumns);
        }
        Ok(selected)
    }

    fn parse_selected_column(&mut self) -> ParseResult<String> {
        self.expect(&[TokenKind::Identifier, TokenKind::Wildcard])
            .map(|token| token.text)
    }

    /// `FROM ident ("," ident)*`
    fn parse_from_clause(&mut self) -> ParseResult<Vec<String>> {
        self.expect_keyword(Keyword::From, "after SELECT clause")?;

        let mut tables = vec![self.expect(&[TokenKind::Identifier])?.text];
        while self.current_is(TokenKind::Comma) {
            self.advance();
            tables.push(self.expect(&[TokenKind::Identifier])?.text);
        }
        Ok(tables)
    }

    /// `[WHERE attr compareOp operand]`
    fn parse_where_clause(&mut self) -> ParseResult<Option<Predicate>> {
        if !self.current_is(TokenKind::Keyword) {
            return Ok(None);
        }
        self.expect_keyword(Keyword::Where, "after FROM clause")?;

        let attribute = self.expect(&[TokenKind::Identifier])?.text;
        let op_token = self.expect(&[TokenKind::CompareOp])?;
        let op = CompareOp::from_symbol(&op_token.text).ok_or_else(|| ParseError::UnexpectedToken {
            expected: Expected::Kind(TokenKind::CompareOp),
            found: op_token.kind,
            text: op_token.text.clone(),
            position: op_token.position,
        })?;
        let operand = self.parse_math_expr()?;

        Ok(Some(Predicate::new(attribute, op, operand)))
    }

    /// An operator between operands; `*` arrives as a wildcard token
    fn peek_arith_op(&self) -> Option<ArithOp> {
        let token = self.peek();
        match token.kind {
            TokenKind::ArithOp | TokenKind::Wildcard => ArithOp::from_symbol(&token.text),
            _ => None,
        }
    }

    /// `operand (mathOp operand)*`, spliced by precedence as it is read
    pub fn parse_math_expr(&mut self) -> ParseResult<MathExpr> {
        if self.depth == 0 {
            self.operands = 0;
        }
        let mut expr = self.parse_operand()?;
        while let Some(op) = self.peek_arith_op() {
            self.advance();
            let rhs = self.parse_operand()?;
            expr.extend(op, rhs);
        }
        Ok(expr)
    }

    fn parse_operand(&mut self) -> ParseResult<MathExpr> {
        let token = self.peek().clone();
        self.operands += 1;
        if self.operands > MAX_OPERANDS {
            return Err(ParseError::ExpressionTooLong {
                position: token.position,
            });
        }
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                Ok(MathExpr::attribute(token.text))
            }
            TokenKind::Integer | TokenKind::String | TokenKind::Date => {
                self.advance();
                parse_literal(&token).map(MathExpr::literal)
            }
            TokenKind::ArithOp if token.text == "-" => {
                self.advance();
                let digits = self.expect(&[TokenKind::Integer])?;
                let negated = Token {
                    text: format!("-{}", digits.text),
                    ..digits
                };
                parse_literal(&negated).map(MathExpr::literal)
            }
            TokenKind::LeftParen => {
                if self.depth >= MAX_NESTING {
                    return Err(ParseError::NestingTooDeep {
                        position: token.position,
                    });
                }
                self.advance();
                self.depth += 1;
                let inner = self.parse_math_expr();
                self.depth -= 1;
                let inner = inner?;
                self.expect(&[TokenKind::RightParen])?;
                Ok(MathExpr::group(inner))
            }
            _ => Err(self.unexpected(Expected::from(OPERAND_START))),
        }
    }
}

/// Convert a literal token into a value
fn parse_literal(token: &Token) -> ParseResult<Value> {
    let invalid = |reason: String| ParseError::InvalidLiteral {
        kind: token.kind,
        text: token.text.clone(),
        position: token.position,
        reason,
    };
    match token.kind {
        TokenKind::Integer => token
            .text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| invalid(e.to_string())),
        TokenKind::String => {
            // Lexer guarantees matching quotes at both ends
            let inner = &token.text[1..token.text.len() - 1];
            Ok(Value::Text(inner.to_string()))
        }
        TokenKind::Date => parse_date(&token.text)
            .map(Value::Date)
            .ok_or_else(|| invalid("not a valid day\\month\\year date".to_string())),
        kind => Err(invalid(format!("{} is not a literal", kind))),
    }
}

/// Parse a query string
pub fn parse(text: &str) -> ParseResult<Query> {
    Parser::new(text)?.parse_query()
}
