// SQL Parser Module
//
// This module is responsible for tokenizing query text and parsing it into
// a `Query` carrying the select list, source tables and optional predicate.

pub mod lexer;
pub mod ast;
pub mod parser;

// Export key types
pub use self::ast::{ArithOp, Attribute, CompareOp, MathExpr, Operand, Predicate, Query, WILDCARD};
pub use self::lexer::{tokenize, Keyword, LexError, Lexer, Token, TokenKind};
pub use self::parser::{parse, Expected, ParseError, ParseResult, Parser};
