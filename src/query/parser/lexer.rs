// SQL Lexer Implementation
//
// This module implements a rule-driven lexer: at every step an ordered list of
// matchers is tried against the remaining input and the first one that matches
// decides the token kind and how far the cursor advances.

use std::fmt;

use thiserror::Error;

/// Keywords understood by the query surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Where,
}

impl Keyword {
    const ALL: [Keyword; 3] = [Keyword::Select, Keyword::From, Keyword::Where];

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
        }
    }

    pub fn from_text(text: &str) -> Option<Keyword> {
        Self::ALL.into_iter().find(|kw| kw.as_str().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Integer,
    String,
    Date,
    CompareOp,
    ArithOp,
    Comma,
    Terminator,
    Wildcard,
    LeftParen,
    RightParen,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::String => "string",
            TokenKind::Date => "date",
            TokenKind::CompareOp => "comparison operator",
            TokenKind::ArithOp => "arithmetic operator",
            TokenKind::Comma => "\",\"",
            TokenKind::Terminator => "\";\"",
            TokenKind::Wildcard => "\"*\"",
            TokenKind::LeftParen => "\"(\"",
            TokenKind::RightParen => "\")\"",
            TokenKind::EndOfInput => "end of input",
        };
        f.write_str(name)
    }
}

/// A Token represents a lexical unit in the SQL query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact matched text
    pub text: String,
    /// Byte offset of the token in the query
    pub position: usize,
}

impl Token {
    /// The keyword this token spells, if it is one
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => Keyword::from_text(&self.text),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.text)
    }
}

/// No rule matched at `position`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized token at position {position}: \"{prefix}...\"")]
pub struct LexError {
    pub position: usize,
    pub prefix: String,
}

/// Length of the offending prefix quoted in a LexError
const ERROR_PREFIX_CHARS: usize = 30;

/// A matcher returns how many bytes at the start of its input it accepts
type Matcher = fn(&str) -> Option<usize>;

/// One lexing rule; a `None` kind marks input that is recognized but not emitted
struct Rule {
    matcher: Matcher,
    kind: Option<TokenKind>,
}

/// Ordered rules. Dates come before integers and keywords before identifiers.
static RULES: &[Rule] = &[
    Rule { matcher: match_whitespace, kind: None },
    Rule { matcher: match_comma, kind: Some(TokenKind::Comma) },
    Rule { matcher: match_terminator, kind: Some(TokenKind::Terminator) },
    Rule { matcher: match_wildcard, kind: Some(TokenKind::Wildcard) },
    Rule { matcher: match_date, kind: Some(TokenKind::Date) },
    Rule { matcher: match_integer, kind: Some(TokenKind::Integer) },
    Rule { matcher: match_string, kind: Some(TokenKind::String) },
    Rule { matcher: match_compare_op, kind: Some(TokenKind::CompareOp) },
    Rule { matcher: match_arith_op, kind: Some(TokenKind::ArithOp) },
    Rule { matcher: match_left_paren, kind: Some(TokenKind::LeftParen) },
    Rule { matcher: match_right_paren, kind: Some(TokenKind::RightParen) },
    Rule { matcher: match_keyword, kind: Some(TokenKind::Keyword) },
    Rule { matcher: match_identifier, kind: Some(TokenKind::Identifier) },
];

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn count_digits(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn match_char(input: &str, ch: char) -> Option<usize> {
    input.starts_with(ch).then(|| ch.len_utf8())
}

fn match_whitespace(input: &str) -> Option<usize> {
    let len: usize = input
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    (len > 0).then_some(len)
}

fn match_comma(input: &str) -> Option<usize> {
    match_char(input, ',')
}

fn match_terminator(input: &str) -> Option<usize> {
    match_char(input, ';')
}

fn match_wildcard(input: &str) -> Option<usize> {
    match_char(input, '*')
}

fn match_left_paren(input: &str) -> Option<usize> {
    match_char(input, '(')
}

fn match_right_paren(input: &str) -> Option<usize> {
    match_char(input, ')')
}

/// `d?d\d?d\dddd`
fn match_date(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut cursor = 0;
    for (min, max) in [(1, 2), (1, 2)] {
        let digits = count_digits(&bytes[cursor..]);
        if digits < min || digits > max {
            return None;
        }
        cursor += digits;
        if bytes.get(cursor) != Some(&b'\\') {
            return None;
        }
        cursor += 1;
    }
    (count_digits(&bytes[cursor..]) >= 4).then_some(cursor + 4)
}

fn match_integer(input: &str) -> Option<usize> {
    let digits = count_digits(input.as_bytes());
    (digits > 0).then_some(digits)
}

/// Single or double quoted, closed by the same quote character
fn match_string(input: &str) -> Option<usize> {
    let quote = input.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    input[1..].find(quote).map(|end| end + 2)
}

fn match_compare_op(input: &str) -> Option<usize> {
    ["!=", "<>", ">=", "<=", "=", ">", "<"]
        .into_iter()
        .find(|op| input.starts_with(op))
        .map(str::len)
}

fn match_arith_op(input: &str) -> Option<usize> {
    input.starts_with(['+', '-', '/', '%']).then_some(1)
}

fn match_keyword(input: &str) -> Option<usize> {
    let len = input.bytes().take_while(|b| is_word_byte(*b)).count();
    Keyword::from_text(&input[..len]).map(|_| len)
}

fn match_identifier(input: &str) -> Option<usize> {
    fn word(bytes: &[u8]) -> usize {
        match bytes.first() {
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {
                1 + bytes[1..].iter().take_while(|b| is_word_byte(**b)).count()
            }
            _ => 0,
        }
    }

    let bytes = input.as_bytes();
    let head = word(bytes);
    if head == 0 {
        return None;
    }
    // Optional `table.column` qualification
    if bytes.get(head) == Some(&b'.') {
        let tail = word(&bytes[head + 1..]);
        if tail > 0 {
            return Some(head + 1 + tail);
        }
    }
    Some(head)
}

/// SQL Lexer for breaking a query string into tokens
pub struct Lexer<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from a SQL query string
    pub fn new(input: &'a str) -> Self {
        Lexer { input, cursor: 0 }
    }

    /// Get the next significant token; `EndOfInput` once the input is exhausted
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let rest = &self.input[self.cursor..];
            if rest.is_empty() {
                return Ok(Token {
                    kind: TokenKind::EndOfInput,
                    text: String::new(),
                    position: self.cursor,
                });
            }

            let Some((len, kind)) = RULES
                .iter()
                .find_map(|rule| (rule.matcher)(rest).map(|len| (len, rule.kind)))
            else {
                return Err(LexError {
                    position: self.cursor,
                    prefix: rest.chars().take(ERROR_PREFIX_CHARS).collect(),
                });
            };

            let position = self.cursor;
            self.cursor += len;
            if let Some(kind) = kind {
                return Ok(Token {
                    kind,
                    text: rest[..len].to_string(),
                    position,
                });
            }
        }
    }

    /// Materialize the full token stream, terminated by `EndOfInput`
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_end = token.kind == TokenKind::EndOfInput;
            tokens.push(token);
            if is_end {
                return Ok(tokens);
            }
        }
    }
}

/// Tokenize a whole query
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).tokenize()
}
