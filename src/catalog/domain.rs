// Column Domain Module
//
// This module defines the column domains (integer, bounded string, date), the
// values they hold, and the per-domain parse/validate/compare/arithmetic rules.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::error::{DomainSyntaxError, DomainValueError, EvalError};
use crate::query::parser::ast::{ArithOp, CompareOp};

/// Textual date layout used by data files; query literals use `\` instead of `/`
const DATE_FORMAT: &str = "%d/%m/%Y";

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

/// The shape of a value, independent of domain configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Text,
    Date,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Text(_) => ValueKind::Text,
            Value::Date(_) => ValueKind::Date,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "integer",
            ValueKind::Text => "string",
            ValueKind::Date => "date",
        };
        f.write_str(name)
    }
}

/// Parse a `day/month/year` date; `\` is accepted as separator as well
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let normalized = text.trim().replace('\\', "/");
    NaiveDate::parse_from_str(&normalized, DATE_FORMAT).ok()
}

/// Column domain. Each variant owns its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Domain {
    Integer,
    VarChar { max_len: usize },
    Date,
}

impl Domain {
    /// Stable keyword of the domain, as used in declarations
    pub fn name(&self) -> &'static str {
        match self {
            Domain::Integer => "integer",
            Domain::VarChar { .. } => "varchar",
            Domain::Date => "date",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Domain::Integer => ValueKind::Integer,
            Domain::VarChar { .. } => ValueKind::Text,
            Domain::Date => ValueKind::Date,
        }
    }

    /// The narrowest domain able to hold `value`; used when a literal drives arithmetic
    pub fn of_value(value: &Value) -> Domain {
        match value {
            Value::Integer(_) => Domain::Integer,
            Value::Text(s) => Domain::VarChar { max_len: s.chars().count() },
            Value::Date(_) => Domain::Date,
        }
    }

    /// Parse raw text into a value of this domain
    pub fn parse_value(&self, text: &str) -> Result<Value, DomainValueError> {
        match self {
            Domain::Integer => text
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| DomainValueError::new(self.to_string(), text, format!("not a valid integer ({})", e))),
            Domain::VarChar { max_len } => {
                if text.chars().count() <= *max_len {
                    Ok(Value::Text(text.to_string()))
                } else {
                    Err(DomainValueError::new(
                        self.to_string(),
                        text,
                        format!("value exceeds max length ({})", max_len),
                    ))
                }
            }
            Domain::Date => parse_date(text).map(Value::Date).ok_or_else(|| {
                DomainValueError::new(self.to_string(), text, "not a valid date, expected day/month/year")
            }),
        }
    }

    /// Whether an already-typed value belongs to this domain
    pub fn can_validate(&self, value: &Value) -> bool {
        match (self, value) {
            (Domain::Integer, Value::Integer(_)) => true,
            (Domain::VarChar { max_len }, Value::Text(s)) => s.chars().count() <= *max_len,
            (Domain::Date, Value::Date(_)) => true,
            _ => false,
        }
    }

    /// Ordering of two values under this domain. Strings compare case-folded.
    /// `None` when either value is of a foreign kind.
    fn ordering(&self, lhs: &Value, rhs: &Value) -> Option<Ordering> {
        match (self, lhs, rhs) {
            (Domain::Integer, Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Domain::VarChar { .. }, Value::Text(a), Value::Text(b)) => {
                Some(a.to_lowercase().cmp(&b.to_lowercase()))
            }
            (Domain::Date, Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn compare_eq(&self, lhs: &Value, rhs: &Value) -> bool {
        self.ordering(lhs, rhs) == Some(Ordering::Equal)
    }

    pub fn compare_neq(&self, lhs: &Value, rhs: &Value) -> bool {
        matches!(self.ordering(lhs, rhs), Some(Ordering::Less | Ordering::Greater))
    }

    pub fn compare_ge(&self, lhs: &Value, rhs: &Value) -> bool {
        matches!(self.ordering(lhs, rhs), Some(Ordering::Greater | Ordering::Equal))
    }

    pub fn compare_le(&self, lhs: &Value, rhs: &Value) -> bool {
        matches!(self.ordering(lhs, rhs), Some(Ordering::Less | Ordering::Equal))
    }

    pub fn compare_gt(&self, lhs: &Value, rhs: &Value) -> bool {
        self.ordering(lhs, rhs) == Some(Ordering::Greater)
    }

    pub fn compare_lt(&self, lhs: &Value, rhs: &Value) -> bool {
        self.ordering(lhs, rhs) == Some(Ordering::Less)
    }

    /// Dispatch a comparison operator to the matching primitive
    pub fn compare(&self, op: CompareOp, lhs: &Value, rhs: &Value) -> bool {
        match op {
            CompareOp::Equals => self.compare_eq(lhs, rhs),
            CompareOp::NotEquals => self.compare_neq(lhs, rhs),
            CompareOp::GreaterEquals => self.compare_ge(lhs, rhs),
            CompareOp::LessEquals => self.compare_le(lhs, rhs),
            CompareOp::Greater => self.compare_gt(lhs, rhs),
            CompareOp::Less => self.compare_lt(lhs, rhs),
        }
    }

    /// Apply an arithmetic operator with this domain governing the left operand
    pub fn arithmetic(&self, op: ArithOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
        let rendered = || format!("{} {} {}", lhs, op, rhs);
        match (self, lhs, rhs) {
            (Domain::Integer, Value::Integer(a), Value::Integer(b)) => {
                let (a, b) = (*a, *b);
                if matches!(op, ArithOp::Divide | ArithOp::Modulo) && b == 0 {
                    return Err(EvalError::DivisionByZero(rendered()));
                }
                let result = match op {
                    ArithOp::Add => a.checked_add(b),
                    ArithOp::Subtract => a.checked_sub(b),
                    ArithOp::Multiply => a.checked_mul(b),
                    ArithOp::Divide => a.checked_div(b),
                    ArithOp::Modulo => a.checked_rem(b),
                };
                result.map(Value::Integer).ok_or_else(|| EvalError::Overflow(rendered()))
            }
            (Domain::VarChar { .. }, Value::Text(a), Value::Text(b)) if op == ArithOp::Add => {
                Ok(Value::Text(format!("{}{}", a, b)))
            }
            (Domain::Date, Value::Date(d), Value::Integer(days))
                if matches!(op, ArithOp::Add | ArithOp::Subtract) =>
            {
                let forward = (op == ArithOp::Add) == (*days >= 0);
                let delta = Days::new(days.unsigned_abs());
                let shifted = if forward { d.checked_add_days(delta) } else { d.checked_sub_days(delta) };
                shifted.map(Value::Date).ok_or_else(|| EvalError::DateOutOfRange(rendered()))
            }
            (Domain::Date, Value::Date(a), Value::Date(b)) if op == ArithOp::Subtract => {
                Ok(Value::Integer((*a - *b).num_days()))
            }
            _ => Err(EvalError::UnsupportedOperation {
                op: op.to_string(),
                lhs: lhs.kind().to_string(),
                rhs: rhs.kind().to_string(),
            }),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::VarChar { max_len } => write!(f, "{}({})", self.name(), max_len),
            _ => f.write_str(self.name()),
        }
    }
}

/// Parse a domain declaration such as `integer`, `date` or `varchar(40)`
pub fn parse_domain(declaration: &str) -> Result<Domain, DomainSyntaxError> {
    let declaration = declaration.trim();
    let lowered = declaration.to_ascii_lowercase();

    match lowered.as_str() {
        "integer" => return Ok(Domain::Integer),
        "date" => return Ok(Domain::Date),
        _ => {}
    }

    let Some(lparen) = lowered.find('(') else {
        return Err(DomainSyntaxError::UnknownDomain(declaration.to_string()));
    };
    if !lowered.ends_with(')') {
        return Err(DomainSyntaxError::UnclosedParentheses(declaration.to_string()));
    }

    let keyword = lowered[..lparen].trim();
    let argument = declaration[lparen + 1..declaration.len() - 1].trim();
    match keyword {
        "varchar" => argument
            .parse::<usize>()
            .map(|max_len| Domain::VarChar { max_len })
            .map_err(|_| DomainSyntaxError::InvalidArgument {
                domain: keyword.to_string(),
                argument: argument.to_string(),
            }),
        _ => Err(DomainSyntaxError::UnknownDomain(declaration.to_string())),
    }
}

impl FromStr for Domain {
    type Err = DomainSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_domain(s)
    }
}
