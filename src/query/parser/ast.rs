// SQL Abstract Syntax Tree (AST) Implementation
//
// This module defines the AST nodes for representing parsed SQL queries:
// attribute references, arithmetic expression trees, predicates and the
// query itself.

use std::fmt;

use crate::catalog::domain::{Value, ValueKind};
use crate::catalog::error::EvalError;

/// Select-list item standing for every column
pub const WILDCARD: &str = "*";

/// Comparison operators usable in a WHERE predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    GreaterEquals,
    LessEquals,
    Greater,
    Less,
}

impl CompareOp {
    /// `!=` and `<>` both spell inequality
    pub fn from_symbol(symbol: &str) -> Option<CompareOp> {
        match symbol {
            "=" => Some(CompareOp::Equals),
            "!=" | "<>" => Some(CompareOp::NotEquals),
            ">=" => Some(CompareOp::GreaterEquals),
            "<=" => Some(CompareOp::LessEquals),
            ">" => Some(CompareOp::Greater),
            "<" => Some(CompareOp::Less),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Equals => "=",
            CompareOp::NotEquals => "!=",
            CompareOp::GreaterEquals => ">=",
            CompareOp::LessEquals => "<=",
            CompareOp::Greater => ">",
            CompareOp::Less => "<",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithOp {
    pub fn from_symbol(symbol: &str) -> Option<ArithOp> {
        match symbol {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Subtract),
            "*" => Some(ArithOp::Multiply),
            "/" => Some(ArithOp::Divide),
            "%" => Some(ArithOp::Modulo),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Subtract => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
            ArithOp::Modulo => "%",
        }
    }

    /// Binding strength: `*` `/` over `%` over `+` `-`
    pub fn precedence(&self) -> u8 {
        match self {
            ArithOp::Multiply | ArithOp::Divide => 3,
            ArithOp::Modulo => 2,
            ArithOp::Add | ArithOp::Subtract => 1,
        }
    }

    /// Static counterpart of `Domain::arithmetic`
    pub fn result_kind(&self, lhs: ValueKind, rhs: ValueKind) -> Result<ValueKind, EvalError> {
        use ValueKind::*;
        match (lhs, self, rhs) {
            (Integer, _, Integer) => Ok(Integer),
            (Text, ArithOp::Add, Text) => Ok(Text),
            (Date, ArithOp::Add | ArithOp::Subtract, Integer) => Ok(Date),
            (Date, ArithOp::Subtract, Date) => Ok(Integer),
            _ => Err(EvalError::UnsupportedOperation {
                op: self.to_string(),
                lhs: lhs.to_string(),
                rhs: rhs.to_string(),
            }),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Column reference, resolved against a schema only at evaluation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Attribute { name: name.into() }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Leaf of an arithmetic expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Attribute(Attribute),
    Literal(Value),
}

/// Index of a node inside its `MathExpr`
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprNode {
    Operand(Operand),
    /// Parenthesised sub-expression; opaque to precedence splicing
    Group(NodeId),
    Binary {
        op: ArithOp,
        left: NodeId,
        right: NodeId,
    },
}

/// Arithmetic expression tree stored in an arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathExpr {
    nodes: Vec<ExprNode>,
    root: NodeId,
}

impl MathExpr {
    /// Expression made of a single operand
    pub fn operand(operand: Operand) -> Self {
        MathExpr {
            nodes: vec![ExprNode::Operand(operand)],
            root: 0,
        }
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self::operand(Operand::Attribute(Attribute::new(name)))
    }

    pub fn literal(value: Value) -> Self {
        Self::operand(Operand::Literal(value))
    }

    /// Wrap an expression so that later operators treat it as one operand
    pub fn group(inner: MathExpr) -> Self {
        let mut nodes = inner.nodes;
        nodes.push(ExprNode::Group(inner.root));
        let root = nodes.len() - 1;
        MathExpr { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ExprNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every attribute referenced by the expression
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.nodes.iter().filter_map(|node| match node {
            ExprNode::Operand(Operand::Attribute(attr)) => Some(attr),
            _ => None,
        })
    }

    /// Append `op rhs` to the expression read so far.
    ///
    /// Walks the right spine from the root while `op` binds tighter than the
    /// operator found there, then makes the subtree reached the left child of
    /// a new `op` node. Equal precedence stops the walk, so chains stay
    /// left-associative.
    pub fn extend(&mut self, op: ArithOp, rhs: MathExpr) {
        let rhs_root = self.graft(rhs);

        let mut parent = None;
        let mut cursor = self.root;
        while let ExprNode::Binary { op: current, right, .. } = &self.nodes[cursor] {
            if op.precedence() <= current.precedence() {
                break;
            }
            parent = Some(cursor);
            cursor = *right;
        }

        self.nodes.push(ExprNode::Binary {
            op,
            left: cursor,
            right: rhs_root,
        });
        let spliced = self.nodes.len() - 1;

        match parent {
            None => self.root = spliced,
            Some(parent) => {
                if let ExprNode::Binary { right, .. } = &mut self.nodes[parent] {
                    *right = spliced;
                }
            }
        }
    }

    /// Move another expression's nodes into this arena, returning its new root
    fn graft(&mut self, other: MathExpr) -> NodeId {
        let offset = self.nodes.len();
        self.nodes.extend(other.nodes.into_iter().map(|node| match node {
            ExprNode::Operand(operand) => ExprNode::Operand(operand),
            ExprNode::Group(inner) => ExprNode::Group(inner + offset),
            ExprNode::Binary { op, left, right } => ExprNode::Binary {
                op,
                left: left + offset,
                right: right + offset,
            },
        }));
        other.root + offset
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.nodes[id] {
            ExprNode::Operand(Operand::Attribute(attr)) => write!(f, "{}", attr),
            ExprNode::Operand(Operand::Literal(value)) => fmt_literal(value, f),
            ExprNode::Group(inner) => {
                f.write_str("(")?;
                self.fmt_node(*inner, f)?;
                f.write_str(")")
            }
            ExprNode::Binary { op, left, right } => {
                self.fmt_child(*left, f)?;
                write!(f, " {} ", op)?;
                self.fmt_child(*right, f)
            }
        }
    }

    fn fmt_child(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self.nodes[id], ExprNode::Binary { .. }) {
            f.write_str("(")?;
            self.fmt_node(id, f)?;
            f.write_str(")")
        } else {
            self.fmt_node(id, f)
        }
    }
}

/// Literals are rendered the way the query surface spells them
fn fmt_literal(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Integer(i) => write!(f, "{}", i),
        Value::Text(s) => write!(f, "'{}'", s),
        Value::Date(d) => write!(f, "{}", d.format("%d\\%m\\%Y")),
    }
}

impl fmt::Display for MathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}

/// `attribute op operand` filter condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub attribute: Attribute,
    pub op: CompareOp,
    pub operand: MathExpr,
}

impl Predicate {
    pub fn new(attribute: impl Into<String>, op: CompareOp, operand: MathExpr) -> Self {
        Predicate {
            attribute: Attribute::new(attribute),
            op,
            operand,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.op, self.operand)
    }
}

/// A parsed `SELECT ... FROM ... [WHERE ...]` query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Selected column names, or the single wildcard
    pub selected: Vec<String>,
    /// Source tables, joined left to right
    pub tables: Vec<String>,
    pub predicate: Option<Predicate>,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.selected.join(", "), self.tables.join(", "))?;
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        Ok(())
    }
}
