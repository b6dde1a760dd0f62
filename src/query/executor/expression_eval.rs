// Expression Evaluation Module
//
// This module binds arithmetic expressions and predicates against a schema
// and evaluates them row by row.

use crate::catalog::domain::{Domain, Value, ValueKind};
use crate::catalog::error::{DomainValueError, EvalError};
use crate::catalog::schema::Schema;
use crate::query::executor::result::QueryResult;
use crate::query::parser::ast::{ArithOp, CompareOp, ExprNode, MathExpr, NodeId, Operand, Predicate};

/// An expression whose attributes have been resolved to column positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundExpr {
    Column { position: usize, domain: Domain },
    Constant(Value),
    Binary {
        op: ArithOp,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
}

impl BoundExpr {
    /// Resolve every attribute of `expr` against `schema`.
    ///
    /// Operator support is checked statically, so a bound expression only
    /// fails at evaluation time on overflow, division by zero or date range.
    pub fn bind(expr: &MathExpr, schema: &Schema) -> QueryResult<Self> {
        let bound = Self::bind_node(expr, expr.root(), schema)?;
        bound.kind()?;
        Ok(bound)
    }

    fn bind_node(expr: &MathExpr, id: NodeId, schema: &Schema) -> QueryResult<Self> {
        match expr.node(id) {
            ExprNode::Operand(Operand::Attribute(attr)) => {
                let (position, domain) = schema.lookup(&attr.name)?;
                Ok(BoundExpr::Column {
                    position,
                    domain: domain.clone(),
                })
            }
            ExprNode::Operand(Operand::Literal(value)) => Ok(BoundExpr::Constant(value.clone())),
            ExprNode::Group(inner) => Self::bind_node(expr, *inner, schema),
            ExprNode::Binary { op, left, right } => Ok(BoundExpr::Binary {
                op: *op,
                left: Box::new(Self::bind_node(expr, *left, schema)?),
                right: Box::new(Self::bind_node(expr, *right, schema)?),
            }),
        }
    }

    /// Kind of the values this expression produces
    pub fn kind(&self) -> Result<ValueKind, EvalError> {
        match self {
            BoundExpr::Column { domain, .. } => Ok(domain.kind()),
            BoundExpr::Constant(value) => Ok(value.kind()),
            BoundExpr::Binary { op, left, right } => op.result_kind(left.kind()?, right.kind()?),
        }
    }

    /// True when no column is referenced
    pub fn is_constant(&self) -> bool {
        match self {
            BoundExpr::Column { .. } => false,
            BoundExpr::Constant(_) => true,
            BoundExpr::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
        }
    }

    /// Evaluate against one row of the bound schema
    pub fn evaluate(&self, row: &[Value]) -> Result<Value, EvalError> {
        match self {
            BoundExpr::Column { position, .. } => Ok(row[*position].clone()),
            BoundExpr::Constant(value) => Ok(value.clone()),
            BoundExpr::Binary { op, left, right } => {
                let lhs = left.evaluate(row)?;
                let rhs = right.evaluate(row)?;
                let domain = match left.as_ref() {
                    BoundExpr::Column { domain, .. } => domain.clone(),
                    _ => Domain::of_value(&lhs),
                };
                domain.arithmetic(*op, &lhs, &rhs)
            }
        }
    }

    /// Collapse a constant expression into its value
    pub fn fold(self) -> Result<BoundExpr, EvalError> {
        if self.is_constant() && !matches!(self, BoundExpr::Constant(_)) {
            return self.evaluate(&[]).map(BoundExpr::Constant);
        }
        Ok(self)
    }
}

impl MathExpr {
    /// Evaluate this expression for one row of `schema`
    pub fn evaluate(&self, schema: &Schema, row: &[Value]) -> QueryResult<Value> {
        Ok(BoundExpr::bind(self, schema)?.evaluate(row)?)
    }

    /// Kind produced by this expression when evaluated over `schema`
    pub fn infer_kind(&self, schema: &Schema) -> QueryResult<ValueKind> {
        Ok(BoundExpr::bind(self, schema)?.kind()?)
    }

    /// Value of the expression when it references no attribute
    pub fn constant(&self) -> QueryResult<Option<Value>> {
        if self.attributes().next().is_some() {
            return Ok(None);
        }
        let bound = BoundExpr::bind(self, &Schema::default())?;
        Ok(Some(bound.evaluate(&[])?))
    }
}

/// A predicate validated against a schema, ready to test rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundPredicate {
    position: usize,
    domain: Domain,
    op: CompareOp,
    operand: BoundExpr,
}

impl BoundPredicate {
    /// Resolve and validate `predicate` before any row is scanned.
    ///
    /// The operand must produce values of the column's kind; a constant
    /// operand is folded here and must be valid for the column's domain.
    pub fn bind(predicate: &Predicate, schema: &Schema) -> QueryResult<Self> {
        let (position, domain) = schema.lookup(&predicate.attribute.name)?;
        let operand = BoundExpr::bind(&predicate.operand, schema)?.fold()?;

        let kind = operand.kind()?;
        if kind != domain.kind() {
            return Err(DomainValueError::new(
                domain.to_string(),
                predicate.operand.to_string(),
                format!("cannot compare a {} operand with column \"{}\"", kind, predicate.attribute),
            )
            .into());
        }

        if let BoundExpr::Constant(value) = &operand {
            if !domain.can_validate(value) {
                return Err(match domain.parse_value(&value.to_string()) {
                    Err(e) => e,
                    Ok(_) => DomainValueError::new(domain.to_string(), value.to_string(), "value is not valid here"),
                }
                .into());
            }
        }

        Ok(BoundPredicate {
            position,
            domain: domain.clone(),
            op: predicate.op,
            operand,
        })
    }

    /// Whether `row` satisfies the predicate
    pub fn matches(&self, row: &[Value]) -> Result<bool, EvalError> {
        let cell = &row[self.position];
        match &self.operand {
            BoundExpr::Constant(value) => Ok(self.domain.compare(self.op, cell, value)),
            operand => Ok(self.domain.compare(self.op, cell, &operand.evaluate(row)?)),
        }
    }
}
