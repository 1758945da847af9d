//! SQL text fragments and the fully parenthesized comparison language.
//!
//! Two string newtypes keep identifiers and finished SQL apart: a [`Name`]
//! is an atomic identifier, an [`Expr`] is an arbitrary fragment of
//! rendered SQL. [`CompareExpr`] builds WHERE/JOIN conditions out of
//! either: every combination wraps the whole combined expression in a
//! single pair of parentheses, so operator precedence never depends on
//! nesting depth. The output is verbose, but unambiguous.

use std::fmt;

use crate::datatype::{Timestamp, Value};

/// Strips one trailing statement delimiter, so a finished statement can be
/// embedded as a sub-expression.
fn strip_delimiter(fragment: &str) -> &str {
    fragment.strip_suffix(';').unwrap_or(fragment)
}

// ------------- Name -------------

/// A trimmed SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Name {
    value: String,
}

impl Name {
    pub fn new(value: impl Into<String>) -> Self {
        Name {
            value: value.into().trim().to_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}
impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// ------------- Expr -------------

/// A trimmed fragment of rendered SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Expr {
    value: String,
}

impl Expr {
    pub fn new(value: impl Into<String>) -> Self {
        Expr {
            value: value.into().trim().to_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::new(value)
    }
}
impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::new(value)
    }
}
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// ------------- Comparison expressions -------------

/// An immutable, rendered boolean or relational condition.
///
/// Raw fragments are trimmed, stripped of a trailing `;` and wrapped in
/// parentheses. A bare [`Name`] stays unparenthesized, since identifiers
/// are atomic. Native values become quoted literals, so `'NULL'` as a
/// keyword has to go through `Name::new("NULL")`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompareExpr {
    expr: String,
}

impl CompareExpr {
    /// The empty condition; emitted clauses are skipped for it.
    pub fn empty() -> Self {
        CompareExpr::default()
    }

    /// Wraps an arbitrary fragment. An embedded sub-select loses its
    /// trailing `;` before nesting.
    pub fn raw(fragment: impl AsRef<str>) -> Self {
        let trimmed = fragment.as_ref().trim();
        if trimmed.is_empty() {
            return CompareExpr::default();
        }
        CompareExpr {
            expr: format!("({})", strip_delimiter(trimmed)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    fn binary(&self, op: &str, second: &CompareExpr) -> Self {
        CompareExpr::raw(format!("{} {} {}", self.expr, op, second.expr))
    }

    pub fn gt(&self, second: impl Into<CompareExpr>) -> Self {
        self.binary(">", &second.into())
    }

    pub fn lt(&self, second: impl Into<CompareExpr>) -> Self {
        self.binary("<", &second.into())
    }

    pub fn eq(&self, second: impl Into<CompareExpr>) -> Self {
        self.binary("=", &second.into())
    }

    pub fn ne(&self, second: impl Into<CompareExpr>) -> Self {
        self.binary("<>", &second.into())
    }

    pub fn and(&self, second: impl Into<CompareExpr>) -> Self {
        self.binary("AND", &second.into())
    }

    pub fn is_in(&self, second: impl Into<CompareExpr>) -> Self {
        self.binary("IN", &second.into())
    }

    pub fn not(&self) -> Self {
        CompareExpr::raw(format!("NOT {}", self.expr))
    }
}

impl fmt::Display for CompareExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl From<Name> for CompareExpr {
    fn from(name: Name) -> Self {
        CompareExpr {
            expr: name.as_str().to_owned(),
        }
    }
}
impl From<&Name> for CompareExpr {
    fn from(name: &Name) -> Self {
        name.clone().into()
    }
}
impl From<Expr> for CompareExpr {
    fn from(expr: Expr) -> Self {
        CompareExpr::raw(expr.as_str())
    }
}
impl From<&Expr> for CompareExpr {
    fn from(expr: &Expr) -> Self {
        CompareExpr::raw(expr.as_str())
    }
}
impl From<Value> for CompareExpr {
    fn from(value: Value) -> Self {
        CompareExpr::raw(value.sql_literal())
    }
}

impl From<bool> for CompareExpr {
    fn from(value: bool) -> Self {
        Value::from(value).into()
    }
}
impl From<i32> for CompareExpr {
    fn from(value: i32) -> Self {
        Value::from(value).into()
    }
}
impl From<i64> for CompareExpr {
    fn from(value: i64) -> Self {
        Value::from(value).into()
    }
}
impl From<f32> for CompareExpr {
    fn from(value: f32) -> Self {
        Value::from(value).into()
    }
}
impl From<f64> for CompareExpr {
    fn from(value: f64) -> Self {
        Value::from(value).into()
    }
}
impl From<Timestamp> for CompareExpr {
    fn from(value: Timestamp) -> Self {
        Value::from(value).into()
    }
}
impl From<&str> for CompareExpr {
    fn from(value: &str) -> Self {
        Value::from(value).into()
    }
}
impl From<String> for CompareExpr {
    fn from(value: String) -> Self {
        Value::from(value).into()
    }
}
