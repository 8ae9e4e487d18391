//! Composable row-predicate objects.
//!
//! A [`RowExpr`] is built the way a RethinkDB query is: start from a field with
//! [`row`], apply a comparison, and combine the results with
//! [`and`](RowExpr::and), [`or`](RowExpr::or) and [`not`](RowExpr::not).
//! List-valued fields are tested with [`any`], whose predicate is written
//! against the bound list [`element`].
//!
//! ```
//! use bson::doc;
//! use docfilter_memory::row::{any, element, row};
//!
//! let adult_dutch = row("age").ge(18).and(any("nationality", element().eq("NL")));
//!
//! assert!(adult_dutch.matches(&doc! { "age": 40, "nationality": ["BE", "NL"] }));
//! assert!(!adult_dutch.matches(&doc! { "age": 12, "nationality": ["NL"] }));
//! ```

use std::fmt;

use bson::{Bson, Document};
use regex::Regex;

use crate::evaluator::RowEvaluator;


/// Comparison operators of a row term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Eq => "eq",
            Comparison::Ne => "ne",
            Comparison::Lt => "lt",
            Comparison::Le => "le",
            Comparison::Gt => "gt",
            Comparison::Ge => "ge",
        }
    }
}

/// The value a comparison is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A field of the row, possibly a dotted path into embedded documents.
    Field(String),
    /// The list element bound by the enclosing [`RowExpr::Any`].
    Element,
}

/// A compiled regular expression, compared by its source pattern.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(regex: Regex) -> Self {
        Pattern(regex)
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A boolean condition over one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowExpr {
    /// Matches every row.
    Always,
    /// Matches no row.
    Never,
    Compare {
        operand: Operand,
        op: Comparison,
        value: Bson,
    },
    /// The operand is a string matching the pattern anywhere.
    Match {
        operand: Operand,
        pattern: Pattern,
    },
    /// The operand equals one of the values.
    MemberOf {
        operand: Operand,
        values: Vec<Bson>,
    },
    And(Box<RowExpr>, Box<RowExpr>),
    Or(Box<RowExpr>, Box<RowExpr>),
    Not(Box<RowExpr>),
    /// Some element of the list in `field` satisfies `predicate`.
    Any {
        field: String,
        predicate: Box<RowExpr>,
    },
}

impl RowExpr {
    pub fn and(self, other: RowExpr) -> RowExpr {
        RowExpr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: RowExpr) -> RowExpr {
        RowExpr::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> RowExpr {
        RowExpr::Not(Box::new(self))
    }

    /// Returns `true` if `document` satisfies this expression.
    pub fn matches(&self, document: &Document) -> bool {
        RowEvaluator::new(document).evaluate(self)
    }
}

/// Starts a condition on a field of the row.
pub fn row(field: impl Into<String>) -> RowTerm {
    RowTerm { operand: Operand::Field(field.into()) }
}

/// Starts a condition on the list element bound by [`any`].
pub fn element() -> RowTerm {
    RowTerm { operand: Operand::Element }
}

/// Matches rows where some element of the list in `field` satisfies `predicate`.
pub fn any(field: impl Into<String>, predicate: RowExpr) -> RowExpr {
    RowExpr::Any { field: field.into(), predicate: Box::new(predicate) }
}

/// An operand waiting for its comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTerm {
    operand: Operand,
}

impl RowTerm {
    pub fn compare(self, op: Comparison, value: impl Into<Bson>) -> RowExpr {
        RowExpr::Compare { operand: self.operand, op, value: value.into() }
    }

    pub fn eq(self, value: impl Into<Bson>) -> RowExpr {
        self.compare(Comparison::Eq, value)
    }

    pub fn ne(self, value: impl Into<Bson>) -> RowExpr {
        self.compare(Comparison::Ne, value)
    }

    pub fn lt(self, value: impl Into<Bson>) -> RowExpr {
        self.compare(Comparison::Lt, value)
    }

    pub fn le(self, value: impl Into<Bson>) -> RowExpr {
        self.compare(Comparison::Le, value)
    }

    pub fn gt(self, value: impl Into<Bson>) -> RowExpr {
        self.compare(Comparison::Gt, value)
    }

    pub fn ge(self, value: impl Into<Bson>) -> RowExpr {
        self.compare(Comparison::Ge, value)
    }

    pub fn matches(self, regex: Regex) -> RowExpr {
        RowExpr::Match { operand: self.operand, pattern: Pattern::new(regex) }
    }

    pub fn member_of(self, values: impl IntoIterator<Item = Bson>) -> RowExpr {
        RowExpr::MemberOf { operand: self.operand, values: values.into_iter().collect() }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(field) => write!(f, "row({field:?})"),
            Operand::Element => f.write_str("element"),
        }
    }
}

/// Renders the expression in combinator form, e.g.
/// `row("age").ge(18).and(any("tags", element.eq("x")))`.
impl fmt::Display for RowExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowExpr::Always => f.write_str("always"),
            RowExpr::Never => f.write_str("never"),
            RowExpr::Compare { operand, op, value } => write!(f, "{operand}.{}({value})", op.as_str()),
            RowExpr::Match { operand, pattern } => write!(f, "{operand}.match({:?})", pattern.as_str()),
            RowExpr::MemberOf { operand, values } => {
                write!(f, "{operand}.member_of({})", Bson::Array(values.clone()))
            }
            RowExpr::And(left, right) => write!(f, "{left}.and({right})"),
            RowExpr::Or(left, right) => write!(f, "{left}.or({right})"),
            RowExpr::Not(inner) => write!(f, "{inner}.not()"),
            RowExpr::Any { field, predicate } => write!(f, "any({field:?}, {predicate})"),
        }
    }
}
