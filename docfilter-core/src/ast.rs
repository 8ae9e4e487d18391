//! Abstract syntax tree for filter expressions.
//!
//! The tree is closed: every construct the restricted grammar accepts has
//! exactly one variant in [`Node`], so translation is an exhaustive `match`.

use std::fmt;

use bson::Bson;


/// Comparison operators accepted between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::In => "in",
        })
    }
}

/// Boolean connectives joining comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// Binary operators other than comparisons. Only regex matching (`%`) exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Match,
}

/// A numeric literal. Integers stay integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Float(value) => write!(f, "{value}"),
        }
    }
}

/// A node of a parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A field name.
    Identifier(String),
    String(String),
    /// A numeric literal and its text as written.
    Number(Number, String),
    Bool(bool),
    /// `[a, b, ...]`
    List(Vec<Node>),
    /// `(a, b, ...)`; a two-element tuple after `in` is a range.
    Tuple(Vec<Node>),
    /// `{"key": value, ...}`
    Dict(Vec<(String, Node)>),
    Compare {
        left: Box<Node>,
        op: CompareOp,
        right: Box<Node>,
    },
    BoolOp {
        op: BoolOp,
        operands: Vec<Node>,
    },
    BinOp {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },
    Not(Box<Node>),
}

impl Node {
    /// Returns `true` for scalar literals (strings, numbers and booleans).
    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::String(_) | Node::Number(..) | Node::Bool(_))
    }

    /// The source text of a scalar literal, as handed to a field's convert function.
    ///
    /// Strings yield their unquoted content, numbers the text they were written
    /// with and booleans `true` or `false`.
    pub fn token_text(&self) -> Option<String> {
        match self {
            Node::String(value) => Some(value.clone()),
            Node::Number(_, text) => Some(text.clone()),
            Node::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    /// The value of a scalar literal without any field-specific coercion.
    pub fn literal_value(&self) -> Option<Bson> {
        match self {
            Node::String(value) => Some(Bson::String(value.clone())),
            Node::Number(Number::Int(value), _) => Some(Bson::Int64(*value)),
            Node::Number(Number::Float(value), _) => Some(Bson::Double(*value)),
            Node::Bool(value) => Some(Bson::Boolean(*value)),
            _ => None,
        }
    }

    /// A short name for the kind of node, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Identifier(_) => "identifier",
            Node::String(_) => "string",
            Node::Number(..) => "number",
            Node::Bool(_) => "boolean",
            Node::List(_) => "list",
            Node::Tuple(_) => "tuple",
            Node::Dict(_) => "dict",
            Node::Compare { .. } => "comparison",
            Node::BoolOp { .. } => "boolean operation",
            Node::BinOp { .. } => "match operation",
            Node::Not(_) => "negation",
        }
    }
}
