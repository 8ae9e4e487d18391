//! Evaluation of row expressions against BSON documents.
//!
//! Values are compared through [`Comparable`], which normalizes all numeric
//! types to `f64` so that an `Int32` column matches an `Int64` literal.

use std::{collections::HashMap, cmp::Ordering};
use bson::{Bson, Document, datetime::DateTime};

use crate::row::{Comparison, Operand, RowExpr};


/// Type-erased, comparable representation of BSON values.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    /// All integers and floats normalized to f64
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    /// Raw binary payloads (UUIDs), only comparable for equality
    Binary(&'a [u8]),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Binary(binary) => Comparable::Binary(&binary.bytes),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Binary(a), Comparable::Binary(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Resolves a possibly dotted field path inside a document.
pub(crate) fn resolve<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    if let Some(value) = document.get(path) {
        return Some(value);
    }

    let (head, rest) = path.split_once('.')?;
    match document.get(head)? {
        Bson::Document(embedded) => resolve(embedded, rest),
        _ => None,
    }
}

/// Evaluates row expressions against one document.
pub(crate) struct RowEvaluator<'a> {
    document: &'a Document,
}

impl<'a> RowEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&self, expr: &RowExpr) -> bool {
        self.eval(expr, None)
    }

    pub fn filter_documents<'d>(
        documents: impl IntoIterator<Item = &'d Document>,
        expr: &RowExpr,
    ) -> Vec<&'d Document> {
        documents
            .into_iter()
            .filter(|doc| RowEvaluator::new(doc).evaluate(expr))
            .collect::<Vec<_>>()
    }

    /// `element` is the list element bound by the innermost `any`.
    fn eval(&self, expr: &RowExpr, element: Option<&Bson>) -> bool {
        match expr {
            RowExpr::Always => true,
            RowExpr::Never => false,
            RowExpr::And(left, right) => self.eval(left, element) && self.eval(right, element),
            RowExpr::Or(left, right) => self.eval(left, element) || self.eval(right, element),
            RowExpr::Not(inner) => !self.eval(inner, element),
            RowExpr::Any { field, predicate } => match resolve(self.document, field) {
                Some(Bson::Array(items)) => items
                    .iter()
                    .any(|item| self.eval(predicate, Some(item))),
                // A scalar behaves as a one-element list.
                Some(scalar) => self.eval(predicate, Some(scalar)),
                None => false,
            },
            RowExpr::Compare { operand, op, value } => match self.operand(operand, element) {
                Some(actual) => compare(actual, *op, value),
                None => *op == Comparison::Ne,
            },
            RowExpr::Match { operand, pattern } => match self.operand(operand, element) {
                Some(Bson::String(text)) => pattern.regex().is_match(text),
                _ => false,
            },
            RowExpr::MemberOf { operand, values } => match self.operand(operand, element) {
                Some(actual) => {
                    let actual = Comparable::from(actual);
                    values.iter().any(|value| Comparable::from(value) == actual)
                }
                None => false,
            },
        }
    }

    fn operand<'b>(&'b self, operand: &Operand, element: Option<&'b Bson>) -> Option<&'b Bson> {
        match operand {
            Operand::Field(path) => resolve(self.document, path),
            Operand::Element => element,
        }
    }
}

fn compare(actual: &Bson, op: Comparison, expected: &Bson) -> bool {
    let (left, right) = (Comparable::from(actual), Comparable::from(expected));

    match op {
        Comparison::Eq => left == right,
        Comparison::Ne => left != right,
        Comparison::Lt | Comparison::Le | Comparison::Gt | Comparison::Ge => match left.partial_cmp(&right) {
            Some(ordering) => match op {
                Comparison::Lt => ordering == Ordering::Less,
                Comparison::Le => ordering != Ordering::Greater,
                Comparison::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            },
            None => false,
        },
    }
}

/// Orders two optional values for sorting; incomparable values are equal.
pub(crate) fn sort_order(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let left = left.map(Comparable::from).unwrap_or(Comparable::Null);
    let right = right.map(Comparable::from).unwrap_or(Comparable::Null);

    match (&left, &right) {
        (Comparable::Null, Comparable::Null) => Ordering::Equal,
        (Comparable::Null, _) => Ordering::Less,
        (_, Comparable::Null) => Ordering::Greater,
        _ => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
    }
}
