//! Emits predicates as composable [`RowExpr`] objects.

use bson::Bson;
use regex::Regex;
use tracing::warn;

use docfilter_core::{
    emit::{Connective, Emitter, MultiplicityPolicy},
    predicate::Operator,
};

use crate::row::{RowExpr, RowTerm, any, element, row};


/// The predicate-object emitter.
///
/// Conditions on list-valued fields are written against the list element and
/// wrapped in [`any`]. `!=` on such a field means "no element equals the value",
/// matching the document-operator backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowEmitter;

impl RowEmitter {
    pub fn new() -> Self {
        RowEmitter
    }

    fn leaf(&self, term: RowTerm, op: Operator, value: &Bson) -> RowExpr {
        match op {
            Operator::Eq => term.eq(value.clone()),
            Operator::Ne => term.ne(value.clone()),
            Operator::Lt => term.lt(value.clone()),
            Operator::Le => term.le(value.clone()),
            Operator::Gt => term.gt(value.clone()),
            Operator::Ge => term.ge(value.clone()),
            Operator::MemberOf => match value {
                Bson::Array(values) => term.member_of(values.iter().cloned()),
                other => term.eq(other.clone()),
            },
            Operator::Regex => {
                let pattern = match value {
                    Bson::String(pattern) => pattern.as_str(),
                    _ => "",
                };
                match Regex::new(pattern) {
                    Ok(regex) => term.matches(regex),
                    Err(e) => {
                        warn!(pattern, error = %e, "pattern does not compile, condition matches nothing");
                        RowExpr::Never
                    }
                }
            }
        }
    }
}

impl Emitter for RowEmitter {
    type Output = RowExpr;

    fn emit_compare(&mut self, field: &str, op: Operator, value: &Bson, multiple: bool) -> RowExpr {
        match (multiple, op) {
            (false, _) => self.leaf(row(field), op, value),
            (true, Operator::Ne) => any(field, element().eq(value.clone())).not(),
            (true, _) => any(field, self.leaf(element(), op, value)),
        }
    }

    fn emit_range(&mut self, field: &str, lo: &Bson, hi: &Bson, multiple: bool) -> RowExpr {
        let between = |term: RowTerm| term.clone().ge(lo.clone()).and(term.le(hi.clone()));

        if multiple {
            any(field, between(element()))
        } else {
            between(row(field))
        }
    }

    fn emit_bool(&mut self, connective: Connective, operands: Vec<RowExpr>) -> RowExpr {
        let operands = operands.into_iter();

        match connective {
            Connective::And => operands.reduce(RowExpr::and).unwrap_or(RowExpr::Always),
            Connective::Or => operands.reduce(RowExpr::or).unwrap_or(RowExpr::Always),
            Connective::Not => operands
                .reduce(RowExpr::and)
                .map_or(RowExpr::Never, RowExpr::not),
        }
    }

    fn multiplicity_policy(&self) -> MultiplicityPolicy {
        MultiplicityPolicy::AnyElement
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;
    use docfilter_core::{
        metadata::{FieldMeta, ModelMetadata},
        predicate::Predicate,
    };

    use super::*;

    fn metadata() -> ModelMetadata {
        ModelMetadata::builder()
            .field("age", FieldMeta::new())
            .field("tags", FieldMeta::new().multiple(true))
            .build()
    }

    fn emit(predicate: &Predicate) -> RowExpr {
        RowEmitter.emit(predicate, &metadata())
    }

    #[test]
    fn range_is_inclusive_conjunction() {
        let expr = emit(&Predicate::range("age", 18, 65));
        assert_eq!(expr, row("age").ge(18).and(row("age").le(65)));
        assert!(expr.matches(&doc! { "age": 18 }));
        assert!(expr.matches(&doc! { "age": 65 }));
        assert!(!expr.matches(&doc! { "age": 66 }));
    }

    #[test]
    fn multiple_fields_are_wrapped_in_any() {
        let expr = emit(&Predicate::compare("tags", Operator::Eq, "x"));
        assert_eq!(expr, any("tags", element().eq("x")));
        assert!(expr.matches(&doc! { "tags": ["a", "x"] }));
        assert!(!expr.matches(&doc! { "tags": ["a"] }));
    }

    #[test]
    fn ne_on_multiple_field_means_no_element_equals() {
        let expr = emit(&Predicate::compare("tags", Operator::Ne, "x"));
        assert_eq!(expr, any("tags", element().eq("x")).not());
        assert!(!expr.matches(&doc! { "tags": ["a", "x"] }));
        assert!(expr.matches(&doc! { "tags": ["a", "b"] }));
        assert!(expr.matches(&doc! {}));
    }

    #[test]
    fn connectives_fold_left() {
        let a = Predicate::compare("age", Operator::Gt, 1);
        let b = Predicate::compare("age", Operator::Gt, 2);
        let c = Predicate::compare("age", Operator::Gt, 3);
        assert_eq!(
            emit(&Predicate::And(vec![a.clone(), b.clone(), c])),
            row("age").gt(1).and(row("age").gt(2)).and(row("age").gt(3))
        );
        assert_eq!(emit(&Predicate::Or(vec![a])), row("age").gt(1));
        assert_eq!(emit(&Predicate::match_all()), RowExpr::Always);
        assert_eq!(emit(&Predicate::Or(vec![])), RowExpr::Always);
    }

    #[test]
    fn membership_and_patterns() {
        let expr = emit(&Predicate::compare(
            "age",
            Operator::MemberOf,
            Bson::Array(vec![Bson::Int64(1), Bson::Int64(2)]),
        ));
        assert!(expr.matches(&doc! { "age": 2 }));
        assert!(!expr.matches(&doc! { "age": 3 }));

        let expr = emit(&Predicate::compare("tags", Operator::Regex, "^ad"));
        assert!(expr.matches(&doc! { "tags": ["admin"] }));
        assert!(!expr.matches(&doc! { "tags": ["staff"] }));
    }
}
