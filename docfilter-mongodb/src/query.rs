//! Emission of predicates as MongoDB query documents.

use bson::{Bson, Document, doc};

use docfilter_core::{
    emit::{Connective, Emitter},
    predicate::Operator,
};


/// Translates predicates into MongoDB query documents.
///
/// MongoDB applies scalar operators to every element of an array field, so
/// list-valued fields need no special treatment. Negation is emitted as
/// `$nor`, since `$not` is only valid inside a field condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentEmitter;

impl DocumentEmitter {
    pub fn new() -> Self {
        DocumentEmitter
    }
}

impl Emitter for DocumentEmitter {
    type Output = Document;

    fn emit_compare(&mut self, field: &str, op: Operator, value: &Bson, _multiple: bool) -> Document {
        let key = op.query_key();
        doc! { field: { key: value.clone() } }
    }

    fn emit_range(&mut self, field: &str, lo: &Bson, hi: &Bson, _multiple: bool) -> Document {
        doc! { field: { "$gte": lo.clone(), "$lte": hi.clone() } }
    }

    fn emit_bool(&mut self, connective: Connective, operands: Vec<Document>) -> Document {
        match connective {
            Connective::And | Connective::Or if operands.is_empty() => doc! {},
            Connective::And => doc! { "$and": operands },
            Connective::Or => doc! { "$or": operands },
            Connective::Not => doc! { "$nor": operands },
        }
    }
}

#[cfg(test)]
mod tests {
    use docfilter_core::{
        compile::emit_with,
        config::FieldPolicy,
        metadata::{FieldMeta, ModelMetadata},
        predicate::Predicate,
    };

    use super::*;

    fn metadata() -> ModelMetadata {
        ModelMetadata::builder()
            .field("age", FieldMeta::new())
            .field("lastname", FieldMeta::new())
            .field("tags", FieldMeta::new().multiple(true))
            .build()
    }

    fn emit(expr: &str) -> Document {
        emit_with(&mut DocumentEmitter, expr, &metadata(), FieldPolicy::Permissive).unwrap()
    }

    #[test]
    fn conjunction_of_bounds() {
        assert_eq!(
            emit("age >= 18 and age <= 65"),
            doc! { "$and": [ { "age": { "$gte": 18_i64 } }, { "age": { "$lte": 65_i64 } } ] }
        );
    }

    #[test]
    fn tuple_range_is_one_condition() {
        assert_eq!(emit("age in (18, 65)"), doc! { "age": { "$gte": 18_i64, "$lte": 65_i64 } });
    }

    #[test]
    fn operators() {
        assert_eq!(emit("age != 3"), doc! { "age": { "$ne": 3_i64 } });
        assert_eq!(emit("age < 3"), doc! { "age": { "$lt": 3_i64 } });
        assert_eq!(emit("age > 3"), doc! { "age": { "$gt": 3_i64 } });
        assert_eq!(emit("lastname % '^Jo'"), doc! { "lastname": { "$regex": "^Jo" } });
        assert_eq!(emit("age in [1, 2, 3]"), doc! { "age": { "$in": [1_i64, 2_i64, 3_i64] } });
    }

    #[test]
    fn multiple_fields_use_native_semantics() {
        assert_eq!(emit("tags == 'x'"), doc! { "tags": { "$eq": "x" } });
        assert_eq!(emit("tags != 'x'"), doc! { "tags": { "$ne": "x" } });
    }

    #[test]
    fn negation_and_disjunction() {
        assert_eq!(
            emit("not age == 1 or lastname == 'Jones'"),
            doc! { "$or": [
                { "$nor": [ { "age": { "$eq": 1_i64 } } ] },
                { "lastname": { "$eq": "Jones" } },
            ] }
        );
    }

    #[test]
    fn match_all_is_empty_document() {
        assert_eq!(emit(""), doc! {});
        assert_eq!(emit("unknown == 1"), doc! {});
        assert_eq!(DocumentEmitter.emit(&Predicate::Or(vec![]), &metadata()), doc! {});
    }
}
