//! Emission of predicates as JSON operator documents for ArangoDB.

use bson::Bson;
use serde_json::{Map, Value, json};

use docfilter_core::{
    emit::{Connective, Emitter},
    predicate::Operator,
};

use crate::json::to_json;


/// Wraps a field condition as `{field: condition}`.
fn field_condition(field: &str, condition: Value) -> Value {
    let mut object = Map::new();
    object.insert(field.to_string(), condition);
    Value::Object(object)
}

/// Translates predicates into JSON operator documents.
///
/// The documents have the same shape as MongoDB's, with every value reduced
/// to plain JSON. ArangoDB does not distinguish scalar from list-valued
/// fields in these conditions, so multiplicity needs no handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

impl JsonEmitter {
    pub fn new() -> Self {
        JsonEmitter
    }
}

impl Emitter for JsonEmitter {
    type Output = Value;

    fn emit_compare(&mut self, field: &str, op: Operator, value: &Bson, _multiple: bool) -> Value {
        let mut condition = Map::new();
        condition.insert(op.query_key().to_string(), to_json(value));
        field_condition(field, Value::Object(condition))
    }

    fn emit_range(&mut self, field: &str, lo: &Bson, hi: &Bson, _multiple: bool) -> Value {
        field_condition(field, json!({ "$gte": to_json(lo), "$lte": to_json(hi) }))
    }

    fn emit_bool(&mut self, connective: Connective, operands: Vec<Value>) -> Value {
        match connective {
            Connective::And | Connective::Or if operands.is_empty() => json!({}),
            Connective::And => json!({ "$and": operands }),
            Connective::Or => json!({ "$or": operands }),
            Connective::Not => json!({ "$nor": operands }),
        }
    }
}
