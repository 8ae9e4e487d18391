//! Conversion of coerced BSON values to plain JSON.
//!
//! ArangoDB stores JSON only. Values that have no JSON counterpart are
//! rendered as strings: datetimes in RFC 3339, UUID binaries in their
//! hyphenated form, other binaries as lowercase hex.

use bson::{Bson, spec::BinarySubtype};
use serde_json::{Map, Number, Value};


/// Converts a BSON value to the JSON value an ArangoDB query compares against.
pub fn to_json(value: &Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(value) => Value::Bool(*value),
        Bson::Int32(value) => Value::from(*value),
        Bson::Int64(value) => Value::from(*value),
        Bson::Double(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
        Bson::String(value) => Value::String(value.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        Bson::Document(document) => Value::Object(
            document
                .iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect::<Map<_, _>>()
        ),
        Bson::DateTime(datetime) => match datetime.try_to_rfc3339_string() {
            Ok(text) => Value::String(text),
            Err(_) => Value::from(datetime.timestamp_millis()),
        },
        Bson::Binary(binary) => match (binary.subtype, binary.to_uuid()) {
            (BinarySubtype::Uuid, Ok(uuid)) => Value::String(uuid.to_string()),
            _ => Value::String(hex(&binary.bytes)),
        },
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        other => Value::String(other.to_string()),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
