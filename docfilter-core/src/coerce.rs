//! Coercion of literals to storage-ready values.
//!
//! A literal goes through the field's convert function first (raw text to
//! domain value) and then through its write function (domain value to storage
//! representation). Write functions expect typed domain values, so the order
//! is never reversed.

use bson::Bson;

use crate::{
    ast::Node,
    error::CoercionError,
    metadata::ModelMetadata,
};


/// Coerces a scalar literal for `field`.
///
/// Unknown fields and fields without mappings pass the literal through. Convert is
/// skipped for the empty string and write is skipped for `Null`.
pub fn coerce(field: &str, literal: &Bson, token: &str, metadata: &ModelMetadata) -> Result<Bson, CoercionError> {
    let Some(meta) = metadata.get(field) else {
        return Ok(literal.clone());
    };

    let failed = |message: String| CoercionError {
        field: field.to_string(),
        literal: token.to_string(),
        message,
    };

    let domain = match meta.convert_fn() {
        Some(convert) if !token.is_empty() => convert(token).map_err(|e| failed(e.to_string()))?,
        _ => literal.clone(),
    };

    match meta.write_fn() {
        Some(write) if domain != Bson::Null => write(domain).map_err(|e| failed(e.to_string())),
        _ => Ok(domain),
    }
}

/// Coerces a literal node for `field`. Lists and tuples are coerced element-wise
/// into an array.
pub fn coerce_node(field: &str, node: &Node, metadata: &ModelMetadata) -> Result<Option<Bson>, CoercionError> {
    match node {
        Node::List(items) | Node::Tuple(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match coerce_node(field, item, metadata)? {
                    Some(value) => values.push(value),
                    None => return Ok(None),
                }
            }
            Ok(Some(Bson::Array(values)))
        }
        _ => match (node.literal_value(), node.token_text()) {
            (Some(literal), Some(token)) => coerce(field, &literal, &token, metadata).map(Some),
            _ => Ok(None),
        },
    }
}
