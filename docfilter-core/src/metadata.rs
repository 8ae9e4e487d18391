//! Field metadata consumed by the filter compiler.
//!
//! A [`ModelMetadata`] maps field names to [`FieldMeta`]: the functions that
//! turn a literal from a filter expression into a typed value and then into
//! its storage representation, plus whether the field holds a list of values.
//!
//! Metadata is built once by the schema layer and only read afterwards, so a
//! single instance can be shared by any number of concurrent compilations.
//!
//! # Example
//!
//! ```
//! use docfilter_core::metadata::{FieldMeta, ModelMetadata};
//! use docfilter_core::atom::{Atom, Storage};
//!
//! let metadata = ModelMetadata::builder()
//!     .field("lastname", FieldMeta::new())
//!     .field("birthyear", Atom::Integer.field_meta(Storage::Native))
//!     .field("tags", FieldMeta::new().multiple(true))
//!     .build();
//!
//! assert!(metadata.get("tags").unwrap().is_multiple());
//! assert!(metadata.get("unknown").is_none());
//! ```

use std::{collections::HashMap, error::Error, fmt, sync::Arc};

use bson::Bson;


/// Error type returned by convert and write functions.
pub type CoercionFnError = Box<dyn Error + Send + Sync>;

/// Maps the raw text of a literal to a typed domain value.
pub type ConvertFn = Arc<dyn Fn(&str) -> Result<Bson, CoercionFnError> + Send + Sync>;

/// Maps a typed domain value to its storage representation.
pub type WriteFn = Arc<dyn Fn(Bson) -> Result<Bson, CoercionFnError> + Send + Sync>;

/// Coercion functions and multiplicity of one field.
#[derive(Clone, Default)]
pub struct FieldMeta {
    convert: Option<ConvertFn>,
    write: Option<WriteFn>,
    multiple: bool,
}

impl FieldMeta {
    /// A scalar field without coercion functions. Literals pass through unchanged.
    pub fn new() -> Self {
        FieldMeta::default()
    }

    /// Sets the function converting raw literal text to a domain value.
    pub fn convert<F>(mut self, convert: F) -> Self
    where
        F: Fn(&str) -> Result<Bson, CoercionFnError> + Send + Sync + 'static,
    {
        self.convert = Some(Arc::new(convert));
        self
    }

    /// Sets the function converting a domain value to its storage representation.
    pub fn write<F>(mut self, write: F) -> Self
    where
        F: Fn(Bson) -> Result<Bson, CoercionFnError> + Send + Sync + 'static,
    {
        self.write = Some(Arc::new(write));
        self
    }

    /// Marks the field as holding zero or more values.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn convert_fn(&self) -> Option<&ConvertFn> {
        self.convert.as_ref()
    }

    pub fn write_fn(&self) -> Option<&WriteFn> {
        self.write.as_ref()
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }
}

impl fmt::Debug for FieldMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMeta")
            .field("convert", &self.convert.is_some())
            .field("write", &self.write.is_some())
            .field("multiple", &self.multiple)
            .finish()
    }
}

/// Field metadata of one model, keyed by field name.
///
/// Embedded fields are registered under their dotted path (`address.city`).
#[derive(Debug, Clone, Default)]
pub struct ModelMetadata {
    fields: HashMap<String, FieldMeta>,
}

impl ModelMetadata {
    pub fn new() -> Self {
        ModelMetadata::default()
    }

    pub fn builder() -> ModelMetadataBuilder {
        ModelMetadataBuilder::default()
    }

    /// Looks up the metadata of a field.
    pub fn get(&self, field: &str) -> Option<&FieldMeta> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns `true` if the field is known and list-valued.
    pub fn is_multiple(&self, field: &str) -> bool {
        self.get(field).is_some_and(FieldMeta::is_multiple)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldMeta)> for ModelMetadata {
    fn from_iter<I: IntoIterator<Item = (String, FieldMeta)>>(iter: I) -> Self {
        ModelMetadata { fields: iter.into_iter().collect() }
    }
}

#[derive(Debug, Default)]
pub struct ModelMetadataBuilder {
    fields: HashMap<String, FieldMeta>,
}

impl ModelMetadataBuilder {
    /// Registers a field. A later registration of the same name replaces the earlier one.
    pub fn field(mut self, name: impl Into<String>, meta: FieldMeta) -> Self {
        self.fields.insert(name.into(), meta);
        self
    }

    pub fn build(self) -> ModelMetadata {
        ModelMetadata { fields: self.fields }
    }
}
