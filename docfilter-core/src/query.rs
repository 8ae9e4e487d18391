//! Result shaping for executing compiled filters.
//!
//! A compiled filter only selects documents. [`FindOptions`] adds the paging and
//! ordering the execution adapters apply on top of it:
//!
//! ```
//! use docfilter_core::query::{FindOptions, SortDirection};
//!
//! let options = FindOptions::builder()
//!     .skip(20)
//!     .limit(10)
//!     .sort("lastname", SortDirection::Asc)
//!     .build();
//!
//! assert_eq!(options.skip, Some(20));
//! assert_eq!(options.sort.unwrap().field, "lastname");
//! ```

use serde::{Deserialize, Serialize};


/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    #[default]
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl SortDirection {
    /// The sign MongoDB-style sort documents use for this direction.
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// The field to sort by. Dotted paths address embedded fields.
    pub field: String,
    pub direction: SortDirection,
}

/// Paging and ordering applied to the documents a filter selects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindOptions {
    /// Number of documents to skip.
    pub skip: Option<u64>,
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
    pub sort: Option<Sort>,
}

impl FindOptions {
    pub fn new() -> Self {
        FindOptions::default()
    }

    pub fn builder() -> FindOptionsBuilder {
        FindOptionsBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FindOptionsBuilder {
    options: FindOptions,
}

impl FindOptionsBuilder {
    pub fn new() -> Self {
        FindOptionsBuilder { options: FindOptions::default() }
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.options.skip = Some(skip);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: u64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Sets the field and direction results are ordered by.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.options.sort = Some(Sort { field: field.into(), direction });
        self
    }

    pub fn build(self) -> FindOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_with_defaults() {
        let options: FindOptions =
            serde_json::from_str(r#"{"limit": 5, "sort": {"field": "age", "direction": "desc"}}"#).unwrap();
        assert_eq!(options.skip, None);
        assert_eq!(options.limit, Some(5));
        assert_eq!(
            options.sort,
            Some(Sort { field: "age".into(), direction: SortDirection::Desc })
        );
        assert_eq!(SortDirection::Desc.as_i32(), -1);
    }
}
