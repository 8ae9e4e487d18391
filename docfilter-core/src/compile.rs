//! The backend-independent half of the compile pipeline.
//!
//! [`compile_predicate`] parses an expression and builds its [`Predicate`];
//! [`emit_with`] hands the predicate to any [`Emitter`].

use tracing::debug;

use crate::{
    config::FieldPolicy,
    emit::Emitter,
    error::FilterResult,
    metadata::ModelMetadata,
    parser::parse,
    predicate::{Predicate, PredicateBuilder},
};


/// Parses `expr` and builds its predicate against `metadata`.
///
/// An empty or whitespace-only expression selects everything and yields
/// [`Predicate::match_all`].
///
/// ```
/// use docfilter_core::{
///     compile::compile_predicate,
///     config::FieldPolicy,
///     metadata::{FieldMeta, ModelMetadata},
///     predicate::{Operator, Predicate},
/// };
///
/// let metadata = ModelMetadata::builder().field("age", FieldMeta::new()).build();
///
/// let predicate = compile_predicate("age > 30", &metadata, FieldPolicy::Permissive).unwrap();
/// assert_eq!(predicate, Predicate::compare("age", Operator::Gt, 30_i64));
///
/// let everything = compile_predicate("  ", &metadata, FieldPolicy::Permissive).unwrap();
/// assert!(everything.is_match_all());
/// ```
pub fn compile_predicate(expr: &str, metadata: &ModelMetadata, policy: FieldPolicy) -> FilterResult<Predicate> {
    if expr.trim().is_empty() {
        return Ok(Predicate::match_all());
    }

    let node = parse(expr).inspect_err(|e| {
        debug!(expr, offset = e.offset, error = %e.message, "failed to parse filter expression");
    })?;

    PredicateBuilder::new(metadata, policy).build(&node)
}

/// Compiles `expr` and emits it with `emitter`.
pub fn emit_with<E: Emitter>(
    emitter: &mut E,
    expr: &str,
    metadata: &ModelMetadata,
    policy: FieldPolicy,
) -> FilterResult<E::Output> {
    let predicate = compile_predicate(expr, metadata, policy)?;
    Ok(emitter.emit(&predicate, metadata))
}
