//! The capability set every backend emitter implements.
//!
//! An [`Emitter`] turns a [`Predicate`] into one backend's native query
//! representation. Implementors supply the leaf and connective renderings and
//! declare how their backend treats list-valued fields; the provided
//! [`Emitter::emit`] walks the tree.
//!
//! # Example
//!
//! ```
//! use bson::Bson;
//! use docfilter_core::{
//!     emit::{Connective, Emitter},
//!     metadata::ModelMetadata,
//!     predicate::{Operator, Predicate},
//! };
//!
//! /// Counts the leaves of a predicate.
//! struct LeafCounter;
//!
//! impl Emitter for LeafCounter {
//!     type Output = usize;
//!
//!     fn emit_compare(&mut self, _: &str, _: Operator, _: &Bson, _: bool) -> usize { 1 }
//!     fn emit_range(&mut self, _: &str, _: &Bson, _: &Bson, _: bool) -> usize { 1 }
//!     fn emit_bool(&mut self, _: Connective, operands: Vec<usize>) -> usize {
//!         operands.into_iter().sum()
//!     }
//! }
//!
//! let predicate = Predicate::And(vec![
//!     Predicate::compare("a", Operator::Eq, 1),
//!     Predicate::range("b", 1, 2),
//! ]);
//! assert_eq!(LeafCounter.emit(&predicate, &ModelMetadata::new()), 2);
//! ```

use bson::Bson;

use crate::{
    metadata::ModelMetadata,
    predicate::{Operator, Predicate},
};


/// How a backend evaluates a scalar condition against a list-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiplicityPolicy {
    /// The backend applies scalar operators element-wise on its own.
    #[default]
    Native,
    /// The emitter must wrap the condition so that it holds for any element of the list.
    AnyElement,
}

/// Boolean connectives of emitted queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
    /// Always has exactly one operand.
    Not,
}

/// Translates predicates into one backend's query representation.
///
/// Emission cannot fail: every value in a predicate has already been coerced.
pub trait Emitter {
    type Output;

    /// Renders `field op value`.
    ///
    /// `multiple` is `true` only when the field is list-valued and the emitter's
    /// policy is [`MultiplicityPolicy::AnyElement`].
    fn emit_compare(&mut self, field: &str, op: Operator, value: &Bson, multiple: bool) -> Self::Output;

    /// Renders the inclusive range `lo <= field <= hi`.
    fn emit_range(&mut self, field: &str, lo: &Bson, hi: &Bson, multiple: bool) -> Self::Output;

    /// Combines already emitted operands. `And`/`Or` may receive zero operands,
    /// which must render as a query matching everything.
    fn emit_bool(&mut self, connective: Connective, operands: Vec<Self::Output>) -> Self::Output;

    fn multiplicity_policy(&self) -> MultiplicityPolicy {
        MultiplicityPolicy::Native
    }

    /// Emits a whole predicate tree.
    fn emit(&mut self, predicate: &Predicate, metadata: &ModelMetadata) -> Self::Output {
        match predicate {
            Predicate::Compare { field, op, value } => {
                let multiple = self.is_multiple(field, metadata);
                self.emit_compare(field, *op, value, multiple)
            }
            Predicate::Range { field, lo, hi } => {
                let multiple = self.is_multiple(field, metadata);
                self.emit_range(field, lo, hi, multiple)
            }
            Predicate::And(operands) => {
                let operands = operands
                    .iter()
                    .map(|operand| self.emit(operand, metadata))
                    .collect();
                self.emit_bool(Connective::And, operands)
            }
            Predicate::Or(operands) => {
                let operands = operands
                    .iter()
                    .map(|operand| self.emit(operand, metadata))
                    .collect();
                self.emit_bool(Connective::Or, operands)
            }
            Predicate::Not(operand) => {
                let operand = self.emit(operand, metadata);
                self.emit_bool(Connective::Not, vec![operand])
            }
        }
    }

    /// Whether a leaf on `field` needs per-element handling under this emitter's policy.
    fn is_multiple(&self, field: &str, metadata: &ModelMetadata) -> bool {
        match self.multiplicity_policy() {
            MultiplicityPolicy::Native => false,
            MultiplicityPolicy::AnyElement => metadata.is_multiple(field),
        }
    }
}
