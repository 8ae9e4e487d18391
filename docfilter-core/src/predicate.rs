//! Backend-agnostic predicates and their construction from parsed expressions.
//!
//! [`PredicateBuilder`] walks a [`Node`] tree, resolves every field against the
//! model's [`ModelMetadata`], coerces literals and expands the dict shorthand.
//! The resulting [`Predicate`] is what the backend emitters consume.

use bson::Bson;
use regex::Regex;
use tracing::warn;

use crate::{
    ast::{BinOp, BoolOp, CompareOp, Node},
    coerce::coerce_node,
    config::FieldPolicy,
    error::{BuildError, FilterResult},
    metadata::ModelMetadata,
};


/// Operators of a leaf comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// The field matches a regular expression.
    Regex,
    /// The field equals one of the listed values.
    MemberOf,
}

impl Operator {
    /// The `$`-prefixed query operator used by the document backends.
    pub fn query_key(self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Lt => "$lt",
            Operator::Le => "$lte",
            Operator::Gt => "$gt",
            Operator::Ge => "$gte",
            Operator::Regex => "$regex",
            Operator::MemberOf => "$in",
        }
    }
}

impl From<CompareOp> for Operator {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Eq => Operator::Eq,
            CompareOp::Ne => Operator::Ne,
            CompareOp::Lt => Operator::Lt,
            CompareOp::Le => Operator::Le,
            CompareOp::Gt => Operator::Gt,
            CompareOp::Ge => Operator::Ge,
            CompareOp::In => Operator::MemberOf,
        }
    }
}

/// A boolean condition over the fields of a model.
///
/// Every field referenced by a leaf is defined in the metadata the predicate was
/// built against. `And(vec![])` is the canonical "match everything" predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        field: String,
        op: Operator,
        value: Bson,
    },
    /// `lo <= field <= hi`
    Range {
        field: String,
        lo: Bson,
        hi: Bson,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<Bson>) -> Self {
        Predicate::Compare { field: field.into(), op, value: value.into() }
    }

    pub fn range(field: impl Into<String>, lo: impl Into<Bson>, hi: impl Into<Bson>) -> Self {
        Predicate::Range { field: field.into(), lo: lo.into(), hi: hi.into() }
    }

    /// The predicate every document satisfies.
    pub fn match_all() -> Self {
        Predicate::And(Vec::new())
    }

    /// Returns `true` for an `And` or `Or` without operands.
    pub fn is_match_all(&self) -> bool {
        matches!(self, Predicate::And(operands) | Predicate::Or(operands) if operands.is_empty())
    }
}

/// Translates parsed expressions into [`Predicate`]s for one model.
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder<'m> {
    metadata: &'m ModelMetadata,
    policy: FieldPolicy,
}

impl<'m> PredicateBuilder<'m> {
    pub fn new(metadata: &'m ModelMetadata, policy: FieldPolicy) -> Self {
        Self { metadata, policy }
    }

    /// Builds the predicate for a parsed expression.
    ///
    /// If every clause is dropped because of unknown fields, the result is
    /// [`Predicate::match_all`].
    pub fn build(&self, node: &Node) -> FilterResult<Predicate> {
        Ok(self.build_node(node)?.unwrap_or_else(Predicate::match_all))
    }

    /// `Ok(None)` means the node was dropped.
    fn build_node(&self, node: &Node) -> FilterResult<Option<Predicate>> {
        match node {
            Node::BoolOp { op, operands } => {
                let mut built = Vec::with_capacity(operands.len());
                for operand in operands {
                    if let Some(predicate) = self.build_node(operand)? {
                        built.push(predicate);
                    }
                }

                if built.is_empty() {
                    return Ok(Some(Predicate::match_all()));
                }

                Ok(Some(match op {
                    BoolOp::And => Predicate::And(built),
                    BoolOp::Or => Predicate::Or(built),
                }))
            }
            Node::Not(operand) => Ok(
                self.build_node(operand)?
                    .map(|predicate| Predicate::Not(Box::new(predicate)))
            ),
            Node::Compare { left, op, right } => self.build_compare(left, *op, right),
            Node::BinOp { left, op: BinOp::Match, right } => self.build_match(left, right),
            other => Err(BuildError::UnsupportedOperand(
                format!("a {} is not a condition", other.kind())
            ).into()),
        }
    }

    /// Checks that `name` is defined. `Ok(false)` means the clause must be dropped.
    fn check_field(&self, name: &str) -> FilterResult<bool> {
        if self.metadata.contains(name) {
            return Ok(true);
        }

        match self.policy {
            FieldPolicy::Strict => Err(BuildError::UnknownField(name.to_string()).into()),
            FieldPolicy::Permissive => {
                warn!(field = %name, "dropping filter clause on unknown field");
                Ok(false)
            }
        }
    }

    fn field_name<'n>(&self, node: &'n Node) -> FilterResult<&'n str> {
        match node {
            Node::Identifier(name) => Ok(name),
            other => Err(BuildError::UnsupportedOperand(
                format!("expected a field name on the left-hand side, found a {}", other.kind())
            ).into()),
        }
    }

    /// Coerces a literal operand (scalar, list or tuple) for `field`.
    fn value(&self, field: &str, node: &Node) -> FilterResult<Bson> {
        coerce_node(field, node, self.metadata)?.ok_or_else(|| {
            BuildError::UnsupportedOperand(
                format!("expected a literal value for {field}, found a {}", node.kind())
            ).into()
        })
    }

    fn scalar(&self, field: &str, node: &Node) -> FilterResult<Bson> {
        if !node.is_scalar() {
            return Err(BuildError::UnsupportedOperand(
                format!("range bounds of {field} must be scalar, found a {}", node.kind())
            ).into());
        }
        self.value(field, node)
    }

    fn build_compare(&self, left: &Node, op: CompareOp, right: &Node) -> FilterResult<Option<Predicate>> {
        let field = self.field_name(left)?;
        if let (CompareOp::Eq, Node::Dict(pairs)) = (op, right) {
            return self.expand_dict(field, pairs);
        }
        if !self.check_field(field)? {
            return Ok(None);
        }

        let predicate = match (op, right) {
            (CompareOp::In, Node::Tuple(bounds)) if bounds.len() == 2 => Predicate::range(
                field,
                self.scalar(field, &bounds[0])?,
                self.scalar(field, &bounds[1])?,
            ),
            (CompareOp::In, Node::Tuple(_) | Node::List(_)) => {
                Predicate::compare(field, Operator::MemberOf, self.value(field, right)?)
            }
            (CompareOp::In, other) => {
                return Err(BuildError::UnsupportedOperand(
                    format!("'in' expects a list or tuple, found a {}", other.kind())
                ).into());
            }
            (op, Node::Dict(_)) => {
                return Err(BuildError::UnsupportedOperand(
                    format!("a dict can only be compared with '==', not '{op}'")
                ).into());
            }
            (op, value) => Predicate::compare(field, op.into(), self.value(field, value)?),
        };

        Ok(Some(predicate))
    }

    /// Expands `field == {...}`.
    ///
    /// `{"from": lo, "to": hi}` is an inclusive range, `{"from": v}` an equality and
    /// `{"to": v}` an upper bound. Any other keys address embedded fields:
    /// `{"city": c}` becomes `field.city == c`; only the dotted paths need to be
    /// defined in that case.
    fn expand_dict(&self, field: &str, pairs: &[(String, Node)]) -> FilterResult<Option<Predicate>> {
        let lookup = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v);
        let from = lookup("from");
        let to = lookup("to");

        if from.is_some() || to.is_some() {
            if pairs.iter().any(|(k, _)| k != "from" && k != "to") {
                return Err(BuildError::UnsupportedOperand(
                    format!("cannot mix 'from'/'to' with other keys in the dict for {field}")
                ).into());
            }
            if !self.check_field(field)? {
                return Ok(None);
            }

            return Ok(Some(match (from, to) {
                (Some(lo), Some(hi)) => Predicate::range(field, self.scalar(field, lo)?, self.scalar(field, hi)?),
                (Some(lo), None) => Predicate::compare(field, Operator::Eq, self.scalar(field, lo)?),
                (None, Some(hi)) => Predicate::compare(field, Operator::Le, self.scalar(field, hi)?),
                (None, None) => return Ok(None),
            }));
        }

        let mut clauses = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let path = format!("{field}.{key}");
            if !self.check_field(&path)? {
                continue;
            }
            let value = self.value(&path, value)?;
            clauses.push(Predicate::compare(path, Operator::Eq, value));
        }

        Ok(match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Predicate::And(clauses)),
        })
    }

    /// Patterns must be valid [`regex`] syntax for every backend, so lookaround
    /// and backreferences are rejected even where the database would accept them.
    fn build_match(&self, left: &Node, right: &Node) -> FilterResult<Option<Predicate>> {
        let field = self.field_name(left)?;
        if !self.check_field(field)? {
            return Ok(None);
        }

        let Node::String(pattern) = right else {
            return Err(BuildError::UnsupportedOperand(
                format!("'%' expects a string pattern, found a {}", right.kind())
            ).into());
        };

        Regex::new(pattern).map_err(|e| BuildError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        Ok(Some(Predicate::compare(field, Operator::Regex, pattern.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FilterError,
        metadata::FieldMeta,
        parser::parse,
    };

    fn metadata() -> ModelMetadata {
        ModelMetadata::builder()
            .field("lastname", FieldMeta::new())
            .field("age", FieldMeta::new())
            .field("tags", FieldMeta::new().multiple(true))
            .field("address.city", FieldMeta::new())
            .field(
                "birthyear",
                FieldMeta::new().convert(|raw| Ok(Bson::Int32(raw.parse::<i32>()?))),
            )
            .build()
    }

    fn build(expr: &str, policy: FieldPolicy) -> FilterResult<Predicate> {
        let metadata = metadata();
        PredicateBuilder::new(&metadata, policy).build(&parse(expr).unwrap())
    }

    fn permissive(expr: &str) -> Predicate {
        build(expr, FieldPolicy::Permissive).unwrap()
    }

    #[test]
    fn comparison_and_conjunction() {
        assert_eq!(
            permissive(r#"lastname == "Jones" and age >= 18"#),
            Predicate::And(vec![
                Predicate::compare("lastname", Operator::Eq, "Jones"),
                Predicate::compare("age", Operator::Ge, 18_i64),
            ])
        );
    }

    #[test]
    fn two_element_tuple_is_range() {
        assert_eq!(
            permissive("birthyear in (1900, 1950)"),
            Predicate::range("birthyear", Bson::Int32(1900), Bson::Int32(1950))
        );
    }

    #[test]
    fn other_collections_are_membership() {
        assert_eq!(
            permissive("birthyear in [1900, 1950]"),
            Predicate::compare(
                "birthyear",
                Operator::MemberOf,
                Bson::Array(vec![Bson::Int32(1900), Bson::Int32(1950)])
            )
        );
        assert_eq!(
            permissive("age in (1, 2, 3)"),
            Predicate::compare(
                "age",
                Operator::MemberOf,
                Bson::Array(vec![Bson::Int64(1), Bson::Int64(2), Bson::Int64(3)])
            )
        );
    }

    #[test]
    fn regex_pattern_is_not_coerced() {
        assert_eq!(
            permissive("birthyear % '^19'"),
            Predicate::compare("birthyear", Operator::Regex, "^19")
        );
    }

    #[test]
    fn invalid_regex_is_rejected() {
        assert!(matches!(
            build("lastname % '(unclosed'", FieldPolicy::Permissive),
            Err(FilterError::Build(BuildError::InvalidPattern { .. }))
        ));
    }

    #[test]
    fn query_keys() {
        let keys = [
            Operator::Eq,
            Operator::Ne,
            Operator::Lt,
            Operator::Le,
            Operator::Gt,
            Operator::Ge,
            Operator::Regex,
            Operator::MemberOf,
        ]
        .map(Operator::query_key);
        assert_eq!(keys, ["$eq", "$ne", "$lt", "$lte", "$gt", "$gte", "$regex", "$in"]);
    }

    #[test]
    fn lookaround_is_not_supported() {
        for pattern in ["^(?!Jo)", "(?<=a)b"] {
            assert!(matches!(
                build(&format!("lastname % '{pattern}'"), FieldPolicy::Permissive),
                Err(FilterError::Build(BuildError::InvalidPattern { pattern: rejected, .. })) if rejected == pattern
            ));
        }
    }

    #[test]
    fn dict_shorthand() {
        assert_eq!(
            permissive(r#"birthyear == {"from": "1900", "to": "1950"}"#),
            Predicate::range("birthyear", Bson::Int32(1900), Bson::Int32(1950))
        );
        assert_eq!(
            permissive(r#"birthyear == {"from": "1900"}"#),
            Predicate::compare("birthyear", Operator::Eq, Bson::Int32(1900))
        );
        assert_eq!(
            permissive(r#"birthyear == {"to": "1950"}"#),
            Predicate::compare("birthyear", Operator::Le, Bson::Int32(1950))
        );
        assert_eq!(
            permissive(r#"address == {"city": "Leiden"}"#),
            Predicate::compare("address.city", Operator::Eq, "Leiden")
        );
        assert!(build(r#"age == {"from": 1, "city": 2}"#, FieldPolicy::Permissive).is_err());
        assert!(build(r#"age < {"from": 1}"#, FieldPolicy::Permissive).is_err());
    }

    #[test]
    fn unknown_field_is_dropped_when_permissive() {
        assert_eq!(permissive("zz == 1"), Predicate::match_all());
        assert_eq!(
            permissive("zz == 1 and age == 2"),
            Predicate::And(vec![Predicate::compare("age", Operator::Eq, 2_i64)])
        );
        assert_eq!(permissive("not zz == 1"), Predicate::match_all());
        assert!(permissive("zz == 1 and yy == 2").is_match_all());
    }

    #[test]
    fn unknown_field_fails_when_strict() {
        assert!(matches!(
            build("age == 1 and zz == 1", FieldPolicy::Strict),
            Err(FilterError::Build(BuildError::UnknownField(field))) if field == "zz"
        ));
    }

    #[test]
    fn negation() {
        assert_eq!(
            permissive("not tags == 'x'"),
            Predicate::Not(Box::new(Predicate::compare("tags", Operator::Eq, "x")))
        );
    }

    #[test]
    fn unsupported_operands() {
        for expr in ["1 == age", "age == lastname", "age in 5", "age in {'from': 1}", "age % 5", "age in (1, [2, 3])"] {
            assert!(
                matches!(build(expr, FieldPolicy::Permissive), Err(FilterError::Build(BuildError::UnsupportedOperand(_)))),
                "expected unsupported operand for {expr:?}"
            );
        }
    }

    #[test]
    fn coercion_errors_surface() {
        assert!(matches!(
            build("birthyear == 'nineteen'", FieldPolicy::Permissive),
            Err(FilterError::Coercion(_))
        ));
    }

    #[test]
    fn building_is_deterministic() {
        let expr = "lastname == 'Jones' or tags in ['a', 'b'] and age in (1, 9)";
        assert_eq!(permissive(expr), permissive(expr));
    }
}
