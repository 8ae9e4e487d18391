use docfilter::bson::{Bson, Document, doc};
use docfilter::prelude::*;
use proptest::prelude::*;

#[derive(Clone, Debug)]
struct Person {
    age: Option<i64>,
    name: String,
    tags: Vec<String>,
}

impl Person {
    fn to_document(&self) -> Document {
        let mut document = doc! { "name": self.name.clone(), "tags": self.tags.clone() };
        if let Some(age) = self.age {
            document.insert("age", age);
        }
        document
    }
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    fn token(self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }

    fn holds<T: PartialOrd>(self, left: &T, right: &T) -> bool {
        match self {
            Op::Eq => left == right,
            Op::Ne => left != right,
            Op::Lt => left < right,
            Op::Le => left <= right,
            Op::Gt => left > right,
            Op::Ge => left >= right,
        }
    }
}

#[derive(Clone, Debug)]
enum Clause {
    Age(Op, i64),
    AgeRange(i64, i64),
    AgeIn(Vec<i64>),
    Name(Op, String),
    Tag(Op, String),
}

impl Clause {
    fn render(&self) -> String {
        match self {
            Clause::Age(op, value) => format!("age {} {value}", op.token()),
            Clause::AgeRange(lo, hi) => format!("age in ({lo}, {hi})"),
            Clause::AgeIn(values) => format!(
                "age in [{}]",
                values.iter().map(i64::to_string).collect::<Vec<_>>().join(", ")
            ),
            Clause::Name(op, value) => format!("name {} {value:?}", op.token()),
            Clause::Tag(op, value) => format!("tags {} {value:?}", op.token()),
        }
    }

    /// Reference semantics: a missing scalar only satisfies `!=`; a list
    /// satisfies a condition if any element does, and `!=` if no element equals.
    fn holds(&self, person: &Person) -> bool {
        match self {
            Clause::Age(op, value) => match person.age {
                Some(age) => op.holds(&age, value),
                None => matches!(op, Op::Ne),
            },
            Clause::AgeRange(lo, hi) => person.age.is_some_and(|age| *lo <= age && age <= *hi),
            Clause::AgeIn(values) => person.age.is_some_and(|age| values.contains(&age)),
            Clause::Name(op, value) => op.holds(&person.name, value),
            Clause::Tag(Op::Ne, value) => !person.tags.contains(value),
            Clause::Tag(op, value) => person.tags.iter().any(|tag| op.holds(tag, value)),
        }
    }
}

/// An `or` of `and` chains of optionally negated clauses.
type Expression = Vec<Vec<(bool, Clause)>>;

fn render(expression: &Expression) -> String {
    expression
        .iter()
        .map(|chain| {
            chain
                .iter()
                .map(|(negated, clause)| {
                    if *negated {
                        format!("not {}", clause.render())
                    } else {
                        clause.render()
                    }
                })
                .collect::<Vec<_>>()
                .join(" and ")
        })
        .collect::<Vec<_>>()
        .join(" or ")
}

fn holds(expression: &Expression, person: &Person) -> bool {
    expression.iter().any(|chain| {
        chain
            .iter()
            .all(|(negated, clause)| clause.holds(person) != *negated)
    })
}

fn metadata() -> ModelMetadata {
    ModelMetadata::builder()
        .field("age", Atom::Integer.field_meta(Storage::Native))
        .field("name", FieldMeta::new())
        .field("tags", FieldMeta::new().multiple(true))
        .build()
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Eq),
        Just(Op::Ne),
        Just(Op::Lt),
        Just(Op::Le),
        Just(Op::Gt),
        Just(Op::Ge),
    ]
}

fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![Just("a"), Just("b"), Just("c"), Just("d")].prop_map(str::to_string)
}

fn arb_clause() -> impl Strategy<Value = Clause> {
    prop_oneof![
        (arb_op(), -5_i64..60).prop_map(|(op, value)| Clause::Age(op, value)),
        (-5_i64..60, -5_i64..60).prop_map(|(lo, hi)| Clause::AgeRange(lo, hi)),
        prop::collection::vec(-5_i64..60, 1..4).prop_map(Clause::AgeIn),
        (arb_op(), arb_word()).prop_map(|(op, value)| Clause::Name(op, value)),
        (arb_op(), arb_word()).prop_map(|(op, value)| Clause::Tag(op, value)),
    ]
}

fn arb_expression() -> impl Strategy<Value = Expression> {
    prop::collection::vec(
        prop::collection::vec((any::<bool>(), arb_clause()), 1..4),
        1..4,
    )
}

fn arb_person() -> impl Strategy<Value = Person> {
    (
        prop::option::of(-5_i64..60),
        arb_word(),
        prop::collection::vec(arb_word(), 0..4),
    )
        .prop_map(|(age, name, tags)| Person { age, name, tags })
}

proptest! {
    #[test]
    fn row_backend_agrees_with_reference(
        expression in arb_expression(),
        people in prop::collection::vec(arb_person(), 0..12),
    ) {
        let metadata = metadata();
        let query = compile(&render(&expression), &metadata, Backend::PredicateObject).unwrap();
        let row = query.as_row().unwrap();

        for person in &people {
            prop_assert_eq!(
                row.matches(&person.to_document()),
                holds(&expression, person),
                "{} on {:?}", render(&expression), person
            );
        }
    }

    #[test]
    fn building_is_deterministic(expression in arb_expression()) {
        let metadata = metadata();
        let compiler = Compiler::new(&metadata);
        let expr = render(&expression);
        prop_assert_eq!(compiler.predicate(&expr).unwrap(), compiler.predicate(&expr).unwrap());
    }

    #[test]
    fn tuple_range_is_inclusive(lo in -5_i64..60, hi in -5_i64..60, age in -5_i64..60) {
        let metadata = metadata();
        let query = compile(&format!("age in ({lo}, {hi})"), &metadata, Backend::PredicateObject).unwrap();
        prop_assert_eq!(
            query.as_row().unwrap().matches(&doc! { "age": age }),
            lo <= age && age <= hi
        );
    }
}

#[test]
fn list_literals_coerce_each_element() {
    let metadata = metadata();
    let query = compile("age in ['1', '2', '3']", &metadata, Backend::DocumentOperator).unwrap();
    assert_eq!(
        query.as_document(),
        Some(&doc! { "age": { "$in": [Bson::Int64(1), Bson::Int64(2), Bson::Int64(3)] } })
    );
}
