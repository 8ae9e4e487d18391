use docfilter::bson::{Bson, doc};
use docfilter::prelude::*;
use serde_json::json;

fn metadata(storage: Storage) -> ModelMetadata {
    ModelMetadata::builder()
        .field("lastname", Atom::String.field_meta(storage))
        .field("age", Atom::Integer.field_meta(storage))
        .field("birthyear", Atom::Integer.field_meta(storage))
        .field("born", Atom::Date.field_meta(storage))
        .field("active", Atom::Boolean.field_meta(storage))
        .field("nationality", Atom::String.field_meta(storage).multiple(true))
        .field("address.city", Atom::String.field_meta(storage))
        .build()
}

fn people() -> Vec<docfilter::bson::Document> {
    vec![
        doc! { "lastname": "Jones", "age": 17_i64, "birthyear": 2008_i64, "nationality": ["NL"], "address": { "city": "Leiden" } },
        doc! { "lastname": "Jones", "age": 18_i64, "birthyear": 1925_i64, "nationality": ["BE", "NL"] },
        doc! { "lastname": "Smith", "age": 65_i64, "birthyear": 1950_i64, "nationality": [] },
        doc! { "lastname": "Brown", "age": 66_i64, "birthyear": 1900_i64, "nationality": ["DE"], "address": { "city": "Delft" } },
    ]
}

fn lastnames(rows: Vec<Bson>) -> Vec<String> {
    rows.into_iter()
        .filter_map(|row| row.as_document()?.get_str("lastname").ok().map(str::to_string))
        .collect()
}

#[test]
fn bounds_and_range_emit_documented_shapes() {
    let metadata = metadata(Storage::Native);

    let bounds = compile("age >= 18 and age <= 65", &metadata, Backend::DocumentOperator).unwrap();
    assert_eq!(
        bounds.as_document(),
        Some(&doc! { "$and": [ { "age": { "$gte": 18_i64 } }, { "age": { "$lte": 65_i64 } } ] })
    );

    let range = compile("age in (18, 65)", &metadata, Backend::DocumentOperator).unwrap();
    assert_eq!(range.as_document(), Some(&doc! { "age": { "$gte": 18_i64, "$lte": 65_i64 } }));
}

#[test]
fn bounds_and_range_select_the_same_rows() {
    let metadata = metadata(Storage::Native);

    for expr in ["age >= 18 and age <= 65", "age in (18, 65)"] {
        let query = compile(expr, &metadata, Backend::PredicateObject).unwrap();
        let row = query.as_row().unwrap();
        let selected = people()
            .iter()
            .filter(|person| row.matches(person))
            .filter_map(|person| person.get_i64("age").ok())
            .collect::<Vec<_>>();
        assert_eq!(selected, [18, 65], "{expr}");
    }
}

#[test]
fn multiple_field_equality_tests_membership() {
    let metadata = metadata(Storage::Native);
    let query = compile("nationality == 'NL'", &metadata, Backend::PredicateObject).unwrap();
    let row = query.as_row().unwrap();

    let matched = people().iter().filter(|person| row.matches(person)).count();
    assert_eq!(matched, 2);

    let document = compile("nationality == 'NL'", &metadata, Backend::DocumentOperator).unwrap();
    assert_eq!(document.as_document(), Some(&doc! { "nationality": { "$eq": "NL" } }));
}

#[test]
fn unknown_fields_follow_the_policy() {
    let metadata = metadata(Storage::Native);

    for backend in [Backend::DocumentOperator, Backend::JsonDocument, Backend::PredicateObject] {
        let query = compile("nickname == 'Bob'", &metadata, backend).unwrap();
        match query {
            BackendQuery::Document(document) => assert!(document.is_empty()),
            BackendQuery::Json(value) => assert_eq!(value, json!({})),
            BackendQuery::Row(expr) => assert_eq!(expr, RowExpr::Always),
        }
    }

    let strict = Compiler::with_options(&metadata, CompileOptions::builder().strict().build());
    assert!(matches!(
        strict.compile("nickname == 'Bob'"),
        Err(FilterError::Build(BuildError::UnknownField(field))) if field == "nickname"
    ));
}

#[test]
fn empty_expression_matches_everything() {
    let metadata = metadata(Storage::Native);
    let compiler = Compiler::with_options(
        &metadata,
        CompileOptions::builder().backend(Backend::PredicateObject).strict().build(),
    );

    let query = compiler.compile("   ").unwrap();
    assert_eq!(query.backend(), Backend::PredicateObject);
    assert!(people().iter().all(|person| query.as_row().unwrap().matches(person)));
}

#[test]
fn errors_surface_per_stage() {
    let metadata = metadata(Storage::Native);
    let compiler = Compiler::new(&metadata);

    assert!(matches!(compiler.compile("age >= "), Err(FilterError::Parse(_))));
    assert!(matches!(compiler.compile("(age == 1"), Err(FilterError::Parse(_))));
    assert!(matches!(compiler.compile("born == '31-12-1950'"), Err(FilterError::Coercion(_))));
    assert!(matches!(
        compiler.compile("lastname % '[a-'"),
        Err(FilterError::Build(BuildError::InvalidPattern { .. }))
    ));
}

#[test]
fn literals_are_coerced_per_backend() {
    let native = metadata(Storage::Native);
    let json = metadata(Storage::Json);
    let expr = "born in ('1900-01-01', '1950-12-31') and active == 'ja'";

    let document = compile(expr, &native, Backend::DocumentOperator).unwrap();
    let lo = docfilter::bson::DateTime::parse_rfc3339_str("1900-01-01T00:00:00Z").unwrap();
    let hi = docfilter::bson::DateTime::parse_rfc3339_str("1950-12-31T00:00:00Z").unwrap();
    assert_eq!(
        document.as_document(),
        Some(&doc! { "$and": [
            { "born": { "$gte": lo, "$lte": hi } },
            { "active": { "$eq": true } },
        ] })
    );

    let value = compile(expr, &json, Backend::JsonDocument).unwrap();
    assert_eq!(
        value.as_json(),
        Some(&json!({ "$and": [
            { "born": { "$gte": "1900-01-01", "$lte": "1950-12-31" } },
            { "active": { "$eq": true } },
        ] }))
    );
}

#[test]
fn embedded_dict_shorthand() {
    let metadata = metadata(Storage::Native);
    let query = compile(r#"address == {"city": "Leiden"}"#, &metadata, Backend::DocumentOperator).unwrap();
    assert_eq!(query.as_document(), Some(&doc! { "address.city": { "$eq": "Leiden" } }));

    let query = compile(r#"birthyear == {"from": "1900", "to": "1930"}"#, &metadata, Backend::PredicateObject).unwrap();
    let row = query.as_row().unwrap();
    let matched = people()
        .iter()
        .filter(|person| row.matches(person))
        .filter_map(|person| person.get_i64("birthyear").ok())
        .collect::<Vec<_>>();
    assert_eq!(matched, [1925, 1900]);
}

#[tokio::test]
async fn in_memory_store_runs_compiled_filters() {
    let metadata = metadata(Storage::Native);
    let store = InMemoryStore::builder().collection("persons", people()).build();

    let query = compile("lastname == 'Jones' or age > 65", &metadata, Backend::PredicateObject).unwrap();
    let filter = query.as_row().unwrap();

    assert_eq!(store.count("persons", filter).await.unwrap(), 3);

    let options = FindOptions::builder().sort("age", SortDirection::Desc).limit(2).build();
    let found = store.find("persons", filter, options).await.unwrap();
    assert_eq!(lastnames(found), ["Brown", "Jones"]);

    let projected = store
        .project("persons", filter, &["lastname", "address.city"], FindOptions::new())
        .await
        .unwrap();
    assert_eq!(projected[0], Bson::Document(doc! { "lastname": "Jones", "address": { "city": "Leiden" } }));
    assert_eq!(projected[1], Bson::Document(doc! { "lastname": "Jones" }));
}
