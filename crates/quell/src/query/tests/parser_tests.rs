use crate::error::Location;
use crate::query::OperationKind;
use crate::query::Selection;
use crate::query::parse;
use crate::value::Value;

#[test]
fn shorthand_query_preserves_field_order() {
    let doc = parse("{ b a c }").unwrap();
    assert_eq!(doc.operations().len(), 1);
    let names: Vec<_> = doc.operations()[0]
        .selection_set()
        .iter()
        .map(|sel| match sel {
            Selection::Field(field) => field.name().to_string(),
            other => panic!("expected field, got {other:?}"),
        })
        .collect();
    assert_eq!(names, ["b", "a", "c"]);
}

#[test]
fn duplicate_selections_are_not_deduplicated() {
    let doc = parse("{ a a }").unwrap();
    assert_eq!(doc.operations()[0].selection_set().len(), 2);
}

#[test]
fn named_operation_with_variables() {
    let doc = parse("query Hero($id: ID!, $full: Boolean = false) { hero(id: $id) { name } }")
        .unwrap();
    let op = &doc.operations()[0];
    assert_eq!(op.kind(), OperationKind::Query);
    assert_eq!(op.name(), Some("Hero"));

    let vars: Vec<_> = op.variables().keys().cloned().collect();
    assert_eq!(vars, ["id", "full"]);
    assert_eq!(op.variables()["id"].annotation().to_string(), "ID!");
    assert_eq!(op.variables()["full"].default, Some(Value::Boolean(false)));
}

#[test]
fn aliases_and_argument_order() {
    let doc = parse(r#"{ movie: film(title: "Alien", year: 1979) { id } }"#).unwrap();
    let Selection::Field(field) = &doc.operations()[0].selection_set()[0] else {
        panic!("expected field");
    };
    assert_eq!(field.alias(), Some("movie"));
    assert_eq!(field.name(), "film");
    assert_eq!(field.response_key(), "movie");
    let args: Vec<_> = field.arguments.keys().cloned().collect();
    assert_eq!(args, ["title", "year"]);
}

#[test]
fn fragments_spreads_and_inline_fragments() {
    let doc = parse(
        r#"
        query { hero { ...heroFields ... on Droid { primaryFunction } } }
        fragment heroFields on Character { name }
        "#,
    )
    .unwrap();
    assert!(doc.fragments().contains_key("heroFields"));
    assert_eq!(doc.fragments()["heroFields"].type_condition, "Character");

    let Selection::Field(hero) = &doc.operations()[0].selection_set()[0] else {
        panic!("expected field");
    };
    assert!(matches!(
        &hero.selection_set[0],
        Selection::FragmentSpread(spread) if spread.name == "heroFields",
    ));
    assert!(matches!(
        &hero.selection_set[1],
        Selection::InlineFragment(inline)
            if inline.type_condition.as_deref() == Some("Droid"),
    ));
}

#[test]
fn directives_are_parsed_with_arguments() {
    let doc = parse("query ($yes: Boolean!) { a @include(if: $yes) b @skip(if: true) }").unwrap();
    let Selection::Field(a) = &doc.operations()[0].selection_set()[0] else {
        panic!("expected field");
    };
    assert_eq!(a.directives[0].name, "include");
    assert_eq!(
        a.directives[0].arguments["if"],
        Value::Variable("yes".to_string()),
    );
}

#[test]
fn mutations_parse_like_queries() {
    let doc = parse("mutation Rename { rename(name: \"x\") }").unwrap();
    assert_eq!(doc.operations()[0].kind(), OperationKind::Mutation);
}

#[test]
fn subscriptions_are_rejected() {
    let err = parse("subscription { tick }").unwrap_err();
    assert!(err.message.contains("subscriptions are not supported"));
}

#[test]
fn syntax_errors_are_located_query_errors() {
    let err = parse("{ name").unwrap_err();
    assert!(err.message.starts_with("syntax error:"), "{}", err.message);
    assert_eq!(err.locations.len(), 1);
    assert!(err.path.is_empty());
    assert_eq!(err.rule, "");
}

#[test]
fn error_location_points_at_the_offending_token() {
    let err = parse("{\n  name(:\n}").unwrap_err();
    assert_eq!(err.locations, vec![Location::new(2, 8)]);
}

#[test]
fn duplicate_fragment_names_fail_closed() {
    let err = parse(
        "fragment f on Query { a } fragment f on Query { b } { ...f }",
    )
    .unwrap_err();
    assert!(err.message.contains("defined more than once"));
}

#[test]
fn list_and_object_argument_values() {
    let doc = parse(r#"{ search(filter: { tags: ["a", "b"], limit: 3 }) }"#).unwrap();
    let Selection::Field(field) = &doc.operations()[0].selection_set()[0] else {
        panic!("expected field");
    };
    let Value::Object(filter) = &field.arguments["filter"] else {
        panic!("expected object value");
    };
    assert_eq!(
        filter["tags"],
        Value::List(vec![
            Value::String("a".to_string()),
            Value::String("b".to_string()),
        ]),
    );
    assert_eq!(filter["limit"], Value::Int("3".to_string()));
}
