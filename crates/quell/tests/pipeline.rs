//! End-to-end tests through the public API only.

use quell::CancellationToken;
use quell::Engine;
use quell::FieldError;
use quell::PathSegment;
use quell::Resolvers;

const SCHEMA: &str = r#"
# The root query type.
type Query {
    hero(episode: Episode = NEWHOPE): Character
    heroes: [Character!]!
}

# Someone who shows up in at least one episode.
type Character {
    id: ID!
    name: String!
    friends: [Character]
}

enum Episode {
    NEWHOPE
    EMPIRE
    JEDI
}
"#;

fn luke() -> serde_json::Value {
    serde_json::json!({
        "id": "1000",
        "name": "Luke Skywalker",
        "friends": [{"id": "1002", "name": "Han Solo"}],
    })
}

fn vader() -> serde_json::Value {
    serde_json::json!({
        "id": "1001",
        "name": "Darth Vader",
        "friends": [],
    })
}

fn engine() -> Engine {
    Engine::builder()
        .schema_text(SCHEMA)
        .resolvers(
            Resolvers::new()
                .register("Query", "hero", |ctx| async move {
                    match ctx.argument("episode").as_str() {
                        Some("NEWHOPE") => Ok(luke()),
                        Some("EMPIRE") => Ok(vader()),
                        _ => Err(FieldError::new("episode not on file")),
                    }
                })
                .register("Query", "heroes", |_ctx| async {
                    Ok(serde_json::json!([luke(), vader()]))
                })
                .property("Character", "id")
                .property("Character", "name")
                .property("Character", "friends"),
        )
        .build()
        .unwrap()
}

async fn execute(query: &str, variables: serde_json::Value) -> quell::Response {
    let serde_json::Value::Object(variables) = variables else {
        panic!("variables must be an object");
    };
    engine()
        .execute(CancellationToken::new(), query, None, variables)
        .await
}

#[tokio::test]
async fn variables_fragments_and_nesting_resolve_end_to_end() {
    let response = execute(
        "query Hero($ep: Episode!) { \
            hero(episode: $ep) { ...core friends { name } } \
        } \
        fragment core on Character { id name }",
        serde_json::json!({"ep": "EMPIRE"}),
    )
    .await;
    assert!(response.errors.is_empty());
    assert_eq!(
        response.data.unwrap(),
        serde_json::json!({
            "hero": {"id": "1001", "name": "Darth Vader", "friends": []},
        }),
    );
}

#[tokio::test]
async fn declared_argument_defaults_select_the_default_hero() {
    let response = execute("{ hero { name } }", serde_json::json!({})).await;
    assert!(response.errors.is_empty());
    assert_eq!(
        response.data.unwrap(),
        serde_json::json!({"hero": {"name": "Luke Skywalker"}}),
    );
}

#[tokio::test]
async fn non_null_list_fields_resolve_every_element() {
    let response = execute(
        "{ heroes { name friends { name } } }",
        serde_json::json!({}),
    )
    .await;
    assert!(response.errors.is_empty());
    assert_eq!(
        response.data.unwrap(),
        serde_json::json!({
            "heroes": [
                {"name": "Luke Skywalker", "friends": [{"name": "Han Solo"}]},
                {"name": "Darth Vader", "friends": []},
            ],
        }),
    );
}

#[tokio::test]
async fn resolver_errors_surface_with_their_result_path() {
    let response = execute(
        "{ hero(episode: JEDI) { name } }",
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.data.unwrap(), serde_json::json!({"hero": null}));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "episode not on file");
    assert_eq!(
        response.errors[0].path,
        [PathSegment::Field("hero".to_string())],
    );
}

#[tokio::test]
async fn invalid_queries_never_execute() {
    let response = execute("{ starships }", serde_json::json!({})).await;
    assert_eq!(response.data, None);
    assert_eq!(
        response.errors[0].message,
        "Cannot query field \"starships\" on type \"Query\".",
    );
}
