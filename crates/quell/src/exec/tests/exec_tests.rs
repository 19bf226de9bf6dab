use crate::error::PathSegment;
use crate::error::QueryError;
use crate::exec::Request;
use crate::log::DefaultPanicLogger;
use crate::query::parse;
use crate::resolver::Resolvers;
use crate::schema::Schema;
use crate::trace::NoopTracer;
use crate::validation::validate;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn run_with(
    schema_text: &str,
    resolvers: Resolvers,
    query: &str,
    variables: serde_json::Map<String, serde_json::Value>,
    cancellation: CancellationToken,
    max_parallelism: usize,
) -> (Option<serde_json::Value>, Vec<QueryError>) {
    let schema = Schema::parse(schema_text).unwrap();
    let dispatch = resolvers.bind(&schema).unwrap();
    let document = parse(query).unwrap();
    assert_eq!(validate(&schema, &document), vec![]);
    let request = Request::new(
        &schema,
        &dispatch,
        &document,
        &variables,
        max_parallelism,
        cancellation,
        &NoopTracer,
        &DefaultPanicLogger,
    );
    request.execute(&document.operations()[0]).await
}

async fn run(
    schema_text: &str,
    resolvers: Resolvers,
    query: &str,
) -> (Option<serde_json::Value>, Vec<QueryError>) {
    run_with(
        schema_text,
        resolvers,
        query,
        serde_json::Map::new(),
        CancellationToken::new(),
        10,
    )
    .await
}

fn path_of(error: &QueryError) -> &[PathSegment] {
    &error.path
}

#[tokio::test]
async fn result_keys_follow_query_order() {
    let (data, errors) = run(
        "type Query { a: String b: String }",
        Resolvers::new()
            .register("Query", "a", |_ctx| async { Ok(serde_json::json!("1")) })
            .register("Query", "b", |_ctx| async { Ok(serde_json::json!("2")) }),
        "{ b a }",
    )
    .await;
    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_string(&data.unwrap()).unwrap(),
        r#"{"b":"2","a":"1"}"#,
    );
}

#[tokio::test]
async fn field_error_nulls_only_that_field() {
    let (data, errors) = run(
        "type Query { good: String bad: String }",
        Resolvers::new()
            .register("Query", "good", |_ctx| async { Ok(serde_json::json!("ok")) })
            .register("Query", "bad", |_ctx| async { Err("boom".into()) }),
        "{ good bad }",
    )
    .await;
    assert_eq!(data.unwrap(), serde_json::json!({"good": "ok", "bad": null}));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "boom");
    assert_eq!(path_of(&errors[0]), [PathSegment::Field("bad".to_string())]);
    assert!(!errors[0].locations.is_empty());
}

#[tokio::test]
async fn non_null_failure_nulls_the_nearest_nullable_ancestor() {
    let (data, errors) = run(
        "type Query { user: User } type User { id: ID name: String! }",
        Resolvers::new()
            .register("Query", "user", |_ctx| async { Ok(serde_json::json!({})) })
            .register("User", "id", |_ctx| async { Ok(serde_json::json!("u1")) })
            .register("User", "name", |_ctx| async { Err("boom".into()) }),
        "{ user { id name } }",
    )
    .await;
    assert_eq!(data.unwrap(), serde_json::json!({"user": null}));
    assert_eq!(errors.len(), 1);
    assert_eq!(
        path_of(&errors[0]),
        [
            PathSegment::Field("user".to_string()),
            PathSegment::Field("name".to_string()),
        ],
    );
}

#[tokio::test]
async fn non_null_failure_at_the_root_omits_data() {
    let (data, errors) = run(
        "type Query { name: String! }",
        Resolvers::new().register("Query", "name", |_ctx| async { Err("down".into()) }),
        "{ name }",
    )
    .await;
    assert_eq!(data, None);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "down");
}

#[tokio::test]
async fn explicit_null_for_non_null_type_is_an_error() {
    let (data, errors) = run(
        "type Query { name: String! }",
        Resolvers::new()
            .register("Query", "name", |_ctx| async { Ok(serde_json::Value::Null) }),
        "{ name }",
    )
    .await;
    assert_eq!(data, None);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "cannot return null for non-null type String!",
    );
    assert_eq!(path_of(&errors[0]), [PathSegment::Field("name".to_string())]);
}

fn user_list_resolvers() -> Resolvers {
    Resolvers::new()
        .register("Query", "users", |_ctx| async {
            Ok(serde_json::json!([{"ok": true}, {"ok": false}]))
        })
        .register("User", "name", |ctx| async move {
            if ctx.parent["ok"] == serde_json::json!(true) {
                Ok(serde_json::json!("fine"))
            } else {
                Err("bad element".into())
            }
        })
}

#[tokio::test]
async fn failed_list_element_nulls_only_its_slot() {
    let (data, errors) = run(
        "type Query { users: [User] } type User { name: String! }",
        user_list_resolvers(),
        "{ users { name } }",
    )
    .await;
    assert_eq!(
        data.unwrap(),
        serde_json::json!({"users": [{"name": "fine"}, null]}),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(
        path_of(&errors[0]),
        [
            PathSegment::Field("users".to_string()),
            PathSegment::Index(1),
            PathSegment::Field("name".to_string()),
        ],
    );
}

#[tokio::test]
async fn failed_non_null_list_element_nulls_the_list() {
    let (data, errors) = run(
        "type Query { users: [User!] } type User { name: String! }",
        user_list_resolvers(),
        "{ users { name } }",
    )
    .await;
    assert_eq!(data.unwrap(), serde_json::json!({"users": null}));
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn sibling_resolvers_respect_the_parallelism_bound() {
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut resolvers = Resolvers::new();
    for field in ["a", "b", "c", "d"] {
        let current = current.clone();
        let peak = peak.clone();
        resolvers = resolvers.register("Query", field, move |_ctx| {
            let current = current.clone();
            let peak = peak.clone();
            async move {
                let running = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(running, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(serde_json::json!("x"))
            }
        });
    }

    let (data, errors) = run_with(
        "type Query { a: String b: String c: String d: String }",
        resolvers,
        "{ a b c d }",
        serde_json::Map::new(),
        CancellationToken::new(),
        2,
    )
    .await;
    assert!(errors.is_empty());
    assert!(data.is_some());
    assert_eq!(peak.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cancelling_before_execution_yields_only_the_cancellation_error() {
    let token = CancellationToken::new();
    token.cancel();
    let (data, errors) = run_with(
        "type Query { name: String }",
        Resolvers::new().register("Query", "name", |_ctx| async {
            panic!("must not start")
        }),
        "{ name }",
        serde_json::Map::new(),
        token,
        10,
    )
    .await;
    assert_eq!(data, None);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "request cancelled");
}

#[tokio::test]
async fn cancellation_stops_new_resolvers_but_keeps_partial_data() {
    let (data, errors) = run(
        "type Query { user: User } type User { name: String }",
        Resolvers::new()
            .register("Query", "user", |ctx| async move {
                ctx.cancellation.cancel();
                Ok(serde_json::json!({}))
            })
            .register("User", "name", |_ctx| async {
                panic!("must not start")
            }),
        "{ user { name } }",
    )
    .await;
    assert_eq!(data.unwrap(), serde_json::json!({"user": {"name": null}}));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "request cancelled");
}

#[tokio::test]
async fn panicking_resolver_becomes_a_field_error() {
    let (data, errors) = run(
        "type Query { boom: String ok: String }",
        Resolvers::new()
            .register("Query", "boom", |_ctx| async { panic!("kaput") })
            .register("Query", "ok", |_ctx| async { Ok(serde_json::json!("fine")) }),
        "{ boom ok }",
    )
    .await;
    assert_eq!(data.unwrap(), serde_json::json!({"boom": null, "ok": "fine"}));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "panic occurred: kaput");
    assert_eq!(path_of(&errors[0]), [PathSegment::Field("boom".to_string())]);
}

#[tokio::test]
async fn skip_and_include_directives_gate_fields() {
    let mut variables = serde_json::Map::new();
    variables.insert("yes".to_string(), serde_json::json!(true));
    let (data, errors) = run_with(
        "type Query { a: String b: String c: String }",
        Resolvers::new()
            .register("Query", "a", |_ctx| async { Ok(serde_json::json!("a")) })
            .register("Query", "b", |_ctx| async { Ok(serde_json::json!("b")) })
            .register("Query", "c", |_ctx| async { Ok(serde_json::json!("c")) }),
        "query ($yes: Boolean!) { a @skip(if: $yes) b @include(if: true) c @include(if: false) }",
        variables,
        CancellationToken::new(),
        10,
    )
    .await;
    assert!(errors.is_empty());
    assert_eq!(data.unwrap(), serde_json::json!({"b": "b"}));
}

#[tokio::test]
async fn fragments_flatten_into_the_parent_selection() {
    let (data, errors) = run(
        "type Query { user: User } type User { id: ID name: String }",
        Resolvers::new()
            .register("Query", "user", |_ctx| async {
                Ok(serde_json::json!({"id": "u1", "name": "Ripley"}))
            })
            .property("User", "id")
            .property("User", "name"),
        "{ user { ...info alias: id } } fragment info on User { id name }",
    )
    .await;
    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_string(&data.unwrap()).unwrap(),
        r#"{"user":{"id":"u1","name":"Ripley","alias":"u1"}}"#,
    );
}

#[tokio::test]
async fn declared_argument_defaults_apply_when_absent() {
    let resolvers = Resolvers::new().register("Query", "greet", |ctx| async move {
        let name = ctx.argument("name");
        Ok(serde_json::json!(format!("hello {}", name.as_str().unwrap())))
    });
    let schema = "type Query { greet(name: String = \"world\"): String }";

    let (data, _) = run(schema, resolvers, "{ greet }").await;
    assert_eq!(data.unwrap(), serde_json::json!({"greet": "hello world"}));

    let resolvers = Resolvers::new().register("Query", "greet", |ctx| async move {
        let name = ctx.argument("name");
        Ok(serde_json::json!(format!("hello {}", name.as_str().unwrap())))
    });
    let (data, _) = run(schema, resolvers, "{ greet(name: \"bob\") }").await;
    assert_eq!(data.unwrap(), serde_json::json!({"greet": "hello bob"}));
}

#[tokio::test]
async fn null_for_a_non_null_argument_is_a_field_error() {
    let (data, errors) = run(
        "type Query { user(id: ID!): User } type User { id: ID }",
        Resolvers::new()
            .register("Query", "user", |_ctx| async { Ok(serde_json::json!({})) })
            .register("User", "id", |_ctx| async { Ok(serde_json::json!("u1")) }),
        "{ user(id: null) { id } }",
    )
    .await;
    assert_eq!(data.unwrap(), serde_json::json!({"user": null}));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("cannot pass null"));
    assert_eq!(path_of(&errors[0]), [PathSegment::Field("user".to_string())]);
}
