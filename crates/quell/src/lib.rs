//! An embeddable GraphQL query execution engine.
//!
//! `quell` turns a textual query against a declared schema into a structured
//! response: it lexes and parses the query, validates it against the schema,
//! then walks the selection set through caller-registered field resolvers
//! with bounded parallelism, GraphQL null propagation, path-tagged partial
//! errors, and cooperative cancellation.
//!
//! # Usage
//!
//! ```rust
//! use quell::CancellationToken;
//! use quell::Engine;
//! use quell::Resolvers;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let engine = Engine::builder()
//!     .schema_text("type Query { greeting: String! }")
//!     .resolvers(
//!         Resolvers::new()
//!             .register("Query", "greeting", |_ctx| async {
//!                 Ok(serde_json::json!("hello"))
//!             }),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let response = engine
//!     .execute(
//!         CancellationToken::new(),
//!         "{ greeting }",
//!         None,
//!         serde_json::Map::new(),
//!     )
//!     .await;
//! assert!(response.errors.is_empty());
//! # });
//! ```

mod engine;
mod error;
pub mod exec;
pub mod lexer;
pub mod log;
pub mod query;
pub mod resolver;
pub mod schema;
pub mod trace;
mod types;
pub mod validation;
mod value;

pub use engine::BuildError;
pub use engine::Engine;
pub use engine::EngineBuilder;
pub use engine::Response;
pub use error::Location;
pub use error::PathSegment;
pub use error::QueryError;
pub use log::DefaultPanicLogger;
pub use log::PanicLogger;
pub use resolver::FieldError;
pub use resolver::ResolverContext;
pub use resolver::Resolvers;
pub use tokio_util::sync::CancellationToken;
pub use trace::NoopTracer;
pub use trace::Tracer;
pub use trace::TracingTracer;
pub use types::TypeAnnotation;
pub use value::Value;
