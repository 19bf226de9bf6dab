//! Resolver registration and binding.
//!
//! Rust has no runtime reflection, so resolver binding is an explicit
//! registration pass: callers declare `(type, field) -> resolver` entries on
//! a [`Resolvers`] set, and [`Resolvers::bind`] checks the set against the
//! schema, failing closed with a descriptive mismatch error when any object
//! field is left uncovered. The result is an immutable [`DispatchTable`]
//! that is shared, never mutated, across concurrently executing resolvers.

use crate::schema::Schema;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A failure signaled by caller resolver code.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Everything a resolver invocation receives.
///
/// `parent` is the value the enclosing object's resolver produced (null at
/// the root). The engine never hands resolvers shared mutable state; the
/// cancellation token is the cooperative signal long-running resolvers
/// should poll.
#[derive(Clone, Debug)]
pub struct ResolverContext {
    pub parent: serde_json::Value,
    pub arguments: IndexMap<String, serde_json::Value>,
    pub cancellation: CancellationToken,
}

impl ResolverContext {
    /// Convenience accessor for a named argument, null when absent.
    pub fn argument(&self, name: &str) -> serde_json::Value {
        self.arguments
            .get(name)
            .cloned()
            .unwrap_or(serde_json::Value::Null)
    }
}

type BoxedResolver = Arc<
    dyn Fn(ResolverContext) -> BoxFuture<'static, Result<serde_json::Value, FieldError>>
        + Send
        + Sync,
>;

/// A set of registered resolvers, not yet checked against a schema.
#[derive(Default)]
pub struct Resolvers {
    entries: HashMap<String, HashMap<String, BoxedResolver>>,
}

impl Resolvers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolver for `type_name.field_name`.
    pub fn register<F, Fut>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, FieldError>> + Send + 'static,
    {
        self.entries
            .entry(type_name.to_string())
            .or_default()
            .insert(
                field_name.to_string(),
                Arc::new(move |ctx| Box::pin(resolver(ctx))),
            );
        self
    }

    /// Registers a plain-data resolver that reads `field_name` out of the
    /// parent object value (null when absent). Keeps binding fail-closed
    /// without forcing hand-written resolvers for pass-through fields.
    pub fn property(self, type_name: &str, field_name: &str) -> Self {
        let key = field_name.to_string();
        self.register(type_name, field_name, move |ctx: ResolverContext| {
            let value = match &ctx.parent {
                serde_json::Value::Object(map) => {
                    map.get(&key).cloned().unwrap_or(serde_json::Value::Null)
                }
                _ => serde_json::Value::Null,
            };
            async move { Ok(value) }
        })
    }

    /// Registers [`Resolvers::property`] entries for every field of
    /// `type_name` that has no explicit resolver yet.
    pub fn properties(mut self, schema: &Schema, type_name: &str) -> Self {
        let Some(object) = schema.object(type_name) else {
            return self;
        };
        let uncovered: Vec<String> = object
            .fields()
            .keys()
            .filter(|name| {
                !self
                    .entries
                    .get(type_name)
                    .is_some_and(|fields| fields.contains_key(*name))
            })
            .cloned()
            .collect();
        for field in uncovered {
            self = self.property(type_name, &field);
        }
        self
    }

    /// Checks this set against `schema` and produces the immutable dispatch
    /// table. Fails closed: every field of every object type must be
    /// covered.
    pub fn bind(self, schema: &Schema) -> Result<DispatchTable, BindError> {
        let mut missing = vec![];
        for object in schema.objects() {
            for field in object.fields().keys() {
                let covered = self
                    .entries
                    .get(object.name())
                    .is_some_and(|fields| fields.contains_key(field));
                if !covered {
                    missing.push(format!("{}.{}", object.name(), field));
                }
            }
        }
        if !missing.is_empty() {
            return Err(BindError { missing });
        }
        Ok(DispatchTable {
            entries: self.entries,
        })
    }
}

/// The shape of the registered resolvers cannot satisfy the schema.
#[derive(Clone, Debug, thiserror::Error)]
#[error("no resolver bound for {}", self.missing.join(", "))]
pub struct BindError {
    missing: Vec<String>,
}

impl BindError {
    /// The uncovered `Type.field` pairs, in schema declaration order.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

/// Immutable mapping from `(object type, field name)` to a bound resolver.
///
/// Built once per schema + resolver set and reused across requests; read
/// concurrently without locking during execution.
pub struct DispatchTable {
    entries: HashMap<String, HashMap<String, BoxedResolver>>,
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable").finish_non_exhaustive()
    }
}

impl DispatchTable {
    pub(crate) fn get(&self, type_name: &str, field_name: &str) -> Option<&BoxedResolver> {
        self.entries.get(type_name)?.get(field_name)
    }
}
