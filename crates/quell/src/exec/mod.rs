//! Selection-set execution.
//!
//! A [`Request`] evaluates one operation's selection set against a bound
//! [`DispatchTable`], producing a result tree plus a flat list of
//! path-tagged errors. Sibling fields and list elements resolve
//! concurrently under a shared permit pool; a field failure nulls that
//! field and, when its declared type is non-null, propagates the null to
//! the nearest nullable ancestor. The shared error list and the permit
//! pool are the only contended state.
//!
//! Cancellation is cooperative: the token is checked before each resolver
//! invocation, already-running resolvers are allowed to finish, and exactly
//! one cancellation error is synthesized per request however many fields
//! were skipped.

use crate::error::PathSegment;
use crate::error::QueryError;
use crate::log::PanicLogger;
use crate::log::panic_message;
use crate::query::Directive;
use crate::query::Document;
use crate::query::FieldSelection;
use crate::query::Operation;
use crate::query::OperationKind;
use crate::query::Selection;
use crate::resolver::DispatchTable;
use crate::resolver::ResolverContext;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::schema::TypeDefinition;
use crate::trace::Tracer;
use crate::types::TypeAnnotation;
use crate::value::Value;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::join_all;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// The result of evaluating one node of the tree.
///
/// `Nulled` means the node resolved to null *because of an error that has
/// already been reported*; it travels upward silently through non-null
/// ancestors until a nullable one absorbs it as a plain null. An explicit,
/// error-free null is an ordinary `Value(Null)`.
pub(crate) enum Outcome {
    Value(serde_json::Value),
    Nulled,
}

/// Everything one in-flight request shares across its field evaluations.
pub(crate) struct Request<'a> {
    schema: &'a Schema,
    dispatch: &'a DispatchTable,
    document: &'a Document,
    variables: &'a serde_json::Map<String, serde_json::Value>,
    limiter: Semaphore,
    cancellation: CancellationToken,
    tracer: &'a dyn Tracer,
    logger: &'a dyn PanicLogger,
    cancelled: AtomicBool,
    fatal: AtomicBool,
    errors: Mutex<Vec<QueryError>>,
}

impl<'a> Request<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        schema: &'a Schema,
        dispatch: &'a DispatchTable,
        document: &'a Document,
        variables: &'a serde_json::Map<String, serde_json::Value>,
        max_parallelism: usize,
        cancellation: CancellationToken,
        tracer: &'a dyn Tracer,
        logger: &'a dyn PanicLogger,
    ) -> Self {
        Self {
            schema,
            dispatch,
            document,
            variables,
            limiter: Semaphore::new(max_parallelism),
            cancellation,
            tracer,
            logger,
            cancelled: AtomicBool::new(false),
            fatal: AtomicBool::new(false),
            errors: Mutex::new(vec![]),
        }
    }

    /// Evaluates `operation` to completion. Returns the data tree (absent
    /// when the root absorbed a null or the request failed outright) and
    /// every error collected along the way.
    pub(crate) async fn execute(
        &self,
        operation: &'a Operation,
    ) -> (Option<serde_json::Value>, Vec<QueryError>) {
        if self.check_cancelled() {
            return (None, self.take_errors());
        }

        let root_name = match operation.kind() {
            OperationKind::Query => Some(self.schema.query_type()),
            OperationKind::Mutation => self.schema.mutation_type(),
        };
        let Some(root) = root_name.and_then(|name| self.schema.object(name)) else {
            self.report(QueryError::new("schema has no mutation type"));
            return (None, self.take_errors());
        };

        let outcome = self
            .resolve_object(&[], root, operation.selection_set(), &serde_json::Value::Null)
            .await;

        let data = match outcome {
            Outcome::Value(value) if !self.fatal.load(Ordering::Relaxed) => Some(value),
            _ => None,
        };
        (data, self.take_errors())
    }

    fn take_errors(&self) -> Vec<QueryError> {
        std::mem::take(&mut self.errors.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn report(&self, error: QueryError) {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(error);
    }

    /// True once the token is cancelled. The first caller to observe the
    /// cancellation synthesizes the request's single cancellation error.
    fn check_cancelled(&self) -> bool {
        if !self.cancellation.is_cancelled() {
            return false;
        }
        if !self.cancelled.swap(true, Ordering::Relaxed) {
            self.report(QueryError::new("request cancelled"));
        }
        true
    }

    /// Resolves one object node: flattens its selections, evaluates all
    /// fields concurrently, and assembles the result map in declared order.
    async fn resolve_object(
        &self,
        path: &[PathSegment],
        object: &'a ObjectType,
        selections: &'a [Selection],
        parent: &serde_json::Value,
    ) -> Outcome {
        let mut fields = vec![];
        let mut visited = HashSet::new();
        self.collect_fields(object, selections, &mut visited, &mut fields);

        let results = join_all(fields.into_iter().map(|field| async move {
            let mut field_path = path.to_vec();
            field_path.push(PathSegment::Field(field.response_key().to_string()));
            let annotation = object.field(&field.name).map(|def| &def.annotation);
            let outcome = self.resolve_field(&field_path, object, field, parent).await;
            (field.response_key(), annotation, outcome)
        }))
        .await;

        let mut map = serde_json::Map::new();
        for (key, annotation, outcome) in results {
            match outcome {
                Outcome::Value(value) => {
                    map.insert(key.to_string(), value);
                }
                Outcome::Nulled => {
                    if annotation.is_some_and(TypeAnnotation::is_non_null) {
                        return Outcome::Nulled;
                    }
                    map.insert(key.to_string(), serde_json::Value::Null);
                }
            }
        }
        Outcome::Value(serde_json::Value::Object(map))
    }

    /// Flattens a selection set into the ordered list of fields to resolve,
    /// expanding matching fragments and applying `@skip`/`@include`. The
    /// visited set guards against fragment spread cycles.
    fn collect_fields(
        &self,
        object: &'a ObjectType,
        selections: &'a [Selection],
        visited: &mut HashSet<&'a str>,
        out: &mut Vec<&'a FieldSelection>,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    if self.should_include(&field.directives) {
                        out.push(field);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.directives) {
                        continue;
                    }
                    if !visited.insert(spread.name.as_str()) {
                        continue;
                    }
                    if let Some(fragment) = self.document.fragments().get(&spread.name)
                        && fragment.type_condition == object.name()
                    {
                        self.collect_fields(object, &fragment.selection_set, visited, out);
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.directives) {
                        continue;
                    }
                    let matches = match &inline.type_condition {
                        Some(condition) => condition == object.name(),
                        None => true,
                    };
                    if matches {
                        self.collect_fields(object, &inline.selection_set, visited, out);
                    }
                }
            }
        }
    }

    fn should_include(&self, directives: &[Directive]) -> bool {
        for directive in directives {
            let condition = directive
                .arguments
                .get("if")
                .is_some_and(|value| self.truthy(value));
            match directive.name.as_str() {
                "skip" if condition => return false,
                "include" if directive.arguments.contains_key("if") && !condition => {
                    return false;
                }
                _ => {}
            }
        }
        true
    }

    fn truthy(&self, value: &Value) -> bool {
        match value {
            Value::Boolean(value) => *value,
            Value::Variable(name) => {
                matches!(self.variables.get(name), Some(serde_json::Value::Bool(true)))
            }
            _ => false,
        }
    }

    /// Resolves one field: coerces its arguments, invokes its resolver
    /// under a concurrency permit, and completes the returned value against
    /// the field's declared type.
    async fn resolve_field(
        &self,
        path: &[PathSegment],
        object: &'a ObjectType,
        field: &'a FieldSelection,
        parent: &serde_json::Value,
    ) -> Outcome {
        // Validation guarantees the definition exists; a bound table is
        // checked against the schema, so a missing resolver means the
        // engine was assembled inconsistently. That is request-fatal.
        let Some(definition) = object.field(&field.name) else {
            self.fatal.store(true, Ordering::Relaxed);
            self.report(
                QueryError::new(format!(
                    "no field {:?} on type {:?}",
                    field.name,
                    object.name(),
                ))
                .with_location(field.location),
            );
            return Outcome::Nulled;
        };
        let Some(resolver) = self.dispatch.get(object.name(), &field.name) else {
            self.fatal.store(true, Ordering::Relaxed);
            self.report(
                QueryError::new(format!(
                    "no resolver bound for {}.{}",
                    object.name(),
                    field.name,
                ))
                .with_location(field.location),
            );
            return Outcome::Nulled;
        };

        let mut arguments = IndexMap::new();
        for (name, input) in &definition.arguments {
            let document_value = field
                .arguments
                .get(name)
                .or(input.default.as_ref())
                .unwrap_or(&Value::Null);
            match document_value.coerce(&input.annotation, self.variables) {
                Ok(value) => {
                    arguments.insert(name.clone(), value);
                }
                Err(err) => {
                    self.report(
                        QueryError::new(format!("argument {name:?}: {err}"))
                            .with_location(field.location)
                            .with_path(path.to_vec()),
                    );
                    return Outcome::Nulled;
                }
            }
        }

        if self.check_cancelled() {
            return Outcome::Nulled;
        }

        let permit = self.limiter.acquire().await.ok();
        let span = self.tracer.trace_field(object.name(), &field.name, &arguments);
        let ctx = ResolverContext {
            parent: parent.clone(),
            arguments,
            cancellation: self.cancellation.clone(),
        };
        let result = AssertUnwindSafe(resolver(ctx)).catch_unwind().await;
        // Release the permit before descending: nested resolvers need
        // permits of their own, and holding this one across the subtree
        // can deadlock the pool.
        drop(permit);

        match result {
            Ok(Ok(value)) => {
                span.finish(None);
                self.complete_value(path.to_vec(), &definition.annotation, &field.selection_set, value)
                    .await
            }
            Ok(Err(failure)) => {
                let error = QueryError::new(failure.message())
                    .with_location(field.location)
                    .with_path(path.to_vec());
                span.finish(Some(&error));
                self.report(error);
                Outcome::Nulled
            }
            Err(payload) => {
                let context = format!("{}.{}", object.name(), field.name);
                self.logger.log_panic(&context, payload.as_ref());
                let error = QueryError::new(format!(
                    "panic occurred: {}",
                    panic_message(payload.as_ref()),
                ))
                .with_location(field.location)
                .with_path(path.to_vec());
                span.finish(Some(&error));
                self.report(error);
                Outcome::Nulled
            }
        }
    }

    /// Completes a resolver's value against the declared annotation:
    /// unwraps non-null, maps lists elementwise (concurrently), descends
    /// into object types, passes leaves through.
    ///
    /// Boxed to break the async recursion through [`Request::resolve_object`].
    fn complete_value<'s>(
        &'s self,
        path: Vec<PathSegment>,
        annotation: &'a TypeAnnotation,
        selections: &'a [Selection],
        value: serde_json::Value,
    ) -> BoxFuture<'s, Outcome>
    where
        'a: 's,
    {
        Box::pin(async move {
            match annotation {
                TypeAnnotation::NonNull(inner) => {
                    match self
                        .complete_value(path.clone(), inner, selections, value)
                        .await
                    {
                        Outcome::Value(serde_json::Value::Null) => {
                            self.report(
                                QueryError::new(format!(
                                    "cannot return null for non-null type {annotation}",
                                ))
                                .with_path(path),
                            );
                            Outcome::Nulled
                        }
                        outcome => outcome,
                    }
                }
                TypeAnnotation::List(inner) => match value {
                    serde_json::Value::Null => Outcome::Value(serde_json::Value::Null),
                    serde_json::Value::Array(items) => {
                        let results =
                            join_all(items.into_iter().enumerate().map(|(index, item)| {
                                let mut item_path = path.clone();
                                item_path.push(PathSegment::Index(index));
                                self.complete_value(item_path, inner, selections, item)
                            }))
                            .await;

                        let mut assembled = Vec::with_capacity(results.len());
                        for outcome in results {
                            match outcome {
                                Outcome::Value(value) => assembled.push(value),
                                Outcome::Nulled => {
                                    if inner.is_non_null() {
                                        return Outcome::Nulled;
                                    }
                                    assembled.push(serde_json::Value::Null);
                                }
                            }
                        }
                        Outcome::Value(serde_json::Value::Array(assembled))
                    }
                    _ => {
                        self.report(
                            QueryError::new(format!(
                                "resolver returned a non-list value for list type {annotation}",
                            ))
                            .with_path(path),
                        );
                        Outcome::Nulled
                    }
                },
                TypeAnnotation::Named(name) => {
                    if value.is_null() {
                        return Outcome::Value(serde_json::Value::Null);
                    }
                    match self.schema.type_definition(name) {
                        Some(definition) if definition.is_leaf() => Outcome::Value(value),
                        Some(TypeDefinition::Object(child)) => {
                            self.resolve_object(&path, child, selections, &value).await
                        }
                        _ => Outcome::Value(value),
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests;
