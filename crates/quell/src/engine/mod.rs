//! The request pipeline.
//!
//! An [`Engine`] owns the parsed schema, the bound dispatch table, and the
//! engine-wide hooks. [`Engine::execute`] runs the full pipeline for one
//! request: parse, validate, select the operation, check required
//! variables, then hand the selection set to the executor. Every failure
//! mode short-circuits into a well-formed [`Response`]; nothing escapes as
//! an unhandled error.

use crate::error::QueryError;
use crate::exec::Request;
use crate::log::DefaultPanicLogger;
use crate::log::PanicLogger;
use crate::query;
use crate::query::Operation;
use crate::resolver::BindError;
use crate::resolver::DispatchTable;
use crate::resolver::Resolvers;
use crate::schema::Schema;
use crate::trace::NoopTracer;
use crate::trace::Tracer;
use crate::validation;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const DEFAULT_MAX_PARALLELISM: usize = 10;

/// The response envelope: `data` is omitted entirely when the root
/// absorbed a null or the request failed before execution; `errors` is
/// omitted when empty.
#[derive(Clone, Debug, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<QueryError>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl Response {
    fn failure(errors: Vec<QueryError>) -> Self {
        Self {
            data: None,
            errors,
            extensions: None,
        }
    }
}

/// Assembling an [`Engine`] failed.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("schema: {0}")]
    Schema(QueryError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("engine requires a schema")]
    MissingSchema,
}

/// A schema plus its bound resolvers, ready to execute requests.
///
/// Cheap to clone; all shared state is immutable behind `Arc`.
#[derive(Clone)]
pub struct Engine {
    schema: Arc<Schema>,
    dispatch: Option<Arc<DispatchTable>>,
    max_parallelism: usize,
    tracer: Arc<dyn Tracer>,
    logger: Arc<dyn PanicLogger>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Executes one request end to end.
    ///
    /// # Panics
    ///
    /// Panics when the engine was built without resolvers; executing
    /// against an unbound engine is a programming error, not a request
    /// failure.
    pub async fn execute(
        &self,
        cancellation: CancellationToken,
        query: &str,
        operation_name: Option<&str>,
        variables: serde_json::Map<String, serde_json::Value>,
    ) -> Response {
        let Some(dispatch) = &self.dispatch else {
            panic!("engine built without resolvers, can not execute");
        };

        let document = match query::parse(query) {
            Ok(document) => document,
            Err(error) => return Response::failure(vec![error]),
        };

        let errors = validation::validate(&self.schema, &document);
        if !errors.is_empty() {
            return Response::failure(errors);
        }

        let operation = match select_operation(&document, operation_name) {
            Ok(operation) => operation,
            Err(error) => return Response::failure(vec![error]),
        };

        let missing = missing_required_variables(operation, &variables);
        if !missing.is_empty() {
            return Response::failure(missing);
        }

        // Validation has already resolved every declared variable type
        // against the schema, so the annotations are passed through as
        // written.
        let mut variable_types = IndexMap::new();
        for variable in operation.variables().values() {
            variable_types.insert(
                variable.name().to_string(),
                variable.annotation().to_string(),
            );
        }
        let span = self
            .tracer
            .trace_query(query, operation_name, &variables, &variable_types);

        let request = Request::new(
            &self.schema,
            dispatch,
            &document,
            &variables,
            self.max_parallelism,
            cancellation,
            self.tracer.as_ref(),
            self.logger.as_ref(),
        );
        let (data, errors) = request.execute(operation).await;
        span.finish(&errors);

        Response {
            data,
            errors,
            extensions: None,
        }
    }
}

fn select_operation<'a>(
    document: &'a query::Document,
    operation_name: Option<&str>,
) -> Result<&'a Operation, QueryError> {
    let operations = document.operations();
    if operations.is_empty() {
        return Err(QueryError::new("no operations in query document"));
    }
    match operation_name {
        None if operations.len() > 1 => Err(QueryError::new(
            "more than one operation in query document and no operation name given",
        )),
        None => Ok(&operations[0]),
        Some(name) => document
            .operation_named(name)
            .ok_or_else(|| QueryError::new(format!("no operation with name {name:?}"))),
    }
}

/// A declared non-null variable without a default must be supplied by the
/// caller. Checked up front so execution never starts with an unusable
/// variable set.
fn missing_required_variables(
    operation: &Operation,
    variables: &serde_json::Map<String, serde_json::Value>,
) -> Vec<QueryError> {
    let mut errors = vec![];
    for variable in operation.variables().values() {
        let required = variable.annotation().is_non_null() && variable.default.is_none();
        if required && !variables.contains_key(variable.name()) {
            errors.push(
                QueryError::new(format!(
                    "Variable \"${}\" of required type \"{}\" was not provided.",
                    variable.name(),
                    variable.annotation(),
                ))
                .with_location(variable.location),
            );
        }
    }
    errors
}

/// Accumulates engine configuration; [`EngineBuilder::build`] parses the
/// schema and binds the resolvers.
#[derive(Default)]
pub struct EngineBuilder {
    schema_text: Option<String>,
    schema: Option<Schema>,
    resolvers: Option<Resolvers>,
    max_parallelism: Option<usize>,
    tracer: Option<Arc<dyn Tracer>>,
    logger: Option<Arc<dyn PanicLogger>>,
}

impl EngineBuilder {
    /// Schema definition text, parsed by [`EngineBuilder::build`].
    pub fn schema_text(mut self, text: impl Into<String>) -> Self {
        self.schema_text = Some(text.into());
        self
    }

    /// An already-parsed schema; takes precedence over schema text.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The resolver set to bind. An engine built without resolvers can
    /// only be used for parsing and validation, never executed.
    pub fn resolvers(mut self, resolvers: Resolvers) -> Self {
        self.resolvers = Some(resolvers);
        self
    }

    /// Upper bound on concurrently running resolvers per request.
    pub fn max_parallelism(mut self, limit: usize) -> Self {
        self.max_parallelism = Some(limit);
        self
    }

    pub fn tracer(mut self, tracer: impl Tracer + 'static) -> Self {
        self.tracer = Some(Arc::new(tracer));
        self
    }

    pub fn logger(mut self, logger: impl PanicLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn build(self) -> Result<Engine, BuildError> {
        let schema = match (self.schema, self.schema_text) {
            (Some(schema), _) => schema,
            (None, Some(text)) => Schema::parse(&text).map_err(BuildError::Schema)?,
            (None, None) => return Err(BuildError::MissingSchema),
        };
        let dispatch = match self.resolvers {
            Some(resolvers) => Some(Arc::new(resolvers.bind(&schema)?)),
            None => None,
        };
        Ok(Engine {
            schema: Arc::new(schema),
            dispatch,
            max_parallelism: self.max_parallelism.unwrap_or(DEFAULT_MAX_PARALLELISM),
            tracer: self.tracer.unwrap_or_else(|| Arc::new(NoopTracer)),
            logger: self.logger.unwrap_or_else(|| Arc::new(DefaultPanicLogger)),
        })
    }
}
