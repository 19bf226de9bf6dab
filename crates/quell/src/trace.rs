//! Request and field tracing hooks.
//!
//! An engine carries one [`Tracer`]. For every request it opens a query
//! span before execution starts, and the executor opens a field span around
//! every resolver invocation. Spans are finished exactly once, with the
//! errors (if any) the traced unit produced. [`NoopTracer`] is the default;
//! [`TracingTracer`] emits through the `tracing` ecosystem.

use crate::error::QueryError;
use indexmap::IndexMap;
use std::time::Instant;

/// An open span covering one whole request.
pub trait QuerySpan: Send {
    fn finish(self: Box<Self>, errors: &[QueryError]);
}

/// An open span covering one resolver invocation.
pub trait FieldSpan: Send {
    fn finish(self: Box<Self>, error: Option<&QueryError>);
}

pub trait Tracer: Send + Sync {
    fn trace_query(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: &serde_json::Map<String, serde_json::Value>,
        variable_types: &IndexMap<String, String>,
    ) -> Box<dyn QuerySpan>;

    fn trace_field(
        &self,
        parent_type: &str,
        field_name: &str,
        arguments: &IndexMap<String, serde_json::Value>,
    ) -> Box<dyn FieldSpan>;
}

/// Discards every span.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

struct NoopSpan;

impl QuerySpan for NoopSpan {
    fn finish(self: Box<Self>, _errors: &[QueryError]) {}
}

impl FieldSpan for NoopSpan {
    fn finish(self: Box<Self>, _error: Option<&QueryError>) {}
}

impl Tracer for NoopTracer {
    fn trace_query(
        &self,
        _query: &str,
        _operation_name: Option<&str>,
        _variables: &serde_json::Map<String, serde_json::Value>,
        _variable_types: &IndexMap<String, String>,
    ) -> Box<dyn QuerySpan> {
        Box::new(NoopSpan)
    }

    fn trace_field(
        &self,
        _parent_type: &str,
        _field_name: &str,
        _arguments: &IndexMap<String, serde_json::Value>,
    ) -> Box<dyn FieldSpan> {
        Box::new(NoopSpan)
    }
}

/// Emits one `tracing` event per finished span, carrying the unit's name,
/// its wall-clock duration, and how many errors it produced.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTracer;

struct TracingQuerySpan {
    operation_name: Option<String>,
    started: Instant,
}

impl QuerySpan for TracingQuerySpan {
    fn finish(self: Box<Self>, errors: &[QueryError]) {
        tracing::debug!(
            operation_name = self.operation_name.as_deref().unwrap_or(""),
            elapsed_us = self.started.elapsed().as_micros() as u64,
            errors = errors.len() as u64,
            "query finished",
        );
    }
}

struct TracingFieldSpan {
    parent_type: String,
    field_name: String,
    started: Instant,
}

impl FieldSpan for TracingFieldSpan {
    fn finish(self: Box<Self>, error: Option<&QueryError>) {
        tracing::trace!(
            parent_type = self.parent_type.as_str(),
            field_name = self.field_name.as_str(),
            elapsed_us = self.started.elapsed().as_micros() as u64,
            error = error.map(|err| err.message.as_str()).unwrap_or(""),
            "field resolved",
        );
    }
}

impl Tracer for TracingTracer {
    fn trace_query(
        &self,
        _query: &str,
        operation_name: Option<&str>,
        _variables: &serde_json::Map<String, serde_json::Value>,
        _variable_types: &IndexMap<String, String>,
    ) -> Box<dyn QuerySpan> {
        Box::new(TracingQuerySpan {
            operation_name: operation_name.map(str::to_string),
            started: Instant::now(),
        })
    }

    fn trace_field(
        &self,
        parent_type: &str,
        field_name: &str,
        _arguments: &IndexMap<String, serde_json::Value>,
    ) -> Box<dyn FieldSpan> {
        Box::new(TracingFieldSpan {
            parent_type: parent_type.to_string(),
            field_name: field_name.to_string(),
            started: Instant::now(),
        })
    }
}
