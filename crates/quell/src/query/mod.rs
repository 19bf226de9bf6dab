//! The executable-document AST and its parser.
//!
//! [`parse`] is the single entry point and the recovery boundary for
//! lexical failures: any [`SyntaxError`](crate::lexer::SyntaxError) raised
//! while scanning or descending is caught here, given the lexer's current
//! location, and returned as a located [`QueryError`]. Parsing fails
//! closed; a malformed document never reaches the validator or executor.

pub(crate) mod parser;

use crate::error::Location;
use crate::error::QueryError;
use crate::lexer::Lexer;
use crate::types::TypeAnnotation;
use crate::value::Value;
use indexmap::IndexMap;

/// Parses an executable document.
pub fn parse(text: &str) -> Result<Document, QueryError> {
    let mut lexer = Lexer::new(text);
    parser::document(&mut lexer).map_err(|err| QueryError::syntax(err, lexer.location()))
}

/// A parsed executable document: an ordered list of operations plus the
/// fragments they may spread. Read-only after parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub(crate) operations: Vec<Operation>,
    pub(crate) fragments: IndexMap<String, FragmentDefinition>,
}

impl Document {
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn fragments(&self) -> &IndexMap<String, FragmentDefinition> {
        &self.fragments
    }

    pub(crate) fn operation_named(&self, name: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.name.as_deref() == Some(name))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationKind {
    Query,
    Mutation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub(crate) kind: OperationKind,
    pub(crate) name: Option<String>,
    pub(crate) variables: IndexMap<String, VariableDefinition>,
    pub(crate) directives: Vec<Directive>,
    pub(crate) selection_set: Vec<Selection>,
    pub(crate) location: Location,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn variables(&self) -> &IndexMap<String, VariableDefinition> {
        &self.variables
    }

    pub fn selection_set(&self) -> &[Selection] {
        &self.selection_set
    }
}

/// A declared operation variable: `$name: Type = default`.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    pub(crate) name: String,
    pub(crate) annotation: TypeAnnotation,
    pub(crate) default: Option<Value>,
    pub(crate) location: Location,
}

impl VariableDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotation(&self) -> &TypeAnnotation {
        &self.annotation
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub(crate) name: String,
    pub(crate) arguments: IndexMap<String, Value>,
    pub(crate) location: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSelection {
    pub(crate) alias: Option<String>,
    pub(crate) name: String,
    pub(crate) arguments: IndexMap<String, Value>,
    pub(crate) directives: Vec<Directive>,
    pub(crate) selection_set: Vec<Selection>,
    pub(crate) location: Location,
}

impl FieldSelection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The key this field contributes to the result object: the alias when
    /// present, the field name otherwise.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread {
    pub(crate) name: String,
    pub(crate) directives: Vec<Directive>,
    pub(crate) location: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment {
    pub(crate) type_condition: Option<String>,
    pub(crate) directives: Vec<Directive>,
    pub(crate) selection_set: Vec<Selection>,
    pub(crate) location: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentDefinition {
    pub(crate) name: String,
    pub(crate) type_condition: String,
    pub(crate) directives: Vec<Directive>,
    pub(crate) selection_set: Vec<Selection>,
    pub(crate) location: Location,
}

#[cfg(test)]
mod tests;
