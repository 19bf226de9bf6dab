use crate::lexer::SyntaxError;
use serde::Serialize;

/// A line/column position within a query or schema document.
///
/// Both fields are 1-based. A `Location` is attached to every token the
/// lexer produces and is carried into every downstream error so diagnostics
/// can point back at the source text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// One step of a result path: either a field's response key or a list index.
///
/// Serializes untagged, so a path renders as e.g. `["friends", 0, "name"]`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// An error produced anywhere in the query pipeline.
///
/// `path` addresses the failing node in the result tree (empty for errors
/// raised before execution). `rule` names the validation rule that produced
/// the error; it is empty for syntax and execution errors and is excluded
/// from the wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,

    #[serde(skip)]
    pub rule: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
            rule: String::new(),
        }
    }

    /// Converts a lexical failure into a located error.
    ///
    /// This is the single point at which `SyntaxError` values (which carry
    /// only a message) pick up the lexer's current location. They must never
    /// escape the parsing boundary in any other form.
    pub(crate) fn syntax(err: SyntaxError, location: Location) -> Self {
        Self {
            message: format!("syntax error: {err}"),
            locations: vec![location],
            path: vec![],
            rule: String::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_is_field_exact() {
        let err = QueryError::new("boom")
            .with_location(Location::new(2, 7))
            .with_path(vec![
                PathSegment::Field("friends".to_string()),
                PathSegment::Index(0),
                PathSegment::Field("name".to_string()),
            ])
            .with_rule("SomeRule");

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "boom",
                "locations": [{"line": 2, "column": 7}],
                "path": ["friends", 0, "name"],
            }),
        );
    }

    #[test]
    fn empty_locations_and_path_are_omitted() {
        let err = QueryError::new("boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"message": "boom"}));
    }
}
