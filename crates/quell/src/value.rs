use crate::lexer::Lexer;
use crate::lexer::SyntaxError;
use crate::lexer::TokenKind;
use crate::types::TypeAnnotation;
use indexmap::IndexMap;

/// A value as written in a document: a tagged literal, a variable
/// reference, or a composite of those.
///
/// Numeric literals keep their raw text; conversion happens at coercion
/// time so malformed numbers surface as located coercion errors rather
/// than lexer panics.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Variable(String),
    Int(String),
    Float(String),
    String(String),
    Boolean(bool),
    Enum(String),
    Null,
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
}

/// A document value could not be converted to a runtime value.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct CoercionError {
    message: String,
}

impl CoercionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Value {
    /// Parses a document value: a variable reference, a literal, or a
    /// list/object composite of those.
    pub(crate) fn parse(lexer: &mut Lexer<'_>) -> Result<Self, SyntaxError> {
        match lexer.peek().kind {
            TokenKind::Punct('$') => Ok(Self::Variable(lexer.consume_variable_name()?)),
            TokenKind::Punct('[') => {
                lexer.advance()?;
                let mut items = vec![];
                while lexer.peek().kind != TokenKind::Punct(']') {
                    items.push(Self::parse(lexer)?);
                }
                lexer.advance()?;
                Ok(Self::List(items))
            }
            TokenKind::Punct('{') => {
                lexer.advance()?;
                let mut fields = IndexMap::new();
                while lexer.peek().kind != TokenKind::Punct('}') {
                    let name = lexer.consume_identifier()?;
                    lexer.consume_exact(TokenKind::Punct(':'))?;
                    fields.insert(name, Self::parse(lexer)?);
                }
                lexer.advance()?;
                Ok(Self::Object(fields))
            }
            _ => lexer.consume_literal(),
        }
    }

    /// Coerces this document value to a runtime value against `annotation`,
    /// substituting `variables` for variable references.
    ///
    /// An absent variable coerces to null. A null (or absent) result for a
    /// non-null annotation is an error.
    pub fn coerce(
        &self,
        annotation: &TypeAnnotation,
        variables: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value, CoercionError> {
        let value = self.to_runtime(variables)?;
        check_non_null(&value, annotation)?;
        Ok(value)
    }

    fn to_runtime(
        &self,
        variables: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value, CoercionError> {
        Ok(match self {
            Self::Variable(name) => variables
                .get(name)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
            Self::Int(text) => {
                let parsed: i64 = text.parse().map_err(|_| {
                    CoercionError::new(format!("invalid integer literal {text:?}"))
                })?;
                serde_json::Value::from(parsed)
            }
            Self::Float(text) => {
                let parsed: f64 = text.parse().map_err(|_| {
                    CoercionError::new(format!("invalid float literal {text:?}"))
                })?;
                serde_json::Value::from(parsed)
            }
            Self::String(text) => serde_json::Value::from(text.clone()),
            Self::Boolean(value) => serde_json::Value::from(*value),
            Self::Enum(name) => serde_json::Value::from(name.clone()),
            Self::Null => serde_json::Value::Null,
            Self::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.to_runtime(variables))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Object(fields) => {
                let mut map = serde_json::Map::new();
                for (key, value) in fields {
                    map.insert(key.clone(), value.to_runtime(variables)?);
                }
                serde_json::Value::Object(map)
            }
        })
    }
}

fn check_non_null(
    value: &serde_json::Value,
    annotation: &TypeAnnotation,
) -> Result<(), CoercionError> {
    match annotation {
        TypeAnnotation::NonNull(inner) => {
            if value.is_null() {
                return Err(CoercionError::new(format!(
                    "cannot pass null for non-null type {annotation}",
                )));
            }
            check_non_null(value, inner)
        }
        TypeAnnotation::List(inner) => {
            if let serde_json::Value::Array(items) = value {
                for item in items {
                    check_non_null(item, inner)?;
                }
            }
            Ok(())
        }
        TypeAnnotation::Named(_) => Ok(()),
    }
}
