use crate::lexer::Lexer;
use crate::lexer::SyntaxError;
use crate::lexer::TokenKind;

/// A type annotation as written in a document: a named type, a list
/// wrapper, or a non-null wrapper.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeAnnotation {
    Named(String),
    List(Box<TypeAnnotation>),
    NonNull(Box<TypeAnnotation>),
}

impl TypeAnnotation {
    /// Parses an annotation such as `[Episode!]!` from the lexer.
    pub(crate) fn parse(lexer: &mut Lexer<'_>) -> Result<Self, SyntaxError> {
        let parsed = if lexer.peek().kind == TokenKind::Punct('[') {
            lexer.advance()?;
            let inner = Self::parse(lexer)?;
            lexer.consume_exact(TokenKind::Punct(']'))?;
            Self::List(Box::new(inner))
        } else {
            Self::Named(lexer.consume_identifier()?)
        };

        if lexer.peek().kind == TokenKind::Punct('!') {
            lexer.advance()?;
            Ok(Self::NonNull(Box::new(parsed)))
        } else {
            Ok(parsed)
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// The name at the root of the annotation, ignoring wrappers.
    pub fn named_root(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.named_root(),
        }
    }
}

impl std::fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}
