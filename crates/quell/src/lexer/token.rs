use crate::error::Location;

/// The kind of a scanned token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenKind {
    /// A name: `/[_A-Za-z][_0-9A-Za-z]*/`. Keywords are ordinary names.
    Name,
    IntValue,
    FloatValue,
    /// A string literal; the token text holds the unescaped content.
    StringValue,
    /// A single punctuation character (`!$&():=@[]{}|`).
    Punct(char),
    /// The `...` spread operator.
    Spread,
    /// End of input.
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "identifier"),
            Self::IntValue => write!(f, "integer literal"),
            Self::FloatValue => write!(f, "float literal"),
            Self::StringValue => write!(f, "string literal"),
            Self::Punct(ch) => write!(f, "`{ch}`"),
            Self::Spread => write!(f, "`...`"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// One token of lookahead, with the location it started at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: Location,
}
