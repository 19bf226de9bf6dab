//! The query-language tokenizer.
//!
//! [`Lexer`] scans raw document text into a stream of typed tokens with one
//! token of lookahead. Commas and whitespace are insignificant and skipped
//! transparently. `#` comment lines are not tokens: their content accumulates
//! into a description buffer that callers read with
//! [`Lexer::take_description`] while the described token is current.
//!
//! All lexical failures are [`SyntaxError`] values carrying only a message.
//! They are confined to the parsing call stack: the parse entry points catch
//! them and attach the lexer's current location, producing a located
//! [`QueryError`](crate::QueryError). Nothing below the parse boundary
//! panics.

mod syntax_error;
mod token;

pub use syntax_error::SyntaxError;
pub use token::Token;
pub use token::TokenKind;

use crate::error::Location;
use crate::value::Value;

/// Single-lookahead lexer over query or schema text.
///
/// After construction, [`Lexer::advance`] must be called once to scan the
/// first token; the parse entry points do this before descending.
pub struct Lexer<'src> {
    source: &'src str,

    /// Byte offset of the scan head into `source`.
    offset: usize,

    /// 1-based position of the scan head.
    line: usize,
    column: usize,

    /// The lookahead token.
    current: Token,

    /// Comment text accumulated since the last `advance`.
    description: String,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
            current: Token {
                kind: TokenKind::Eof,
                text: String::new(),
                location: Location::new(1, 1),
            },
            description: String::new(),
        }
    }

    /// Returns the current lookahead token without consuming it.
    pub fn peek(&self) -> &Token {
        &self.current
    }

    /// The location errors should be attributed to: the current token's.
    pub fn location(&self) -> Location {
        self.current.location
    }

    /// Discards the current token and scans the next one.
    ///
    /// Insignificant separators (whitespace, commas) are skipped. Comment
    /// lines are peeled off into the description buffer, which this call
    /// first clears: a description never survives past the next non-comment
    /// token.
    pub fn advance(&mut self) -> Result<(), SyntaxError> {
        self.description.clear();
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\n' | '\r' | '\u{FEFF}' | ',') => {
                    self.bump();
                }
                Some('#') => self.take_comment_line(),
                _ => break,
            }
        }
        self.current = self.scan_token()?;
        Ok(())
    }

    /// Returns the accumulated description text, clearing the buffer.
    ///
    /// Call while the described token is still current (i.e. before
    /// consuming it): the buffer is implicitly cleared by the next
    /// [`Lexer::advance`].
    pub fn take_description(&mut self) -> String {
        std::mem::take(&mut self.description)
    }

    /// Consumes the current token, which must be an identifier, and returns
    /// its text.
    pub fn consume_identifier(&mut self) -> Result<String, SyntaxError> {
        if self.current.kind != TokenKind::Name {
            return Err(self.unexpected("identifier"));
        }
        let text = std::mem::take(&mut self.current.text);
        self.advance()?;
        Ok(text)
    }

    /// Consumes the current token, which must be the identifier `expected`.
    pub fn consume_keyword(&mut self, expected: &str) -> Result<(), SyntaxError> {
        if self.current.kind != TokenKind::Name || self.current.text != expected {
            return Err(self.unexpected(&format!("{expected:?}")));
        }
        self.advance()
    }

    /// Consumes a `$name` variable reference and returns the bare name.
    pub fn consume_variable_name(&mut self) -> Result<String, SyntaxError> {
        self.consume_exact(TokenKind::Punct('$'))?;
        self.consume_identifier()
    }

    /// Consumes a literal-like token as a tagged literal value.
    ///
    /// The identifiers `true`, `false` and `null` are normalized to boolean
    /// and explicit-null values; any other identifier is an enum literal.
    pub fn consume_literal(&mut self) -> Result<Value, SyntaxError> {
        let value = match &self.current.kind {
            TokenKind::IntValue => Value::Int(self.current.text.clone()),
            TokenKind::FloatValue => Value::Float(self.current.text.clone()),
            TokenKind::StringValue => Value::String(self.current.text.clone()),
            TokenKind::Name => match self.current.text.as_str() {
                "null" => Value::Null,
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                other => Value::Enum(other.to_string()),
            },
            _ => return Err(self.unexpected("literal")),
        };
        self.advance()?;
        Ok(value)
    }

    /// Consumes the current token, which must have exactly `expected` kind.
    pub fn consume_exact(&mut self, expected: TokenKind) -> Result<(), SyntaxError> {
        if self.current.kind != expected {
            return Err(self.unexpected(&expected.to_string()));
        }
        self.advance()
    }

    fn unexpected(&self, expecting: &str) -> SyntaxError {
        match self.current.kind {
            TokenKind::Eof => {
                SyntaxError::new(format!("unexpected end of input, expecting {expecting}"))
            }
            _ => SyntaxError::new(format!(
                "unexpected {:?}, expecting {expecting}",
                self.current.text,
            )),
        }
    }

    // -------------------------------------------------------------------
    // Scanning
    // -------------------------------------------------------------------

    fn peek_char(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_char_nth(&self, n: usize) -> Option<char> {
        self.source[self.offset..].chars().nth(n)
    }

    /// Consumes one character, updating line/column tracking. `\r\n` counts
    /// as a single newline.
    fn bump(&mut self) {
        let Some(ch) = self.peek_char() else {
            return;
        };
        self.offset += ch.len_utf8();
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' => {
                self.line += 1;
                self.column = 1;
                if self.peek_char() == Some('\n') {
                    self.offset += 1;
                }
            }
            _ => self.column += 1,
        }
    }

    /// Consumes a `#` comment line into the description buffer, stripping
    /// exactly one leading space and joining lines with `\n`.
    fn take_comment_line(&mut self) {
        self.bump();
        if self.peek_char() == Some(' ') {
            self.bump();
        }
        let start = self.offset;
        while let Some(ch) = self.peek_char() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            self.bump();
        }
        if !self.description.is_empty() {
            self.description.push('\n');
        }
        self.description.push_str(&self.source[start..self.offset]);
    }

    fn scan_token(&mut self) -> Result<Token, SyntaxError> {
        let location = Location::new(self.line, self.column);
        let Some(ch) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                location,
            });
        };

        match ch {
            '!' | '$' | '&' | '(' | ')' | ':' | '=' | '@' | '[' | ']' | '{' | '}' | '|' => {
                self.bump();
                Ok(Token {
                    kind: TokenKind::Punct(ch),
                    text: ch.to_string(),
                    location,
                })
            }
            '.' => self.scan_spread(location),
            '"' => self.scan_string(location),
            c if is_name_start(c) => Ok(self.scan_name(location)),
            c if c == '-' || c.is_ascii_digit() => self.scan_number(location),
            other => Err(self.fail(location, format!("unexpected character `{other}`"))),
        }
    }

    fn scan_spread(&mut self, location: Location) -> Result<Token, SyntaxError> {
        for _ in 0..3 {
            if self.peek_char() != Some('.') {
                return Err(self.fail(location, "unexpected `.`, expecting `...`"));
            }
            self.bump();
        }
        Ok(Token {
            kind: TokenKind::Spread,
            text: "...".to_string(),
            location,
        })
    }

    fn scan_name(&mut self, location: Location) -> Token {
        let start = self.offset;
        self.bump();
        while let Some(ch) = self.peek_char() {
            if !is_name_continue(ch) {
                break;
            }
            self.bump();
        }
        Token {
            kind: TokenKind::Name,
            text: self.source[start..self.offset].to_string(),
            location,
        }
    }

    fn scan_number(&mut self, location: Location) -> Result<Token, SyntaxError> {
        let start = self.offset;
        let mut is_float = false;

        if self.peek_char() == Some('-') {
            self.bump();
        }
        if !matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            return Err(self.fail(location, "unexpected `-`"));
        }
        while let Some(ch) = self.peek_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            self.bump();
        }

        if self.peek_char() == Some('.')
            && matches!(self.peek_char_nth(1), Some(c) if c.is_ascii_digit())
        {
            is_float = true;
            self.bump();
            while let Some(ch) = self.peek_char() {
                if !ch.is_ascii_digit() {
                    break;
                }
                self.bump();
            }
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            is_float = true;
            self.bump();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.bump();
            }
            if !matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                return Err(self.fail(
                    location,
                    "invalid number: exponent must have at least one digit",
                ));
            }
            while let Some(ch) = self.peek_char() {
                if !ch.is_ascii_digit() {
                    break;
                }
                self.bump();
            }
        }

        Ok(Token {
            kind: if is_float {
                TokenKind::FloatValue
            } else {
                TokenKind::IntValue
            },
            text: self.source[start..self.offset].to_string(),
            location,
        })
    }

    /// Scans a single-line string literal, resolving escape sequences. The
    /// token text is the unescaped content without the surrounding quotes.
    fn scan_string(&mut self, location: Location) -> Result<Token, SyntaxError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n' | '\r') => {
                    return Err(self.fail(location, "unterminated string literal"));
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    let Some(esc) = self.peek_char() else {
                        return Err(self.fail(location, "unterminated string literal"));
                    };
                    self.bump();
                    match esc {
                        '"' => text.push('"'),
                        '\\' => text.push('\\'),
                        '/' => text.push('/'),
                        'b' => text.push('\u{0008}'),
                        'f' => text.push('\u{000C}'),
                        'n' => text.push('\n'),
                        'r' => text.push('\r'),
                        't' => text.push('\t'),
                        'u' => {
                            let mut code = 0u32;
                            for _ in 0..4 {
                                let Some(digit) =
                                    self.peek_char().and_then(|c| c.to_digit(16))
                                else {
                                    return Err(self.fail(
                                        location,
                                        "invalid unicode escape sequence",
                                    ));
                                };
                                code = code * 16 + digit;
                                self.bump();
                            }
                            let Some(ch) = char::from_u32(code) else {
                                return Err(
                                    self.fail(location, "invalid unicode escape sequence")
                                );
                            };
                            text.push(ch);
                        }
                        other => {
                            return Err(self.fail(
                                location,
                                format!("invalid escape sequence `\\{other}`"),
                            ));
                        }
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.bump();
                }
            }
        }
        Ok(Token {
            kind: TokenKind::StringValue,
            text,
            location,
        })
    }

    /// Records a scan failure. The current token's location is pointed at
    /// the failure site so the parse boundary attaches the right position.
    fn fail(&mut self, location: Location, message: impl Into<String>) -> SyntaxError {
        self.current = Token {
            kind: TokenKind::Eof,
            text: String::new(),
            location,
        };
        SyntaxError::new(message)
    }
}

fn is_name_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

fn is_name_continue(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests;
