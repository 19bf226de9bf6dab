use crate::error::Location;
use crate::lexer::Lexer;
use crate::lexer::TokenKind;
use crate::value::Value;

fn lexer(source: &str) -> Lexer<'_> {
    let mut lexer = Lexer::new(source);
    lexer.advance().expect("first token should scan");
    lexer
}

#[test]
fn scans_names_and_punctuation() {
    let mut lx = lexer("{ name }");
    assert_eq!(lx.peek().kind, TokenKind::Punct('{'));
    lx.advance().unwrap();
    assert_eq!(lx.peek().kind, TokenKind::Name);
    assert_eq!(lx.peek().text, "name");
    lx.advance().unwrap();
    assert_eq!(lx.peek().kind, TokenKind::Punct('}'));
    lx.advance().unwrap();
    assert_eq!(lx.peek().kind, TokenKind::Eof);
}

#[test]
fn commas_are_insignificant() {
    let mut lx = lexer("a, b,,, c");
    let mut names = vec![];
    while lx.peek().kind == TokenKind::Name {
        names.push(lx.peek().text.clone());
        lx.advance().unwrap();
    }
    assert_eq!(names, ["a", "b", "c"]);
    assert_eq!(lx.peek().kind, TokenKind::Eof);
}

#[test]
fn locations_are_one_based_and_monotonic() {
    let mut lx = lexer("a\n  bb\tc");
    assert_eq!(lx.peek().location, Location::new(1, 1));
    lx.advance().unwrap();
    assert_eq!(lx.peek().location, Location::new(2, 3));
    let previous = lx.peek().location;
    lx.advance().unwrap();
    let current = lx.peek().location;
    assert_eq!(current.line, 2);
    assert!(current.column > previous.column);
}

#[test]
fn comment_line_populates_description_with_marker_and_one_space_stripped() {
    let mut lx = lexer("# a widget\nwidget");
    assert_eq!(lx.peek().text, "widget");
    assert_eq!(lx.take_description(), "a widget");
}

#[test]
fn consecutive_comment_lines_join_with_newline() {
    let mut lx = lexer("# line one\n#  line two\nname");
    // Exactly one leading space is stripped per line.
    assert_eq!(lx.take_description(), "line one\n line two");
    assert_eq!(lx.peek().text, "name");
}

#[test]
fn description_does_not_survive_past_next_token() {
    let mut lx = lexer("# described\nfirst second");
    lx.advance().unwrap();
    assert_eq!(lx.peek().text, "second");
    assert_eq!(lx.take_description(), "");
}

#[test]
fn consume_literal_tags_values_and_normalizes_null() {
    let mut lx = lexer("42 -1.5 \"hi\" true null RED");
    assert_eq!(lx.consume_literal().unwrap(), Value::Int("42".to_string()));
    assert_eq!(
        lx.consume_literal().unwrap(),
        Value::Float("-1.5".to_string()),
    );
    assert_eq!(
        lx.consume_literal().unwrap(),
        Value::String("hi".to_string()),
    );
    assert_eq!(lx.consume_literal().unwrap(), Value::Boolean(true));
    assert_eq!(lx.consume_literal().unwrap(), Value::Null);
    assert_eq!(lx.consume_literal().unwrap(), Value::Enum("RED".to_string()));
}

#[test]
fn string_escapes_are_resolved() {
    let mut lx = lexer(r#""a\n\"b\"A""#);
    assert_eq!(
        lx.consume_literal().unwrap(),
        Value::String("a\n\"b\"A".to_string()),
    );
}

#[test]
fn unterminated_string_is_a_syntax_error() {
    let mut lx = Lexer::new("\"oops");
    let err = lx.advance().unwrap_err();
    assert_eq!(err.message(), "unterminated string literal");
    assert_eq!(lx.location(), Location::new(1, 1));
}

#[test]
fn invalid_character_is_a_syntax_error_at_its_location() {
    let mut lx = Lexer::new("abc ~");
    lx.advance().unwrap();
    let err = lx.advance().unwrap_err();
    assert_eq!(err.message(), "unexpected character `~`");
    assert_eq!(lx.location(), Location::new(1, 5));
}

#[test]
fn lone_dots_do_not_form_a_spread() {
    let mut lx = Lexer::new("..");
    let err = lx.advance().unwrap_err();
    assert_eq!(err.message(), "unexpected `.`, expecting `...`");
}

#[test]
fn consume_keyword_reports_the_unexpected_text() {
    let mut lx = lexer("query");
    let err = lx.consume_keyword("fragment").unwrap_err();
    assert_eq!(err.message(), "unexpected \"query\", expecting \"fragment\"");
}

#[test]
fn consume_variable_name_requires_dollar_prefix() {
    let mut lx = lexer("$id");
    assert_eq!(lx.consume_variable_name().unwrap(), "id");

    let mut lx = lexer("id");
    assert!(lx.consume_variable_name().is_err());
}

#[test]
fn numbers_split_into_int_and_float() {
    let mut lx = lexer("0 12 -3 4.5 1e3 2E-2");
    let mut kinds = vec![];
    while lx.peek().kind != TokenKind::Eof {
        kinds.push(lx.peek().kind.clone());
        lx.advance().unwrap();
    }
    assert_eq!(
        kinds,
        [
            TokenKind::IntValue,
            TokenKind::IntValue,
            TokenKind::IntValue,
            TokenKind::FloatValue,
            TokenKind::FloatValue,
            TokenKind::FloatValue,
        ],
    );
}
