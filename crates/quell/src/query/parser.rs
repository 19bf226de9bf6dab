use super::Directive;
use super::Document;
use super::FieldSelection;
use super::FragmentDefinition;
use super::FragmentSpread;
use super::InlineFragment;
use super::Operation;
use super::OperationKind;
use super::Selection;
use super::VariableDefinition;
use crate::lexer::Lexer;
use crate::lexer::SyntaxError;
use crate::lexer::TokenKind;
use crate::types::TypeAnnotation;
use crate::value::Value;
use indexmap::IndexMap;

/// Recursive-descent parse of a whole executable document. Errors bubble as
/// bare `SyntaxError`s; `query::parse` attaches the location.
pub(super) fn document(lexer: &mut Lexer<'_>) -> Result<Document, SyntaxError> {
    lexer.advance()?;
    let mut operations = vec![];
    let mut fragments = IndexMap::new();

    while lexer.peek().kind != TokenKind::Eof {
        match &lexer.peek().kind {
            TokenKind::Punct('{') => {
                // Query shorthand.
                let location = lexer.peek().location;
                operations.push(Operation {
                    kind: OperationKind::Query,
                    name: None,
                    variables: IndexMap::new(),
                    directives: vec![],
                    selection_set: selection_set(lexer)?,
                    location,
                });
            }
            TokenKind::Name => match lexer.peek().text.as_str() {
                "query" => operations.push(operation(lexer, OperationKind::Query)?),
                "mutation" => operations.push(operation(lexer, OperationKind::Mutation)?),
                "subscription" => {
                    return Err(SyntaxError::new("subscriptions are not supported"));
                }
                "fragment" => {
                    let fragment = fragment_definition(lexer)?;
                    if fragments.contains_key(&fragment.name) {
                        return Err(SyntaxError::new(format!(
                            "fragment {:?} defined more than once",
                            fragment.name,
                        )));
                    }
                    fragments.insert(fragment.name.clone(), fragment);
                }
                other => {
                    return Err(SyntaxError::new(format!(
                        "unexpected {other:?}, expecting \"query\", \"mutation\" or \
                         \"fragment\"",
                    )));
                }
            },
            _ => {
                return Err(SyntaxError::new(format!(
                    "unexpected {:?}, expecting an operation or fragment definition",
                    lexer.peek().text,
                )));
            }
        }
    }

    Ok(Document {
        operations,
        fragments,
    })
}

fn operation(lexer: &mut Lexer<'_>, kind: OperationKind) -> Result<Operation, SyntaxError> {
    let location = lexer.peek().location;
    lexer.advance()?;

    let name = if lexer.peek().kind == TokenKind::Name {
        Some(lexer.consume_identifier()?)
    } else {
        None
    };

    let mut variables = IndexMap::new();
    if lexer.peek().kind == TokenKind::Punct('(') {
        lexer.advance()?;
        while lexer.peek().kind != TokenKind::Punct(')') {
            let location = lexer.peek().location;
            let name = lexer.consume_variable_name()?;
            lexer.consume_exact(TokenKind::Punct(':'))?;
            let annotation = TypeAnnotation::parse(lexer)?;
            let default = if lexer.peek().kind == TokenKind::Punct('=') {
                lexer.advance()?;
                Some(Value::parse(lexer)?)
            } else {
                None
            };
            variables.insert(
                name.clone(),
                VariableDefinition {
                    name,
                    annotation,
                    default,
                    location,
                },
            );
        }
        lexer.advance()?;
    }

    Ok(Operation {
        kind,
        name,
        variables,
        directives: directives(lexer)?,
        selection_set: selection_set(lexer)?,
        location,
    })
}

fn fragment_definition(lexer: &mut Lexer<'_>) -> Result<FragmentDefinition, SyntaxError> {
    let location = lexer.peek().location;
    lexer.consume_keyword("fragment")?;
    let name = lexer.consume_identifier()?;
    if name == "on" {
        return Err(SyntaxError::new("fragment cannot be named \"on\""));
    }
    lexer.consume_keyword("on")?;
    let type_condition = lexer.consume_identifier()?;
    Ok(FragmentDefinition {
        name,
        type_condition,
        directives: directives(lexer)?,
        selection_set: selection_set(lexer)?,
        location,
    })
}

fn selection_set(lexer: &mut Lexer<'_>) -> Result<Vec<Selection>, SyntaxError> {
    lexer.consume_exact(TokenKind::Punct('{'))?;
    let mut selections = vec![];
    while lexer.peek().kind != TokenKind::Punct('}') {
        selections.push(selection(lexer)?);
    }
    lexer.advance()?;
    Ok(selections)
}

fn selection(lexer: &mut Lexer<'_>) -> Result<Selection, SyntaxError> {
    if lexer.peek().kind == TokenKind::Spread {
        let location = lexer.peek().location;
        lexer.advance()?;

        if lexer.peek().kind == TokenKind::Name && lexer.peek().text != "on" {
            return Ok(Selection::FragmentSpread(FragmentSpread {
                name: lexer.consume_identifier()?,
                directives: directives(lexer)?,
                location,
            }));
        }

        let type_condition = if lexer.peek().kind == TokenKind::Name {
            lexer.consume_keyword("on")?;
            Some(lexer.consume_identifier()?)
        } else {
            None
        };
        return Ok(Selection::InlineFragment(InlineFragment {
            type_condition,
            directives: directives(lexer)?,
            selection_set: selection_set(lexer)?,
            location,
        }));
    }

    let location = lexer.peek().location;
    let mut alias = None;
    let mut name = lexer.consume_identifier()?;
    if lexer.peek().kind == TokenKind::Punct(':') {
        lexer.advance()?;
        alias = Some(name);
        name = lexer.consume_identifier()?;
    }

    let arguments = arguments(lexer)?;
    let directives = directives(lexer)?;
    let selection_set = if lexer.peek().kind == TokenKind::Punct('{') {
        selection_set(lexer)?
    } else {
        vec![]
    };

    Ok(Selection::Field(FieldSelection {
        alias,
        name,
        arguments,
        directives,
        selection_set,
        location,
    }))
}

pub(crate) fn arguments(
    lexer: &mut Lexer<'_>,
) -> Result<IndexMap<String, Value>, SyntaxError> {
    let mut arguments = IndexMap::new();
    if lexer.peek().kind == TokenKind::Punct('(') {
        lexer.advance()?;
        while lexer.peek().kind != TokenKind::Punct(')') {
            let name = lexer.consume_identifier()?;
            lexer.consume_exact(TokenKind::Punct(':'))?;
            arguments.insert(name, Value::parse(lexer)?);
        }
        lexer.advance()?;
    }
    Ok(arguments)
}

pub(crate) fn directives(lexer: &mut Lexer<'_>) -> Result<Vec<Directive>, SyntaxError> {
    let mut directives = vec![];
    while lexer.peek().kind == TokenKind::Punct('@') {
        let location = lexer.peek().location;
        lexer.advance()?;
        let name = lexer.consume_identifier()?;
        directives.push(Directive {
            name,
            arguments: arguments(lexer)?,
            location,
        });
    }
    Ok(directives)
}
