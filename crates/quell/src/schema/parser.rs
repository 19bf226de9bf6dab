use super::EnumType;
use super::EnumValueDefinition;
use super::FieldDefinition;
use super::InputObjectType;
use super::InputValueDefinition;
use super::ObjectType;
use super::ScalarType;
use super::Schema;
use super::TypeDefinition;
use crate::lexer::Lexer;
use crate::lexer::SyntaxError;
use crate::lexer::TokenKind;
use crate::query::parser::arguments;
use crate::types::TypeAnnotation;
use crate::value::Value;
use indexmap::IndexMap;

const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

pub(super) fn schema_document(lexer: &mut Lexer<'_>) -> Result<Schema, SyntaxError> {
    lexer.advance()?;

    let mut types: IndexMap<String, TypeDefinition> = IndexMap::new();
    for name in BUILTIN_SCALARS {
        types.insert(
            name.to_string(),
            TypeDefinition::Scalar(ScalarType {
                name: name.to_string(),
                description: String::new(),
            }),
        );
    }

    let mut query_type = None;
    let mut mutation_type = None;

    while lexer.peek().kind != TokenKind::Eof {
        let description = lexer.take_description();
        match lexer.peek().text.as_str() {
            "schema" => {
                lexer.advance()?;
                lexer.consume_exact(TokenKind::Punct('{'))?;
                while lexer.peek().kind != TokenKind::Punct('}') {
                    let role = lexer.consume_identifier()?;
                    lexer.consume_exact(TokenKind::Punct(':'))?;
                    let name = lexer.consume_identifier()?;
                    match role.as_str() {
                        "query" => query_type = Some(name),
                        "mutation" => mutation_type = Some(name),
                        other => {
                            return Err(SyntaxError::new(format!(
                                "unexpected operation type {other:?} in schema definition",
                            )));
                        }
                    }
                }
                lexer.advance()?;
            }
            "scalar" => {
                lexer.advance()?;
                let name = lexer.consume_identifier()?;
                skip_directives(lexer)?;
                insert(
                    &mut types,
                    TypeDefinition::Scalar(ScalarType { name, description }),
                )?;
            }
            "type" => {
                lexer.advance()?;
                let name = lexer.consume_identifier()?;
                skip_directives(lexer)?;
                let fields = field_definitions(lexer)?;
                insert(
                    &mut types,
                    TypeDefinition::Object(ObjectType {
                        name,
                        description,
                        fields,
                    }),
                )?;
            }
            "enum" => {
                lexer.advance()?;
                let name = lexer.consume_identifier()?;
                skip_directives(lexer)?;
                lexer.consume_exact(TokenKind::Punct('{'))?;
                let mut values = IndexMap::new();
                while lexer.peek().kind != TokenKind::Punct('}') {
                    let description = lexer.take_description();
                    let value_name = lexer.consume_identifier()?;
                    skip_directives(lexer)?;
                    values.insert(
                        value_name.clone(),
                        EnumValueDefinition {
                            name: value_name,
                            description,
                        },
                    );
                }
                lexer.advance()?;
                insert(
                    &mut types,
                    TypeDefinition::Enum(EnumType {
                        name,
                        description,
                        values,
                    }),
                )?;
            }
            "input" => {
                lexer.advance()?;
                let name = lexer.consume_identifier()?;
                skip_directives(lexer)?;
                lexer.consume_exact(TokenKind::Punct('{'))?;
                let mut fields = IndexMap::new();
                while lexer.peek().kind != TokenKind::Punct('}') {
                    let field = input_value_definition(lexer)?;
                    fields.insert(field.name.clone(), field);
                }
                lexer.advance()?;
                insert(
                    &mut types,
                    TypeDefinition::InputObject(InputObjectType {
                        name,
                        description,
                        fields,
                    }),
                )?;
            }
            "interface" | "union" | "directive" | "extend" => {
                return Err(SyntaxError::new(format!(
                    "{:?} definitions are not supported",
                    lexer.peek().text,
                )));
            }
            other => {
                return Err(SyntaxError::new(format!(
                    "unexpected {other:?}, expecting a type definition",
                )));
            }
        }
    }

    Ok(Schema {
        query_type: query_type.unwrap_or_else(|| "Query".to_string()),
        mutation_type: mutation_type.or_else(|| default_mutation_type(&types)),
        types,
    })
}

/// Without an explicit schema definition, a type named `Mutation` takes the
/// mutation root by convention.
fn default_mutation_type(types: &IndexMap<String, TypeDefinition>) -> Option<String> {
    match types.get("Mutation") {
        Some(TypeDefinition::Object(_)) => Some("Mutation".to_string()),
        _ => None,
    }
}

fn field_definitions(
    lexer: &mut Lexer<'_>,
) -> Result<IndexMap<String, FieldDefinition>, SyntaxError> {
    lexer.consume_exact(TokenKind::Punct('{'))?;
    let mut fields = IndexMap::new();
    while lexer.peek().kind != TokenKind::Punct('}') {
        let description = lexer.take_description();
        let location = lexer.peek().location;
        let name = lexer.consume_identifier()?;

        let mut arguments = IndexMap::new();
        if lexer.peek().kind == TokenKind::Punct('(') {
            lexer.advance()?;
            while lexer.peek().kind != TokenKind::Punct(')') {
                let argument = input_value_definition(lexer)?;
                arguments.insert(argument.name.clone(), argument);
            }
            lexer.advance()?;
        }

        lexer.consume_exact(TokenKind::Punct(':'))?;
        let annotation = TypeAnnotation::parse(lexer)?;
        skip_directives(lexer)?;

        fields.insert(
            name.clone(),
            FieldDefinition {
                name,
                description,
                arguments,
                annotation,
                location,
            },
        );
    }
    lexer.advance()?;
    Ok(fields)
}

fn input_value_definition(
    lexer: &mut Lexer<'_>,
) -> Result<InputValueDefinition, SyntaxError> {
    let description = lexer.take_description();
    let location = lexer.peek().location;
    let name = lexer.consume_identifier()?;
    lexer.consume_exact(TokenKind::Punct(':'))?;
    let annotation = TypeAnnotation::parse(lexer)?;
    let default = if lexer.peek().kind == TokenKind::Punct('=') {
        lexer.advance()?;
        Some(Value::parse(lexer)?)
    } else {
        None
    };
    skip_directives(lexer)?;
    Ok(InputValueDefinition {
        name,
        description,
        annotation,
        default,
        location,
    })
}

/// SDL directive annotations are accepted and discarded; the engine does
/// not interpret them.
fn skip_directives(lexer: &mut Lexer<'_>) -> Result<(), SyntaxError> {
    while lexer.peek().kind == TokenKind::Punct('@') {
        lexer.advance()?;
        lexer.consume_identifier()?;
        arguments(lexer)?;
    }
    Ok(())
}

fn insert(
    types: &mut IndexMap<String, TypeDefinition>,
    definition: TypeDefinition,
) -> Result<(), SyntaxError> {
    let name = definition.name().to_string();
    if types.insert(name.clone(), definition).is_some() {
        return Err(SyntaxError::new(format!(
            "type {name:?} defined more than once",
        )));
    }
    Ok(())
}
