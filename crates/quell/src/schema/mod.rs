//! The schema type graph.
//!
//! Schema definition text is scanned with the same [`Lexer`] the query
//! parser uses, so `#` comment lines immediately preceding a type, field,
//! argument or enum value become that definition's description. After
//! parsing, every named type reference is resolved; dangling names fail the
//! whole schema with a located error.

mod parser;

use crate::error::QueryError;
use crate::lexer::Lexer;
use crate::types::TypeAnnotation;
use crate::value::Value;
use indexmap::IndexMap;

/// A parsed, reference-resolved schema. Immutable once built; shared
/// (behind `Arc`) across concurrent requests.
#[derive(Clone, Debug)]
pub struct Schema {
    pub(crate) types: IndexMap<String, TypeDefinition>,
    pub(crate) query_type: String,
    pub(crate) mutation_type: Option<String>,
}

impl Schema {
    /// Parses schema definition text and resolves all type references.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let mut lexer = Lexer::new(text);
        let schema = parser::schema_document(&mut lexer)
            .map_err(|err| QueryError::syntax(err, lexer.location()))?;
        schema.resolve_references()?;
        Ok(schema)
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        match self.types.get(name) {
            Some(TypeDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values().filter_map(|def| match def {
            TypeDefinition::Object(object) => Some(object),
            _ => None,
        })
    }

    /// Name of the root query type.
    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    /// Checks that an annotation's named root resolves against this schema.
    pub(crate) fn resolve_annotation(
        &self,
        annotation: &TypeAnnotation,
    ) -> Result<(), QueryError> {
        let root = annotation.named_root();
        if self.types.contains_key(root) {
            Ok(())
        } else {
            Err(QueryError::new(format!("cannot resolve type {root:?}")))
        }
    }

    fn resolve_references(&self) -> Result<(), QueryError> {
        if !matches!(
            self.types.get(&self.query_type),
            Some(TypeDefinition::Object(_)),
        ) {
            return Err(QueryError::new(format!(
                "schema has no query object type {:?}",
                self.query_type,
            )));
        }
        if let Some(mutation) = &self.mutation_type
            && !matches!(self.types.get(mutation), Some(TypeDefinition::Object(_)))
        {
            return Err(QueryError::new(format!(
                "schema has no mutation object type {mutation:?}",
            )));
        }

        for definition in self.types.values() {
            match definition {
                TypeDefinition::Object(object) => {
                    for field in object.fields.values() {
                        self.check_annotation(&field.annotation, &field.location)?;
                        for argument in field.arguments.values() {
                            self.check_annotation(&argument.annotation, &argument.location)?;
                        }
                    }
                }
                TypeDefinition::InputObject(input) => {
                    for field in input.fields.values() {
                        self.check_annotation(&field.annotation, &field.location)?;
                    }
                }
                TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => {}
            }
        }
        Ok(())
    }

    fn check_annotation(
        &self,
        annotation: &TypeAnnotation,
        location: &crate::error::Location,
    ) -> Result<(), QueryError> {
        let root = annotation.named_root();
        if self.types.contains_key(root) {
            Ok(())
        } else {
            Err(QueryError::new(format!("unknown type {root:?}")).with_location(*location))
        }
    }
}

#[derive(Clone, Debug)]
pub enum TypeDefinition {
    Scalar(ScalarType),
    Object(ObjectType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
        }
    }

    /// Leaf types carry no selection set during execution.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }
}

#[derive(Clone, Debug)]
pub struct ScalarType {
    pub(crate) name: String,
    pub(crate) description: String,
}

#[derive(Clone, Debug)]
pub struct ObjectType {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) fields: IndexMap<String, FieldDefinition>,
}

impl ObjectType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fields(&self) -> &IndexMap<String, FieldDefinition> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }
}

#[derive(Clone, Debug)]
pub struct FieldDefinition {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) arguments: IndexMap<String, InputValueDefinition>,
    pub(crate) annotation: TypeAnnotation,
    pub(crate) location: crate::error::Location,
}

impl FieldDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn annotation(&self) -> &TypeAnnotation {
        &self.annotation
    }
}

#[derive(Clone, Debug)]
pub struct InputValueDefinition {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) annotation: TypeAnnotation,
    pub(crate) default: Option<Value>,
    pub(crate) location: crate::error::Location,
}

#[derive(Clone, Debug)]
pub struct EnumType {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) values: IndexMap<String, EnumValueDefinition>,
}

#[derive(Clone, Debug)]
pub struct EnumValueDefinition {
    pub(crate) name: String,
    pub(crate) description: String,
}

#[derive(Clone, Debug)]
pub struct InputObjectType {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) fields: IndexMap<String, InputValueDefinition>,
}
