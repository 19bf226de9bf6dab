//! Static validation of a parsed document against a schema.
//!
//! [`validate`] is a pure function of its inputs. It walks every operation
//! and every fragment, collecting all discoverable violations in one pass so
//! a client sees every problem at once. Each error is tagged with the name
//! of the violated rule; execution never starts while any error exists.

use crate::error::Location;
use crate::error::QueryError;
use crate::query::Directive;
use crate::query::Document;
use crate::query::Operation;
use crate::query::OperationKind;
use crate::query::Selection;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::value::Value;
use std::collections::HashSet;

pub const RULE_FIELDS_ON_CORRECT_TYPE: &str = "FieldsOnCorrectType";
pub const RULE_KNOWN_TYPE_NAMES: &str = "KnownTypeNames";
pub const RULE_KNOWN_FRAGMENT_NAMES: &str = "KnownFragmentNames";
pub const RULE_NO_UNDEFINED_VARIABLES: &str = "NoUndefinedVariables";

/// Validates `document` against `schema`, returning every violation found.
///
/// Operation bodies are checked against their root type; each fragment body
/// is checked once against its type condition. Variable usages inside a
/// fragment are checked against the union of all operations' declarations,
/// since any of them may spread the fragment.
pub fn validate(schema: &Schema, document: &Document) -> Vec<QueryError> {
    let mut ctx = Context {
        schema,
        document,
        errors: vec![],
    };

    let mut all_declared: HashSet<&str> = HashSet::new();
    for operation in document.operations() {
        all_declared.extend(operation.variables().keys().map(String::as_str));
    }

    for operation in document.operations() {
        ctx.check_operation(operation);
    }
    for fragment in document.fragments().values() {
        if let Some(object) = ctx.condition_object(&fragment.type_condition, fragment.location)
        {
            ctx.check_selections(&fragment.selection_set, object, &all_declared);
        }
    }
    ctx.errors
}

struct Context<'a> {
    schema: &'a Schema,
    document: &'a Document,
    errors: Vec<QueryError>,
}

impl<'a> Context<'a> {
    fn report(&mut self, error: QueryError) {
        self.errors.push(error);
    }

    fn check_operation(&mut self, operation: &'a Operation) {
        let mut declared: HashSet<&str> = HashSet::new();
        for variable in operation.variables().values() {
            declared.insert(variable.name());
            if self.schema.resolve_annotation(variable.annotation()).is_err() {
                self.report(
                    QueryError::new(format!(
                        "Unknown type {:?}.",
                        variable.annotation().named_root(),
                    ))
                    .with_location(variable.location)
                    .with_rule(RULE_KNOWN_TYPE_NAMES),
                );
            }
        }

        self.check_directives(&operation.directives, &declared);

        let root_name = match operation.kind() {
            OperationKind::Query => Some(self.schema.query_type()),
            OperationKind::Mutation => self.schema.mutation_type(),
        };
        let Some(root) = root_name.and_then(|name| self.schema.object(name)) else {
            self.report(
                QueryError::new("schema has no mutation type")
                    .with_location(operation.location)
                    .with_rule(RULE_KNOWN_TYPE_NAMES),
            );
            return;
        };

        self.check_selections(operation.selection_set(), root, &declared);
    }

    /// Checks one selection set. Fragment spreads are verified to exist but
    /// their bodies are not descended into here; each fragment body is
    /// checked exactly once by [`validate`].
    fn check_selections(
        &mut self,
        selections: &'a [Selection],
        object: &'a ObjectType,
        declared: &HashSet<&str>,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    for value in field.arguments.values() {
                        self.check_value(value, declared, field.location);
                    }
                    self.check_directives(&field.directives, declared);

                    let Some(definition) = object.field(&field.name) else {
                        self.report(
                            QueryError::new(format!(
                                "Cannot query field {:?} on type {:?}.",
                                field.name,
                                object.name(),
                            ))
                            .with_location(field.location)
                            .with_rule(RULE_FIELDS_ON_CORRECT_TYPE),
                        );
                        continue;
                    };

                    if let Some(child) =
                        self.schema.object(definition.annotation().named_root())
                    {
                        self.check_selections(&field.selection_set, child, declared);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    self.check_directives(&spread.directives, declared);
                    if !self.document.fragments().contains_key(&spread.name) {
                        self.report(
                            QueryError::new(format!("Unknown fragment {:?}.", spread.name))
                                .with_location(spread.location)
                                .with_rule(RULE_KNOWN_FRAGMENT_NAMES),
                        );
                    }
                }
                Selection::InlineFragment(inline) => {
                    self.check_directives(&inline.directives, declared);
                    let target = match &inline.type_condition {
                        Some(condition) => self.condition_object(condition, inline.location),
                        None => Some(object),
                    };
                    if let Some(target) = target {
                        self.check_selections(&inline.selection_set, target, declared);
                    }
                }
            }
        }
    }

    fn condition_object(
        &mut self,
        condition: &str,
        location: Location,
    ) -> Option<&'a ObjectType> {
        let object = self.schema.object(condition);
        if object.is_none() {
            self.report(
                QueryError::new(format!("Unknown type {condition:?}."))
                    .with_location(location)
                    .with_rule(RULE_KNOWN_TYPE_NAMES),
            );
        }
        object
    }

    fn check_directives(&mut self, directives: &[Directive], declared: &HashSet<&str>) {
        for directive in directives {
            for value in directive.arguments.values() {
                self.check_value(value, declared, directive.location);
            }
        }
    }

    fn check_value(&mut self, value: &Value, declared: &HashSet<&str>, location: Location) {
        match value {
            Value::Variable(name) => {
                if !declared.contains(name.as_str()) {
                    self.report(
                        QueryError::new(format!("Variable \"${name}\" is not defined."))
                            .with_location(location)
                            .with_rule(RULE_NO_UNDEFINED_VARIABLES),
                    );
                }
            }
            Value::List(items) => {
                for item in items {
                    self.check_value(item, declared, location);
                }
            }
            Value::Object(fields) => {
                for field in fields.values() {
                    self.check_value(field, declared, location);
                }
            }
            _ => {}
        }
    }
}
