//! # Type-Schema Checking
//!
//! Declared types in a program (and in its modules) are JSON-Schema
//! documents. This module checks that each declared document is individually
//! well-formed - a purely syntactic check over the schema *declarations*.
//! Runtime values are never checked against declared types.
//!
//! The actual schema judgment is a collaborator boundary: anything
//! implementing [`SchemaValidator`] can be plugged into the engine. The
//! bundled [`MetaschemaValidator`] performs a structural well-formedness
//! check over the common draft keywords without reimplementing full
//! JSON-Schema semantics.

use serde_json::Value as JsonValue;

use crate::ast::Program;
use crate::errors::{ErrorKind, JexlError};
use crate::grammar::parser::escape_pointer;

/// The external schema-validator boundary: decides whether an arbitrary JSON
/// value is a syntactically valid JSON-Schema document.
pub trait SchemaValidator {
    fn is_valid_schema(&self, document: &JsonValue) -> bool;
}

/// Checks every declared type document in the program and its modules.
///
/// Absence of `types` and `modules` trivially passes. The first malformed
/// document halts the check with an [`ErrorKind::InvalidTypeSchema`] carrying
/// a pointer to the declaration.
pub fn check_program_types(
    program: &Program,
    validator: &dyn SchemaValidator,
) -> Result<(), JexlError> {
    for (type_name, document) in &program.types {
        if !validator.is_valid_schema(document) {
            return Err(invalid_type_schema(
                type_name,
                &format!("/types/{}", escape_pointer(type_name)),
            ));
        }
    }
    for (module_name, module) in &program.modules {
        for (type_name, document) in &module.types {
            if !validator.is_valid_schema(document) {
                return Err(invalid_type_schema(
                    type_name,
                    &format!(
                        "/modules/{}/types/{}",
                        escape_pointer(module_name),
                        escape_pointer(type_name)
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// The single-boolean view of [`check_program_types`].
pub fn all_schemas_valid(program: &Program, validator: &dyn SchemaValidator) -> bool {
    check_program_types(program, validator).is_ok()
}

fn invalid_type_schema(type_name: &str, pointer: &str) -> JexlError {
    JexlError::new(ErrorKind::InvalidTypeSchema {
        type_name: type_name.to_string(),
    })
    .at(pointer)
}

// ============================================================================
// DEFAULT VALIDATOR
// ============================================================================

/// Structural well-formedness check over the common JSON-Schema draft
/// keywords. Unknown keywords are permitted, as the drafts themselves allow.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaschemaValidator;

impl SchemaValidator for MetaschemaValidator {
    fn is_valid_schema(&self, document: &JsonValue) -> bool {
        valid_schema(document)
    }
}

const TYPE_NAMES: &[&str] = &[
    "string", "number", "integer", "boolean", "null", "array", "object",
];

fn valid_schema(document: &JsonValue) -> bool {
    match document {
        // Boolean schemas are valid since draft 6.
        JsonValue::Bool(_) => true,
        JsonValue::Object(fields) => fields.iter().all(|(key, value)| valid_keyword(key, value)),
        _ => false,
    }
}

fn valid_keyword(key: &str, value: &JsonValue) -> bool {
    match key {
        "type" => match value {
            JsonValue::String(name) => TYPE_NAMES.contains(&name.as_str()),
            JsonValue::Array(names) => names.iter().all(|name| {
                matches!(name, JsonValue::String(s) if TYPE_NAMES.contains(&s.as_str()))
            }),
            _ => false,
        },
        "properties" | "patternProperties" | "definitions" | "$defs" => match value {
            JsonValue::Object(entries) => entries.values().all(valid_schema),
            _ => false,
        },
        "items" => match value {
            JsonValue::Array(schemas) => schemas.iter().all(valid_schema),
            other => valid_schema(other),
        },
        "additionalProperties" | "additionalItems" | "not" => valid_schema(value),
        "allOf" | "anyOf" | "oneOf" => match value {
            JsonValue::Array(schemas) => {
                !schemas.is_empty() && schemas.iter().all(valid_schema)
            }
            _ => false,
        },
        "required" => match value {
            JsonValue::Array(names) => names.iter().all(JsonValue::is_string),
            _ => false,
        },
        "enum" => value.is_array(),
        "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" | "multipleOf" => {
            value.is_number()
        }
        "minLength" | "maxLength" | "minItems" | "maxItems" | "minProperties"
        | "maxProperties" => value.is_u64(),
        "pattern" | "format" | "title" | "description" | "$ref" | "$id" | "$schema"
        | "$comment" => value.is_string(),
        // "const", "default", "examples" and unknown keywords accept any value.
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_plain_object_schema() {
        let schema = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"]
        });
        assert!(MetaschemaValidator.is_valid_schema(&schema));
    }

    #[test]
    fn accepts_boolean_schema() {
        assert!(MetaschemaValidator.is_valid_schema(&json!(true)));
        assert!(MetaschemaValidator.is_valid_schema(&json!(false)));
    }

    #[test]
    fn rejects_non_schema_scalars() {
        assert!(!MetaschemaValidator.is_valid_schema(&json!(42)));
        assert!(!MetaschemaValidator.is_valid_schema(&json!("string")));
    }

    #[test]
    fn rejects_malformed_keywords() {
        assert!(!MetaschemaValidator.is_valid_schema(&json!({ "properties": 5 })));
        assert!(!MetaschemaValidator.is_valid_schema(&json!({ "type": "integerr" })));
        assert!(!MetaschemaValidator.is_valid_schema(&json!({ "required": [1, 2] })));
        assert!(!MetaschemaValidator.is_valid_schema(&json!({ "minLength": -1 })));
    }

    #[test]
    fn unknown_keywords_are_permitted() {
        assert!(MetaschemaValidator.is_valid_schema(&json!({ "x-vendor": { "weird": true } })));
    }
}
