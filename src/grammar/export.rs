//! Grammar export: the expression grammar as a standalone JSON-Schema
//! artifact, tagged with the supported language version.
//!
//! This is a pure derived view for external tooling (editors, document
//! validators); the engine never consumes it back.

use serde_json::{json, Value as JsonValue};

use crate::JEXL_VERSION;

/// Serializes the full program grammar as a JSON-Schema document.
pub fn grammar_schema() -> JsonValue {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": format!("JEXL program grammar {}", JEXL_VERSION),
        "$ref": "#/definitions/Program",
        "definitions": {
            "Program": {
                "type": "object",
                "properties": {
                    "jexl_version": { "const": JEXL_VERSION },
                    "name": { "type": "string" },
                    "types": {
                        "type": "object",
                        "additionalProperties": true
                    },
                    "modules": {
                        "type": "object",
                        "additionalProperties": { "$ref": "#/definitions/Module" }
                    },
                    "program": {
                        "type": "array",
                        "items": { "$ref": "#/definitions/Expression" }
                    }
                },
                "required": ["jexl_version", "name", "program"],
                "additionalProperties": false
            },
            "Module": {
                "type": "object",
                "properties": {
                    "types": {
                        "type": "object",
                        "additionalProperties": true
                    },
                    "exports": {
                        "type": "array",
                        "items": { "$ref": "#/definitions/Expression" }
                    }
                },
                "required": ["exports"],
                "additionalProperties": false
            },
            "Expression": {
                "anyOf": [
                    { "$ref": "#/definitions/Literal" },
                    { "$ref": "#/definitions/VarReference" },
                    { "$ref": "#/definitions/LetBinding" },
                    { "$ref": "#/definitions/DoDef" },
                    { "$ref": "#/definitions/IfDef" },
                    { "$ref": "#/definitions/FunctionDef" },
                    { "$ref": "#/definitions/MacroDef" },
                    { "$ref": "#/definitions/Import" },
                    { "$ref": "#/definitions/FunctionCall" },
                    { "$ref": "#/definitions/SpecialForm" }
                ]
            },
            "Literal": {
                "type": ["string", "number", "boolean", "null"]
            },
            "VarReference": {
                "type": "object",
                "properties": { "ref": { "type": "string" } },
                "required": ["ref"],
                "additionalProperties": false
            },
            "LetBinding": {
                "type": "object",
                "properties": {
                    "let": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "value": { "$ref": "#/definitions/Expression" }
                        },
                        "required": ["name", "value"],
                        "additionalProperties": false
                    }
                },
                "required": ["let"],
                "additionalProperties": false
            },
            "DoDef": {
                "type": "object",
                "properties": {
                    "do": {
                        "type": "array",
                        "items": { "$ref": "#/definitions/Expression" }
                    }
                },
                "required": ["do"],
                "additionalProperties": false
            },
            "IfDef": {
                "type": "object",
                "properties": {
                    "if": {
                        "type": "object",
                        "properties": {
                            "condition": { "$ref": "#/definitions/Expression" },
                            "true": { "$ref": "#/definitions/Expression" },
                            "false": { "$ref": "#/definitions/Expression" }
                        },
                        "required": ["condition"],
                        "additionalProperties": false
                    }
                },
                "required": ["if"],
                "additionalProperties": false
            },
            "FunctionDef": {
                "type": "object",
                "properties": {
                    "function": { "$ref": "#/definitions/Definition" }
                },
                "required": ["function"],
                "additionalProperties": false
            },
            "MacroDef": {
                "type": "object",
                "properties": {
                    "macro": { "$ref": "#/definitions/Definition" }
                },
                "required": ["macro"],
                "additionalProperties": false
            },
            "Definition": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "params": {
                        "type": "array",
                        "items": { "$ref": "#/definitions/Param" }
                    },
                    "body": { "$ref": "#/definitions/Expression" }
                },
                "required": ["name", "params", "body"],
                "additionalProperties": false
            },
            "Param": {
                "anyOf": [
                    { "type": "string" },
                    {
                        "type": "object",
                        "additionalProperties": { "type": "string" },
                        "minProperties": 1,
                        "maxProperties": 1
                    }
                ]
            },
            "Import": {
                "type": "object",
                "properties": {
                    "import": {
                        "type": "object",
                        "properties": {
                            "module": { "type": "string" },
                            "symbols": {
                                "type": "array",
                                "items": { "type": "string" }
                            }
                        },
                        "required": ["module", "symbols"],
                        "additionalProperties": false
                    }
                },
                "required": ["import"],
                "additionalProperties": false
            },
            "FunctionCall": {
                "type": "object",
                "additionalProperties": {
                    "type": "array",
                    "items": { "$ref": "#/definitions/Expression" }
                },
                "minProperties": 1,
                "maxProperties": 1
            },
            "SpecialForm": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "additionalProperties": { "$ref": "#/definitions/Expression" }
                },
                "minProperties": 1,
                "maxProperties": 1
            }
        }
    })
}
