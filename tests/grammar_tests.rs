use jexl::errors::{ErrorCategory, ErrorKind};
use jexl::grammar::{parse_program, validate};
use serde_json::{json, Value as JsonValue};

// ---
// Test Setup
// ---

/// Wraps a body sequence in a minimal valid program document.
fn program(body: JsonValue) -> JsonValue {
    json!({
        "jexl_version": "v0.1",
        "name": "grammar test",
        "program": body
    })
}

fn reject(document: &JsonValue) -> jexl::JexlError {
    validate(document).expect_err("document should be rejected")
}

// ---
// Acceptance
// ---

#[test]
fn minimal_program_is_accepted() {
    assert!(validate(&program(json!([]))).is_ok());
}

#[test]
fn scalar_literals_are_accepted() {
    assert!(validate(&program(json!(["hello", 42, 1.5, true, null]))).is_ok());
}

#[test]
fn every_expression_shape_is_accepted() {
    let document = program(json!([
        { "ref": "x" },
        { "let": { "name": "x", "value": 5 } },
        { "do": [1, 2, 3] },
        { "if": { "condition": true, "true": 1, "false": 2 } },
        { "function": { "name": "f", "params": ["a", { "b": "number" }], "body": { "ref": "a" } } },
        { "macro": { "name": "m", "params": ["a"], "body": { "ref": "a" } } },
        { "import": { "module": "util", "symbols": ["f"] } },
        { "someCall": [1, { "ref": "x" }] },
        { "customForm": { "field": 1, "other": { "ref": "x" } } }
    ]));
    assert!(validate(&document).is_ok());
}

#[test]
fn if_branches_are_optional() {
    assert!(validate(&program(json!([{ "if": { "condition": true } }]))).is_ok());
    assert!(validate(&program(json!([{ "if": { "condition": true, "false": 2 } }]))).is_ok());
}

#[test]
fn modules_are_accepted() {
    let document = json!({
        "jexl_version": "v0.1",
        "name": "with modules",
        "modules": {
            "util": {
                "types": { "Id": { "type": "string" } },
                "exports": [
                    { "function": { "name": "id", "params": ["x"], "body": { "ref": "x" } } }
                ]
            }
        },
        "program": []
    });
    let parsed = parse_program(&document).unwrap();
    assert_eq!(parsed.modules.len(), 1);
    assert_eq!(parsed.modules["util"].exports.len(), 1);
}

// ---
// Rejection: expression shapes
// ---

#[test]
fn bare_array_is_rejected_with_pointer() {
    let err = reject(&program(json!([[1, 2]])));
    assert_eq!(err.category(), ErrorCategory::Grammar);
    assert_eq!(err.pointer.as_deref(), Some("/program/0"));
    assert!(err.to_string().contains("one of {Literal"));
}

#[test]
fn multi_key_object_is_rejected() {
    let err = reject(&program(json!([{ "a": [], "b": [] }])));
    assert!(err.to_string().contains("one of {Literal"));
    assert!(err.to_string().contains("a, b"));
}

#[test]
fn single_key_object_with_scalar_value_is_rejected() {
    // Neither a call (needs a sequence) nor a special form (needs a record).
    let err = reject(&program(json!([{ "foo": 5 }])));
    assert_eq!(err.pointer.as_deref(), Some("/program/0/foo"));
    assert!(err.to_string().contains("one of {Literal"));
}

#[test]
fn empty_object_is_rejected() {
    let err = reject(&program(json!([{}])));
    assert!(matches!(err.kind, ErrorKind::GrammarViolation { .. }));
}

// ---
// Rejection: reserved forms
// ---

#[test]
fn ref_requires_a_string_name() {
    let err = reject(&program(json!([{ "ref": 5 }])));
    assert_eq!(err.pointer.as_deref(), Some("/program/0/ref"));
}

#[test]
fn let_requires_name_and_value() {
    let err = reject(&program(json!([{ "let": { "name": "x" } }])));
    assert!(err.to_string().contains("value"));

    let err = reject(&program(json!([{ "let": { "name": "x", "value": 1, "extra": 2 } }])));
    assert_eq!(err.pointer.as_deref(), Some("/program/0/let/extra"));
}

#[test]
fn if_requires_a_condition() {
    let err = reject(&program(json!([{ "if": { "true": 1 } }])));
    assert!(err.to_string().contains("condition"));
}

#[test]
fn do_requires_a_sequence() {
    let err = reject(&program(json!([{ "do": { "not": "a sequence" } }])));
    assert_eq!(err.pointer.as_deref(), Some("/program/0/do"));
}

#[test]
fn import_symbols_must_be_strings() {
    let err = reject(&program(json!([
        { "import": { "module": "util", "symbols": ["ok", 7] } }
    ])));
    assert_eq!(err.pointer.as_deref(), Some("/program/0/import/symbols/1"));
}

#[test]
fn special_form_fields_must_be_expressions() {
    // A record field that is itself a bare array matches no expression
    // shape; the rejection points at the field and names the constraint.
    let err = reject(&program(json!([{ "widget": { "size": [1, 2] } }])));
    assert_eq!(err.pointer.as_deref(), Some("/program/0/widget/size"));
    assert_eq!(
        err.help.as_deref(),
        Some("every field of the 'widget' form must be an expression")
    );
}

#[test]
fn definitions_may_not_shadow_reserved_forms() {
    let err = reject(&program(json!([
        { "function": { "name": "if", "params": [], "body": null } }
    ])));
    assert_eq!(err.pointer.as_deref(), Some("/program/0/function/name"));

    let err = reject(&program(json!([
        { "macro": { "name": "let", "params": [], "body": null } }
    ])));
    assert!(err.to_string().contains("reserved"));
}

// ---
// Rejection: params
// ---

#[test]
fn empty_param_mapping_is_rejected() {
    let err = reject(&program(json!([
        { "function": { "name": "f", "params": [{}], "body": null } }
    ])));
    assert_eq!(err.pointer.as_deref(), Some("/program/0/function/params/0"));
    assert!(err.to_string().contains("single-entry"));
}

#[test]
fn multi_entry_param_mapping_is_rejected() {
    let err = reject(&program(json!([
        { "function": { "name": "f", "params": [{ "a": "number", "b": "number" }], "body": null } }
    ])));
    assert!(matches!(err.kind, ErrorKind::GrammarViolation { .. }));
}

// ---
// Rejection: program document
// ---

#[test]
fn version_mismatch_cites_the_supported_version() {
    let document = json!({
        "jexl_version": "v0.2",
        "name": "future program",
        "program": []
    });
    let err = reject(&document);
    assert_eq!(
        err.kind,
        ErrorKind::UnsupportedVersion {
            found: "v0.2".to_string(),
            supported: "v0.1".to_string(),
        }
    );
    assert_eq!(err.pointer.as_deref(), Some("/jexl_version"));
    assert!(err.to_string().contains("v0.1"));
}

#[test]
fn missing_program_field_is_rejected() {
    let err = reject(&json!({ "jexl_version": "v0.1", "name": "no body" }));
    assert!(err.to_string().contains("program"));
}

#[test]
fn unknown_top_level_field_is_rejected() {
    let err = reject(&json!({
        "jexl_version": "v0.1",
        "name": "extra",
        "program": [],
        "surprise": true
    }));
    assert_eq!(err.pointer.as_deref(), Some("/surprise"));
}

#[test]
fn non_object_document_is_rejected() {
    let err = reject(&json!([1, 2, 3]));
    assert!(matches!(err.kind, ErrorKind::GrammarViolation { .. }));
}
