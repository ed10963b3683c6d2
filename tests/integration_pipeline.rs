use std::cell::RefCell;
use std::rc::Rc;

use jexl::atoms::{OutputBuffer, SharedOutput};
use jexl::engine::{run_source, Engine};
use jexl::errors::{ErrorCategory, ErrorKind};
use jexl::runtime::Value;
use jexl::schema::SchemaValidator;
use serde_json::{json, Value as JsonValue};

// ---
// Test Setup
// ---

fn capture() -> (Rc<RefCell<OutputBuffer>>, SharedOutput) {
    let buffer = Rc::new(RefCell::new(OutputBuffer::new()));
    let sink: SharedOutput = buffer.clone();
    (buffer, sink)
}

fn run(document: JsonValue) -> Result<Value, jexl::JexlError> {
    let (_, sink) = capture();
    Engine::default().run_value(&document, sink)
}

fn program(body: JsonValue) -> JsonValue {
    json!({
        "jexl_version": "v0.1",
        "name": "pipeline test",
        "program": body
    })
}

// ---
// End-to-end programs
// ---

#[test]
fn fibonacci_runs_through_the_whole_pipeline() {
    let document = program(json!([
        {
            "function": {
                "name": "fib",
                "params": [{ "n": "number" }],
                "body": {
                    "if": {
                        "condition": { "lessThan": [{ "ref": "n" }, 2] },
                        "true": { "ref": "n" },
                        "false": {
                            "add": [
                                { "fib": [{ "subtract": [{ "ref": "n" }, 1] }] },
                                { "fib": [{ "subtract": [{ "ref": "n" }, 2] }] }
                            ]
                        }
                    }
                }
            }
        },
        { "fib": [7] }
    ]));
    assert_eq!(run(document).unwrap(), Value::Number(13.0));
}

#[test]
fn macros_are_defined_expanded_and_never_executed() {
    let document = program(json!([
        {
            "macro": {
                "name": "unless",
                "params": ["condition", "body"],
                "body": {
                    "if": { "condition": { "ref": "condition" }, "false": { "ref": "body" } }
                }
            }
        },
        { "unless": [{ "equals": [1, 2] }, { "print": ["ran"] }] },
        { "unless": [{ "equals": [1, 1] }, { "print": ["skipped"] }] }
    ]));
    let (buffer, sink) = capture();
    Engine::default().run_value(&document, sink).unwrap();
    assert_eq!(buffer.borrow().as_str(), "ran\n");
}

#[test]
fn the_last_top_level_value_is_returned() {
    assert_eq!(run(program(json!([1, 2, "last"]))).unwrap(), Value::String("last".to_string()));
    assert_eq!(run(program(json!([]))).unwrap(), Value::Null);
}

#[test]
fn top_level_bindings_span_expressions() {
    let document = program(json!([
        { "let": { "name": "x", "value": 4 } },
        { "multiply": [{ "ref": "x" }, { "ref": "x" }] }
    ]));
    assert_eq!(run(document).unwrap(), Value::Number(16.0));
}

#[test]
fn modules_import_and_run() {
    let document = json!({
        "jexl_version": "v0.1",
        "name": "with modules",
        "modules": {
            "util": {
                "exports": [
                    { "function": { "name": "double", "params": ["n"], "body": { "multiply": [{ "ref": "n" }, 2] } } }
                ]
            }
        },
        "program": [
            { "import": { "module": "util", "symbols": ["double"] } },
            { "double": [21] }
        ]
    });
    assert_eq!(run(document).unwrap(), Value::Number(42.0));
}

#[test]
fn module_exports_are_macro_expanded() {
    // The module uses a program-level macro in its exported function body.
    let document = json!({
        "jexl_version": "v0.1",
        "name": "macro across module",
        "modules": {
            "util": {
                "exports": [
                    {
                        "macro": {
                            "name": "inc",
                            "params": ["n"],
                            "body": { "add": [{ "ref": "n" }, 1] }
                        }
                    },
                    { "function": { "name": "next", "params": ["n"], "body": { "inc": [{ "ref": "n" }] } } }
                ]
            }
        },
        "program": [
            { "import": { "module": "util", "symbols": ["next"] } },
            { "next": [41] }
        ]
    });
    assert_eq!(run(document).unwrap(), Value::Number(42.0));
}

#[test]
fn importing_a_missing_module_or_symbol_fails() {
    let err = run(program(json!([
        { "import": { "module": "ghost", "symbols": ["f"] } }
    ])))
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownModule { .. }));

    let document = json!({
        "jexl_version": "v0.1",
        "name": "bad import",
        "modules": { "util": { "exports": [] } },
        "program": [{ "import": { "module": "util", "symbols": ["missing"] } }]
    });
    let err = run(document).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::UnknownExport {
            module: "util".to_string(),
            symbol: "missing".to_string(),
        }
    );
}

// ---
// Pipeline ordering
// ---

#[test]
fn grammar_failure_halts_before_any_side_effect() {
    let document = json!({
        "jexl_version": "v0.2",
        "name": "future",
        "program": [{ "print": ["must not run"] }]
    });
    let (buffer, sink) = capture();
    let err = Engine::default().run_value(&document, sink).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedVersion { .. }));
    assert_eq!(buffer.borrow().as_str(), "");
}

#[test]
fn schema_failure_halts_before_any_side_effect() {
    let document = json!({
        "jexl_version": "v0.1",
        "name": "bad types",
        "types": { "User": { "properties": 5 } },
        "program": [{ "print": ["must not run"] }]
    });
    let (buffer, sink) = capture();
    let err = Engine::default().run_value(&document, sink).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Schema);
    assert_eq!(err.pointer.as_deref(), Some("/types/User"));
    assert_eq!(buffer.borrow().as_str(), "");
}

#[test]
fn the_schema_validator_is_injectable() {
    struct RejectEverything;
    impl SchemaValidator for RejectEverything {
        fn is_valid_schema(&self, _document: &JsonValue) -> bool {
            false
        }
    }

    let document = json!({
        "jexl_version": "v0.1",
        "name": "strict host",
        "types": { "Id": { "type": "string" } },
        "program": [42]
    });
    let (_, sink) = capture();
    let engine = Engine::with_validator(Box::new(RejectEverything));
    let err = engine.run_value(&document, sink).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidTypeSchema { .. }));

    // The default engine accepts the same document.
    assert_eq!(run(document).unwrap(), Value::Number(42.0));
}

// ---
// Source text entry point
// ---

#[test]
fn source_text_runs_end_to_end() {
    let source = r#"{
        "jexl_version": "v0.1",
        "name": "from text",
        "program": [{ "add": [20, 22] }]
    }"#;
    let (_, sink) = capture();
    assert_eq!(run_source(source, sink).unwrap(), Value::Number(42.0));
}

#[test]
fn malformed_json_is_a_malformed_document() {
    let (_, sink) = capture();
    let err = run_source("{ not json", sink).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MalformedDocument { .. }));
}
