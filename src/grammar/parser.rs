//! Lowering from generic JSON trees into the typed expression grammar.
//!
//! Single-key objects are tried against the dedicated reserved shapes first,
//! then against the `FunctionCall` shape (one key mapped to a sequence), and
//! finally against the generic `SpecialForm` record shape. Everything the
//! validator rejects is reported with the JSON-pointer of the offending
//! value.

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::ast::{is_reserved_form, Expr, Module, Param, Program};
use crate::errors::{ErrorKind, JexlError};
use crate::runtime::value::Value;
use crate::JEXL_VERSION;

/// The union of expression shapes, quoted verbatim in rejection messages.
const EXPRESSION_SHAPES: &str = "one of {Literal, VarReference, LetBinding, DoDef, IfDef, \
     FunctionDef, MacroDef, Import, FunctionCall, SpecialForm}";

// ============================================================================
// PROGRAM
// ============================================================================

/// Lowers a parsed JSON document into a [`Program`], rejecting anything that
/// is not a member of the grammar.
pub fn parse_program(document: &JsonValue) -> Result<Program, JexlError> {
    let fields = match document {
        JsonValue::Object(fields) => fields,
        other => return Err(violation("a program document (a JSON object)", other, "")),
    };

    for key in fields.keys() {
        if !matches!(
            key.as_str(),
            "jexl_version" | "name" | "types" | "modules" | "program"
        ) {
            return Err(violation(
                "one of {jexl_version, name, types, modules, program}",
                &fields[key],
                &format!("/{}", escape_pointer(key)),
            ));
        }
    }

    let version = require_string(fields, "jexl_version", "")?;
    if version != JEXL_VERSION {
        return Err(JexlError::new(ErrorKind::UnsupportedVersion {
            found: version,
            supported: JEXL_VERSION.to_string(),
        })
        .at("/jexl_version"));
    }

    let name = require_string(fields, "name", "")?;
    let types = parse_type_table(fields.get("types"), "/types")?;
    let modules = parse_modules(fields.get("modules"))?;

    let body_json = fields
        .get("program")
        .ok_or_else(|| missing_field("program", ""))?;
    let body = parse_expr_seq(body_json, "/program")?;

    Ok(Program {
        version,
        name,
        types,
        modules,
        body,
    })
}

fn parse_modules(modules: Option<&JsonValue>) -> Result<BTreeMap<String, Module>, JexlError> {
    let Some(modules) = modules else {
        return Ok(BTreeMap::new());
    };
    let JsonValue::Object(entries) = modules else {
        return Err(violation(
            "a mapping of module name to module",
            modules,
            "/modules",
        ));
    };

    let mut out = BTreeMap::new();
    for (name, value) in entries {
        let pointer = format!("/modules/{}", escape_pointer(name));
        let JsonValue::Object(fields) = value else {
            return Err(violation("a module record", value, &pointer));
        };
        for key in fields.keys() {
            if !matches!(key.as_str(), "types" | "exports") {
                return Err(violation(
                    "one of {types, exports}",
                    &fields[key],
                    &format!("{}/{}", pointer, escape_pointer(key)),
                ));
            }
        }
        let types = parse_type_table(fields.get("types"), &format!("{}/types", pointer))?;
        let exports_json = fields
            .get("exports")
            .ok_or_else(|| missing_field("exports", &pointer))?;
        let exports = parse_expr_seq(exports_json, &format!("{}/exports", pointer))?;
        out.insert(name.clone(), Module { types, exports });
    }
    Ok(out)
}

fn parse_type_table(
    types: Option<&JsonValue>,
    pointer: &str,
) -> Result<BTreeMap<String, JsonValue>, JexlError> {
    let Some(types) = types else {
        return Ok(BTreeMap::new());
    };
    // Type documents stay as raw JSON; their well-formedness as schemas is
    // checked by the schema module, not by the grammar.
    let JsonValue::Object(entries) = types else {
        return Err(violation(
            "a mapping of type name to schema document",
            types,
            pointer,
        ));
    };
    Ok(entries
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect())
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// Lowers a single JSON value at `pointer` into an [`Expr`].
pub fn parse_expr(json: &JsonValue, pointer: &str) -> Result<Expr, JexlError> {
    match json {
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) | JsonValue::String(_) => {
            Ok(Expr::Literal(Value::from_json(json)))
        }
        JsonValue::Array(_) => Err(violation(EXPRESSION_SHAPES, json, pointer)),
        JsonValue::Object(fields) => parse_form(fields, json, pointer),
    }
}

fn parse_form(
    fields: &Map<String, JsonValue>,
    whole: &JsonValue,
    pointer: &str,
) -> Result<Expr, JexlError> {
    // A FunctionCall/SpecialForm object is syntactically required to have
    // exactly one key; multi-key objects match no shape.
    let mut entries = fields.iter();
    let (Some((key, value)), None) = (entries.next(), entries.next()) else {
        return Err(violation(EXPRESSION_SHAPES, whole, pointer));
    };

    let inner = format!("{}/{}", pointer, escape_pointer(key));
    match key.as_str() {
        "ref" => parse_var_ref(value, &inner),
        "let" => parse_let(value, &inner),
        "do" => Ok(Expr::Do {
            body: parse_expr_seq(value, &inner)?,
        }),
        "if" => parse_if(value, &inner),
        "function" => {
            let (name, params, body) = parse_definition(value, &inner)?;
            Ok(Expr::FunctionDef { name, params, body })
        }
        "macro" => {
            let (name, params, body) = parse_definition(value, &inner)?;
            Ok(Expr::MacroDef { name, params, body })
        }
        "import" => parse_import(value, &inner),
        target => parse_call_or_special_form(target, value, &inner),
    }
}

fn parse_var_ref(value: &JsonValue, pointer: &str) -> Result<Expr, JexlError> {
    match value {
        JsonValue::String(name) => Ok(Expr::VarRef { name: name.clone() }),
        other => Err(violation("a variable name (a string)", other, pointer)),
    }
}

fn parse_let(value: &JsonValue, pointer: &str) -> Result<Expr, JexlError> {
    let JsonValue::Object(fields) = value else {
        return Err(violation("a {name, value} binding record", value, pointer));
    };
    for key in fields.keys() {
        if !matches!(key.as_str(), "name" | "value") {
            return Err(violation(
                "one of {name, value}",
                &fields[key],
                &format!("{}/{}", pointer, escape_pointer(key)),
            ));
        }
    }
    let name = require_string(fields, "name", pointer)?;
    let value_json = fields
        .get("value")
        .ok_or_else(|| missing_field("value", pointer))?;
    let value = parse_expr(value_json, &format!("{}/value", pointer))?;
    Ok(Expr::Let {
        name,
        value: Box::new(value),
    })
}

fn parse_if(value: &JsonValue, pointer: &str) -> Result<Expr, JexlError> {
    let JsonValue::Object(fields) = value else {
        return Err(violation(
            "a {condition, true?, false?} record",
            value,
            pointer,
        ));
    };
    for key in fields.keys() {
        if !matches!(key.as_str(), "condition" | "true" | "false") {
            return Err(violation(
                "one of {condition, true, false}",
                &fields[key],
                &format!("{}/{}", pointer, escape_pointer(key)),
            ));
        }
    }
    let condition_json = fields
        .get("condition")
        .ok_or_else(|| missing_field("condition", pointer))?;
    let condition = parse_expr(condition_json, &format!("{}/condition", pointer))?;

    // Neither branch's absence is an error; a missing branch yields null.
    let then_branch = fields
        .get("true")
        .map(|branch| parse_expr(branch, &format!("{}/true", pointer)))
        .transpose()?
        .map(Box::new);
    let else_branch = fields
        .get("false")
        .map(|branch| parse_expr(branch, &format!("{}/false", pointer)))
        .transpose()?
        .map(Box::new);

    Ok(Expr::If {
        condition: Box::new(condition),
        then_branch,
        else_branch,
    })
}

fn parse_definition(
    value: &JsonValue,
    pointer: &str,
) -> Result<(String, Vec<Param>, Box<Expr>), JexlError> {
    let JsonValue::Object(fields) = value else {
        return Err(violation(
            "a {name, params, body} definition record",
            value,
            pointer,
        ));
    };
    for key in fields.keys() {
        if !matches!(key.as_str(), "name" | "params" | "body") {
            return Err(violation(
                "one of {name, params, body}",
                &fields[key],
                &format!("{}/{}", pointer, escape_pointer(key)),
            ));
        }
    }
    let name = require_string(fields, "name", pointer)?;
    // A definition named after a reserved form could never be invoked; its
    // name would always parse as the reserved shape instead.
    if is_reserved_form(&name) {
        return Err(violation(
            "a definition name that is not a reserved form",
            &fields["name"],
            &format!("{}/name", pointer),
        ));
    }

    let params_json = fields
        .get("params")
        .ok_or_else(|| missing_field("params", pointer))?;
    let JsonValue::Array(params_json) = params_json else {
        return Err(violation(
            "a sequence of parameters",
            params_json,
            &format!("{}/params", pointer),
        ));
    };
    let params = params_json
        .iter()
        .enumerate()
        .map(|(i, p)| parse_param(p, &format!("{}/params/{}", pointer, i)))
        .collect::<Result<Vec<_>, _>>()?;

    let body_json = fields
        .get("body")
        .ok_or_else(|| missing_field("body", pointer))?;
    let body = parse_expr(body_json, &format!("{}/body", pointer))?;

    Ok((name, params, Box::new(body)))
}

fn parse_param(json: &JsonValue, pointer: &str) -> Result<Param, JexlError> {
    match json {
        JsonValue::String(name) => Ok(Param::Named(name.clone())),
        JsonValue::Object(entries) => {
            // Exactly one entry required; zero entries is a grammar violation.
            let mut iter = entries.iter();
            match (iter.next(), iter.next()) {
                (Some((name, JsonValue::String(type_ref))), None) => Ok(Param::Typed {
                    name: name.clone(),
                    type_ref: type_ref.clone(),
                }),
                _ => Err(violation(
                    "a single-entry mapping from parameter name to type name",
                    json,
                    pointer,
                )),
            }
        }
        other => Err(violation(
            "a parameter (a bare name or a single-entry name-to-type mapping)",
            other,
            pointer,
        )),
    }
}

fn parse_import(value: &JsonValue, pointer: &str) -> Result<Expr, JexlError> {
    let JsonValue::Object(fields) = value else {
        return Err(violation("a {module, symbols} record", value, pointer));
    };
    for key in fields.keys() {
        if !matches!(key.as_str(), "module" | "symbols") {
            return Err(violation(
                "one of {module, symbols}",
                &fields[key],
                &format!("{}/{}", pointer, escape_pointer(key)),
            ));
        }
    }
    let module = require_string(fields, "module", pointer)?;

    let symbols_json = fields
        .get("symbols")
        .ok_or_else(|| missing_field("symbols", pointer))?;
    let JsonValue::Array(symbols_json) = symbols_json else {
        return Err(violation(
            "a sequence of symbol names",
            symbols_json,
            &format!("{}/symbols", pointer),
        ));
    };
    let symbols = symbols_json
        .iter()
        .enumerate()
        .map(|(i, s)| match s {
            JsonValue::String(s) => Ok(s.clone()),
            other => Err(violation(
                "a symbol name (a string)",
                other,
                &format!("{}/symbols/{}", pointer, i),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Expr::Import { module, symbols })
}

fn parse_call_or_special_form(
    target: &str,
    value: &JsonValue,
    pointer: &str,
) -> Result<Expr, JexlError> {
    match value {
        JsonValue::Array(_) => Ok(Expr::Call {
            target: target.to_string(),
            args: parse_expr_seq(value, pointer)?,
        }),
        JsonValue::Object(fields) => {
            // Stricter than a free-form record: each field must itself be an
            // expression, so a malformed field is caught here instead of
            // surfacing later as an evaluation failure.
            let parsed = fields
                .iter()
                .map(|(key, field)| {
                    let field_pointer = format!("{}/{}", pointer, escape_pointer(key));
                    parse_expr(field, &field_pointer)
                        .map(|expr| (key.clone(), expr))
                        .map_err(|err| {
                            // Keep the innermost form's help when nested.
                            if err.help.is_some() {
                                return err;
                            }
                            err.with_help(format!(
                                "every field of the '{}' form must be an expression",
                                target
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::SpecialForm {
                name: target.to_string(),
                fields: parsed,
            })
        }
        other => Err(violation(EXPRESSION_SHAPES, other, pointer)),
    }
}

fn parse_expr_seq(json: &JsonValue, pointer: &str) -> Result<Vec<Expr>, JexlError> {
    let JsonValue::Array(items) = json else {
        return Err(violation("a sequence of expressions", json, pointer));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_expr(item, &format!("{}/{}", pointer, i)))
        .collect()
}

// ============================================================================
// REJECTION HELPERS
// ============================================================================

fn violation(expected: &str, found: &JsonValue, pointer: &str) -> JexlError {
    JexlError::new(ErrorKind::GrammarViolation {
        expected: expected.to_string(),
        found: describe(found),
    })
    .at(pointer)
}

fn missing_field(field: &str, pointer: &str) -> JexlError {
    JexlError::new(ErrorKind::GrammarViolation {
        expected: format!("required field '{}'", field),
        found: "nothing".to_string(),
    })
    .at(pointer)
}

fn require_string(
    fields: &Map<String, JsonValue>,
    field: &str,
    pointer: &str,
) -> Result<String, JexlError> {
    match fields.get(field) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(violation(
            "a string",
            other,
            &format!("{}/{}", pointer, escape_pointer(field)),
        )),
        None => Err(missing_field(field, pointer)),
    }
}

/// Describes a JSON value's shape for rejection messages.
fn describe(json: &JsonValue) -> String {
    match json {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => format!("boolean {}", b),
        JsonValue::Number(n) => format!("number {}", n),
        JsonValue::String(s) => format!("string \"{}\"", s),
        JsonValue::Array(items) => format!("a sequence of {} element(s)", items.len()),
        JsonValue::Object(fields) => {
            let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
            format!("a mapping with keys {{{}}}", keys.join(", "))
        }
    }
}

/// RFC 6901 token escaping for pointer segments.
pub fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
