//! The OpenAPI 3.0 schema dialect.
//!
//! OpenAPI 3.0 schemas are an extended subset of JSON Schema Draft 4. The
//! extensions that change validation outcomes are rewritten into plain
//! Draft 4 here; the remaining OpenAPI keywords are annotations that
//! `jsonschema` ignores.

use jsonschema::{Draft, ValidationOptions};
use serde_json::{Map, Value, json};

use crate::resolver::LocalOnlyRetriever;

/// Keys whose values are instance data rather than specification structure.
const DATA_KEYS: [&str; 3] = ["example", "default", "enum"];

/// Validation options for OpenAPI 3.0 schemas already passed through
/// [`translate_schema`].
///
/// `format` is an annotation: Draft 4 would assert it by default.
pub fn options() -> ValidationOptions {
    let mut opts = jsonschema::options();
    opts.with_draft(Draft::Draft4)
        .should_validate_formats(false)
        .with_retriever(LocalOnlyRetriever);
    opts
}

/// Maps whose keys are user-chosen names, never keywords or extensions.
const NAMED_MAPS: [&str; 10] = [
    "properties",
    "headers",
    "content",
    "encoding",
    "examples",
    "links",
    "callbacks",
    "requestBodies",
    "securitySchemes",
    "variables",
];

/// `true` when `key`, a member of the object found at `tokens`, holds
/// instance data (examples, defaults, enums, extension values) rather than
/// specification structure.
pub(crate) fn is_instance_data(tokens: &[String], key: &str) -> bool {
    let parent = tokens.last().map(String::as_str);
    let grandparent = tokens
        .len()
        .checked_sub(2)
        .and_then(|idx| tokens.get(idx))
        .map(String::as_str);

    // Under `properties`, the parent token is a property name and the
    // object is a schema.
    let in_schema_property = grandparent == Some("properties");
    let in_named_map = !in_schema_property
        && (parent.is_some_and(|parent| NAMED_MAPS.contains(&parent))
            || grandparent == Some("components"));
    if in_named_map {
        return false;
    }
    if key.starts_with("x-") {
        return true;
    }
    match key {
        // Example Object payload.
        "value" => grandparent == Some("examples"),
        // The catch-all Response of a Responses Object.
        "default" if parent == Some("responses") => in_schema_property,
        _ => DATA_KEYS.contains(&key),
    }
}

/// Rewrite every schema in an OpenAPI document.
///
/// Component schemas are rewritten, as is the `schema` of every parameter,
/// header and media type anywhere in the document.
pub fn translate_document(document: &mut Value) {
    translate_nested(document, &mut Vec::new());
}

fn translate_nested(value: &mut Value, tokens: &mut Vec<String>) {
    match value {
        Value::Object(object) => {
            let in_schemas = matches!(
                tokens.as_slice(),
                [components, schemas] if components == "components" && schemas == "schemas"
            );
            for (key, child) in object.iter_mut() {
                if in_schemas || key == "schema" {
                    translate_schema(child);
                } else if !is_instance_data(tokens, key) {
                    tokens.push(key.clone());
                    translate_nested(child, tokens);
                    tokens.pop();
                }
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter_mut().enumerate() {
                tokens.push(idx.to_string());
                translate_nested(item, tokens);
                tokens.pop();
            }
        }
        _ => {}
    }
}

/// Rewrite one OpenAPI 3.0 schema object (and its subschemas) in place.
pub fn translate_schema(schema: &mut Value) {
    let Value::Object(object) = schema else {
        return;
    };

    // Siblings of `$ref` are ignored in OpenAPI 3.0.
    if object.contains_key("$ref") {
        object.retain(|key, _| key == "$ref");
        return;
    }

    apply_nullable(object);

    if let Some(Value::Object(properties)) = object.get_mut("properties") {
        properties.values_mut().for_each(translate_schema);
    }
    for key in ["additionalProperties", "items", "not"] {
        if let Some(child) = object.get_mut(key) {
            translate_schema(child);
        }
    }
    for key in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(children)) = object.get_mut(key) {
            children.iter_mut().for_each(translate_schema);
        }
    }
}

fn apply_nullable(object: &mut Map<String, Value>) {
    if object.get("nullable") != Some(&Value::Bool(true)) {
        return;
    }
    if let Some(Value::String(ty)) = object.get("type") {
        let ty = ty.clone();
        object.insert("type".to_string(), json!([ty, "null"]));
    }
}
