//! Rules an OpenAPI 3.0 document must satisfy beyond its meta-schema.

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

use crate::dialect::is_instance_data;
use crate::error::{Violation, Violations};
use crate::resolver::{self, pointer};

const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

pub fn run(document: &Value) -> Violations {
    let mut violations = Violations::default();
    check_references(document, &mut violations);
    check_operation_ids(document, &mut violations);
    check_path_parameters(document, &mut violations);
    check_required_properties(document, &mut violations);
    violations
}

/// Visit every object that is part of the document's structure, skipping
/// examples, defaults, enums and extension values.
fn walk(
    value: &Value,
    tokens: &mut Vec<String>,
    visit: &mut dyn FnMut(&[String], &Map<String, Value>),
) {
    match value {
        Value::Object(object) => {
            visit(tokens, object);
            for (key, child) in object {
                if is_instance_data(tokens, key) {
                    continue;
                }
                tokens.push(key.clone());
                walk(child, tokens, visit);
                tokens.pop();
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                tokens.push(idx.to_string());
                walk(item, tokens, visit);
                tokens.pop();
            }
        }
        _ => {}
    }
}

fn check_references(document: &Value, violations: &mut Violations) {
    walk(document, &mut Vec::new(), &mut |tokens, object| {
        let Some(reference) = object.get("$ref").and_then(Value::as_str) else {
            return;
        };
        let location = format!("{}/$ref", pointer(tokens));
        if !resolver::is_local(reference) {
            violations.push(Violation::new(
                location,
                format!("external reference '{reference}' is not supported"),
            ));
        } else if resolver::resolve_local(document, reference).is_none() {
            violations.push(Violation::new(
                location,
                format!("reference '{reference}' cannot be resolved"),
            ));
        }
    });
}

/// Yields `(path, method, operation)` for every operation in `paths`.
fn operations(document: &Value) -> impl Iterator<Item = (&str, &str, &Map<String, Value>)> {
    document
        .get("paths")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .flat_map(|(path, item)| {
            METHODS.iter().filter_map(move |method| {
                item.get(*method)
                    .and_then(Value::as_object)
                    .map(|operation| (path.as_str(), *method, operation))
            })
        })
}

fn check_operation_ids(document: &Value, violations: &mut Violations) {
    let mut seen: HashMap<&str, String> = HashMap::new();
    for (path, method, operation) in operations(document) {
        let Some(operation_id) = operation.get("operationId").and_then(Value::as_str) else {
            continue;
        };
        let location = pointer(&["paths", path, method, "operationId"]);
        match seen.get(operation_id) {
            Some(first) => violations.push(Violation::new(
                location,
                format!("operationId '{operation_id}' is already used at {first}"),
            )),
            None => {
                seen.insert(operation_id, location);
            }
        }
    }
}

fn check_path_parameters(document: &Value, violations: &mut Violations) {
    for (path, method, operation) in operations(document) {
        let template = template_names(path);
        if template.is_empty() {
            continue;
        }
        let item_parameters = document
            .get("paths")
            .and_then(|paths| paths.get(path))
            .and_then(|item| item.get("parameters"));
        let declared: BTreeSet<&str> = [item_parameters, operation.get("parameters")]
            .into_iter()
            .flatten()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|parameter| dereference(document, parameter))
            .filter(|parameter| parameter.get("in").and_then(Value::as_str) == Some("path"))
            .filter_map(|parameter| parameter.get("name").and_then(Value::as_str))
            .collect();

        for name in template.difference(&declared) {
            violations.push(Violation::new(
                pointer(&["paths", path, method]),
                format!("path parameter '{name}' is not declared"),
            ));
        }
    }
}

fn template_names(path: &str) -> BTreeSet<&str> {
    path.split('{')
        .skip(1)
        .filter_map(|segment| segment.split_once('}').map(|(name, _)| name))
        .collect()
}

fn dereference<'a>(document: &'a Value, value: &'a Value) -> Option<&'a Value> {
    match value.get("$ref").and_then(Value::as_str) {
        Some(reference) => resolver::resolve_local(document, reference),
        None => Some(value),
    }
}

fn check_required_properties(document: &Value, violations: &mut Violations) {
    walk(document, &mut Vec::new(), &mut |tokens, object| {
        let (Some(Value::Array(required)), Some(Value::Object(properties))) =
            (object.get("required"), object.get("properties"))
        else {
            return;
        };
        if ["allOf", "anyOf", "oneOf"]
            .iter()
            .any(|key| object.contains_key(*key))
        {
            return;
        }
        for name in required.iter().filter_map(Value::as_str) {
            if !properties.contains_key(name) {
                violations.push(Violation::new(
                    pointer(tokens),
                    format!("required property '{name}' is not defined in properties"),
                ));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(document: &Value) -> Vec<String> {
        run(document)
            .into_inner()
            .into_iter()
            .map(|violation| format!("{} {}", violation.instance_path, violation.message))
            .collect()
    }

    fn operation(operation_id: &str) -> Value {
        json!({
            "operationId": operation_id,
            "responses": {"200": {"description": "ok"}}
        })
    }

    #[test]
    fn clean_document_has_no_violations() {
        let document = json!({
            "paths": {"/pets/{petId}": {
                "parameters": [{"$ref": "#/components/parameters/PetId"}],
                "get": operation("getPet")
            }},
            "components": {
                "parameters": {"PetId": {"name": "petId", "in": "path", "required": true}},
                "schemas": {"Pet": {"required": ["id"], "properties": {"id": {}}}}
            }
        });
        assert!(messages(&document).is_empty());
    }

    #[test]
    fn unresolvable_and_external_references() {
        let document = json!({
            "components": {"schemas": {
                "Pet": {"properties": {
                    "owner": {"$ref": "#/components/schemas/Owner"},
                    "tag": {"$ref": "common.yaml#/components/schemas/Tag"}
                }}
            }}
        });
        let found = messages(&document);
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|m| {
            m.starts_with("/components/schemas/Pet/properties/owner/$ref")
                && m.contains("cannot be resolved")
        }));
        assert!(found.iter().any(|m| m.contains("external reference")));
    }

    #[test]
    fn examples_are_not_checked_for_references() {
        let document = json!({
            "components": {"schemas": {
                "Link": {
                    "type": "object",
                    "example": {"$ref": "#/nowhere"},
                    "properties": {"example": {"$ref": "#/components/schemas/Link"}}
                }
            }}
        });
        assert!(messages(&document).is_empty());
    }

    #[test]
    fn example_values_and_extensions_are_data() {
        let payload = json!({
            "$ref": "#/nowhere",
            "required": ["missing"],
            "properties": {}
        });
        let document = json!({
            "x-internal": payload.clone(),
            "paths": {"/pets": {"get": {
                "responses": {"200": {
                    "description": "ok",
                    "content": {"application/json": {
                        "examples": {"Sample": {"value": payload.clone()}}
                    }}
                }},
                "x-codegen": payload.clone()
            }}},
            "components": {
                "examples": {"Sample": {"value": payload.clone()}},
                "schemas": {"Pet": {"type": "object", "x-meta": payload}}
            }
        });
        assert!(messages(&document).is_empty());
    }

    #[test]
    fn default_response_is_checked() {
        let document = json!({
            "paths": {"/pets": {"get": {
                "responses": {"default": {"$ref": "#/components/responses/Missing"}}
            }}},
            "components": {"schemas": {"Pet": {
                "type": "object",
                "properties": {"responses": {"type": "object", "default": {"$ref": "#/nowhere"}}}
            }}}
        });
        let found = messages(&document);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("/paths/~1pets/get/responses/default/$ref"));
    }

    #[test]
    fn extension_named_headers_are_checked() {
        let document = json!({
            "components": {"headers": {
                "x-rate-limit": {"schema": {"$ref": "#/components/schemas/Missing"}}
            }}
        });
        assert_eq!(messages(&document).len(), 1);
    }

    #[test]
    fn duplicate_operation_ids() {
        let document = json!({"paths": {
            "/a": {"get": operation("same")},
            "/b": {"get": operation("same"), "post": operation("other")}
        }});
        let found = messages(&document);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("/paths/~1b/get/operationId"));
        assert!(found[0].contains("/paths/~1a/get/operationId"));
    }

    #[test]
    fn undeclared_path_parameters() {
        let document = json!({"paths": {
            "/users/{userId}/pets/{petId}": {
                "get": {
                    "parameters": [{"name": "userId", "in": "path", "required": true}],
                    "responses": {"200": {"description": "ok"}}
                },
                "delete": {
                    "parameters": [
                        {"name": "userId", "in": "path", "required": true},
                        {"name": "petId", "in": "query"}
                    ],
                    "responses": {"204": {"description": "gone"}}
                }
            }
        }});
        let found = messages(&document);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| m.contains("'petId' is not declared")));
    }

    #[test]
    fn template_names_are_extracted() {
        let names: Vec<&str> = template_names("/a/{x}/b/{y}.{format}").into_iter().collect();
        assert_eq!(names, vec!["format", "x", "y"]);
        assert!(template_names("/plain").is_empty());
    }

    #[test]
    fn required_properties_must_be_defined() {
        let document = json!({"components": {"schemas": {
            "Pet": {"type": "object", "required": ["id", "name"], "properties": {"id": {}}},
            "Composed": {
                "required": ["name"],
                "properties": {"id": {}},
                "allOf": [{"$ref": "#/components/schemas/Pet"}]
            }
        }}});
        let found = messages(&document);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("/components/schemas/Pet "));
        assert!(found[0].contains("'name'"));
    }
}
