use serde_json::{Map, Number, Value};
use std::fs;
use std::path::Path;

use crate::error::Error;

/// Read a specification document. `.json` files go through `serde_json`,
/// anything else is parsed as YAML.
pub fn read_spec_document(path: &Path) -> Result<Value, Error> {
    let content = read(path)?;
    if is_json(path) {
        return parse_json(path, &content);
    }
    parse_yaml(&content).map_err(|reason| Error::Parse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse YAML text into a JSON value, applying merge keys.
pub(crate) fn parse_yaml(content: &str) -> Result<Value, String> {
    let mut yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|err| err.to_string())?;
    yaml.apply_merge().map_err(|err| err.to_string())?;
    yaml_to_json(yaml)
}

pub fn read_json_document(path: &Path) -> Result<Value, Error> {
    let content = read(path)?;
    parse_json(path, &content)
}

fn read(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json(path: &Path, content: &str) -> Result<Value, Error> {
    serde_json::from_str(content).map_err(|err| parse_error(path, err))
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn is_json(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_lowercase()),
        Some(ext) if ext == "json"
    )
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, String> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(flag) => Value::Bool(flag),
        serde_yaml::Value::Number(number) => Value::Number(yaml_number(&number)?),
        serde_yaml::Value::String(text) => Value::String(text),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                object.insert(mapping_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(number: &serde_yaml::Number) -> Result<Number, String> {
    if let Some(int) = number.as_i64() {
        return Ok(Number::from(int));
    }
    if let Some(uint) = number.as_u64() {
        return Ok(Number::from(uint));
    }
    number
        .as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| format!("{number} cannot be represented in JSON"))
}

// Unquoted response codes (`200:`) parse as integers.
fn mapping_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(text) => Ok(text),
        serde_yaml::Value::Number(number) => Ok(number.to_string()),
        serde_yaml::Value::Bool(flag) => Ok(flag.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => mapping_key(tagged.value),
        other => Err(format!("unsupported mapping key: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::error::Error as _;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn yaml_integer_keys_become_strings() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "spec.yaml",
            "responses:\n  200:\n    description: ok\n  default:\n    description: other\n",
        );
        let doc = read_spec_document(&path).unwrap();
        assert_eq!(doc["responses"]["200"]["description"], json!("ok"));
        assert_eq!(doc["responses"]["default"]["description"], json!("other"));
    }

    #[test]
    fn yaml_merge_keys_are_applied() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "spec.yaml",
            "base: &base\n  type: string\nderived:\n  <<: *base\n  minLength: 1\n",
        );
        let doc = read_spec_document(&path).unwrap();
        assert_eq!(doc["derived"], json!({"type": "string", "minLength": 1}));
    }

    #[test]
    fn json_spec_is_parsed_as_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "spec.json", r#"{"openapi": "3.0.3", "n": 1.5}"#);
        let doc = read_spec_document(&path).unwrap();
        assert_eq!(doc, json!({"openapi": "3.0.3", "n": 1.5}));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "spec.yaml", "maximum: .inf\n");
        let err = read_spec_document(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "doc.json", "{\"id\": ");
        let err = read_json_document(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_json_document(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.source().is_some());
    }
}
