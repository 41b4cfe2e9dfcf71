use include_dir::{Dir, include_dir};
use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::error::{Error, Violation, Violations};
use crate::loader;
use crate::resolver::LocalOnlyRetriever;

static ASSETS: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets");

const META_SCHEMA: &str = "openapi-3.0.schema.yaml";

/// Validate `document` against the OpenAPI 3.0 meta-schema.
pub fn validate(document: &Value) -> Result<Violations, Error> {
    let validator = compile()?;
    Ok(validator.iter_errors(document).map(Violation::from).collect())
}

fn compile() -> Result<Validator, Error> {
    let schema = meta_schema()?;
    jsonschema::options()
        .with_draft(Draft::Draft4)
        .with_retriever(LocalOnlyRetriever)
        .build(&schema)
        .map_err(|err| meta_schema_error(err.to_string()))
}

fn meta_schema() -> Result<Value, Error> {
    let content = ASSETS
        .get_file(META_SCHEMA)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| meta_schema_error(format!("{META_SCHEMA} is not embedded")))?;
    loader::parse_yaml(content).map_err(meta_schema_error)
}

fn meta_schema_error(reason: String) -> Error {
    Error::MetaSchema { reason }
}
