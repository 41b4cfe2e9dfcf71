mod checks;
mod meta;

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{Error, Violations};
use crate::loader;

/// A loaded OpenAPI 3.0 specification.
#[derive(Debug, Clone)]
pub struct OpenApiSpec {
    path: PathBuf,
    document: Value,
}

impl OpenApiSpec {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let document = loader::read_spec_document(path)?;
        Ok(Self::from_value(path.to_path_buf(), document))
    }

    pub fn from_value(path: PathBuf, document: Value) -> Self {
        Self { path, document }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn version(&self) -> Option<&str> {
        self.document.get("openapi").and_then(Value::as_str)
    }

    /// Names declared under `components.schemas`, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .document
            .pointer("/components/schemas")
            .and_then(Value::as_object)
            .map(|schemas| schemas.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Look up `components.schemas[name]`.
    pub fn schema(&self, name: &str) -> Result<&Value, Error> {
        self.document
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(|schemas| schemas.get(name))
            .ok_or_else(|| Error::SchemaNotFound {
                name: name.to_string(),
            })
    }

    /// Check the document against the OpenAPI 3.0 meta-schema, then run the
    /// semantic checks the meta-schema cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        let violations = meta::validate(&self.document)?;
        self.fail_on(violations)?;
        self.fail_on(checks::run(&self.document))
    }

    fn fail_on(&self, violations: Violations) -> Result<(), Error> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidSpec {
                path: self.path.clone(),
                violations,
            })
        }
    }
}
