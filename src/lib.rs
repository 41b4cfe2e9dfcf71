pub mod cli;
pub mod dialect;
pub mod error;
pub mod loader;
pub mod output;
pub mod resolver;
pub mod spec;
pub mod validate;

use anyhow::Result;
use clap::Parser;
use std::path::Path;

pub use error::{Error, ErrorKind, Violation, Violations};
pub use resolver::RefResolver;
pub use spec::OpenApiSpec;
pub use validate::DocumentValidator;

use crate::cli::Cli;
use crate::output::Output;

pub const SUCCESS_MARKER: &str = "OK";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new();

    check(&cli.spec, &cli.json, &cli.schema)?;

    output.println_always(SUCCESS_MARKER);
    Ok(())
}

/// Validate the JSON document at `json_path` against `components.schemas[schema_name]`
/// of the OpenAPI 3.0 specification at `spec_path`.
///
/// The specification itself is validated first; a structurally invalid
/// specification fails before the document is looked at.
pub fn check(spec_path: &Path, json_path: &Path, schema_name: &str) -> Result<(), Error> {
    let spec = OpenApiSpec::load(spec_path)?;
    let document = loader::read_json_document(json_path)?;

    spec.validate()?;

    let resolver = RefResolver::from_spec(&spec);
    DocumentValidator::new(&spec, &resolver, schema_name)?.validate(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    fn kind_of(spec: &str, json: &str, schema: &str) -> Option<ErrorKind> {
        check(&fixture(spec), &fixture(json), schema)
            .err()
            .map(|err| err.kind())
    }

    #[test]
    fn pipeline_outcomes() {
        assert_eq!(kind_of("petstore.yaml", "pet.json", "Pet"), None);
        assert_eq!(kind_of("petstore.yaml", "pet-with-owner.json", "Pet"), None);
        assert_eq!(
            kind_of("petstore.yaml", "pet-wrong-type.json", "Pet"),
            Some(ErrorKind::Document)
        );
        assert_eq!(
            kind_of("petstore.yaml", "pet-bad-owner.json", "Pet"),
            Some(ErrorKind::Document)
        );
        assert_eq!(
            kind_of("petstore.yaml", "pet.json", "Dog"),
            Some(ErrorKind::SchemaName)
        );
        assert_eq!(
            kind_of("missing-openapi.yaml", "pet.json", "Pet"),
            Some(ErrorKind::Specification)
        );
        assert_eq!(
            kind_of("petstore.yaml", "absent.json", "Pet"),
            Some(ErrorKind::Io)
        );
    }

    #[test]
    fn error_schema_from_fixture_validates() {
        let spec = OpenApiSpec::load(&fixture("petstore.yaml")).unwrap();
        spec.validate().unwrap();
        assert_eq!(spec.schema_names(), vec!["Error", "Owner", "Pet"]);

        let resolver = RefResolver::from_spec(&spec);
        let error = DocumentValidator::new(&spec, &resolver, "Error").unwrap();
        assert!(error.is_valid(&serde_json::json!({"code": 404, "message": "not found"})));
        assert!(error.is_valid(&serde_json::json!({"code": 4294967296_i64, "message": "big"})));
        assert!(!error.is_valid(&serde_json::json!({"code": "404", "message": "not found"})));
    }
}
