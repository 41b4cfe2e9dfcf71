use jsonschema::Validator;
use serde_json::Value;

use crate::dialect;
use crate::error::{Error, Violation, Violations};
use crate::resolver::RefResolver;
use crate::spec::OpenApiSpec;

/// A compiled validator for one schema of a specification.
pub struct DocumentValidator {
    schema_name: String,
    validator: Validator,
}

impl DocumentValidator {
    /// Compile `components.schemas[schema_name]` with references resolved
    /// through `resolver`.
    ///
    /// Fails with [`Error::SchemaNotFound`] for an unknown name and
    /// [`Error::Compile`] if the schema cannot be compiled.
    pub fn new(
        spec: &OpenApiSpec,
        resolver: &RefResolver,
        schema_name: &str,
    ) -> Result<Self, Error> {
        spec.schema(schema_name)?;
        let root = resolver.entry_point(schema_name);
        let validator = dialect::options()
            .build(&root)
            .map_err(|err| Error::Compile {
                name: schema_name.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            schema_name: schema_name.to_string(),
            validator,
        })
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.validator.is_valid(document)
    }

    /// Validate `document`, collecting every violation the validator reports.
    pub fn validate(&self, document: &Value) -> Result<(), Error> {
        let violations: Violations = self
            .validator
            .iter_errors(document)
            .map(Violation::from)
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidDocument {
                schema_name: self.schema_name.clone(),
                violations,
            })
        }
    }
}
