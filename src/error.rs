use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a specification or validating a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("{} is not a valid OpenAPI 3.0 specification:\n{violations}", .path.display())]
    InvalidSpec {
        path: PathBuf,
        violations: Violations,
    },

    #[error("schema '{name}' not found in components.schemas")]
    SchemaNotFound { name: String },

    #[error("failed to compile schema '{name}': {reason}")]
    Compile { name: String, reason: String },

    /// The meta-schema bundled into the binary is unusable; never caused by input.
    #[error("embedded OpenAPI 3.0 meta-schema is unusable: {reason}")]
    MetaSchema { reason: String },

    #[error("document does not match schema '{schema_name}':\n{violations}")]
    InvalidDocument {
        schema_name: String,
        violations: Violations,
    },
}

/// Coarse classification of an [`Error`], stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    Specification,
    SchemaName,
    Compile,
    Document,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::InvalidSpec { .. } => ErrorKind::Specification,
            Error::SchemaNotFound { .. } => ErrorKind::SchemaName,
            Error::Compile { .. } => ErrorKind::Compile,
            Error::InvalidDocument { .. } => ErrorKind::Document,
            Error::MetaSchema { .. } => ErrorKind::Internal,
        }
    }

    /// The individual failures behind a specification or document error.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Error::InvalidSpec { violations, .. } | Error::InvalidDocument { violations, .. } => {
                Some(violations)
            }
            _ => None,
        }
    }
}

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending location in the validated value.
    pub instance_path: String,
    /// JSON pointer to the schema keyword that failed, when one applies.
    pub schema_path: Option<String>,
    pub message: String,
}

impl Violation {
    pub fn new(instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance_path: instance_path.into(),
            schema_path: None,
            message: message.into(),
        }
    }
}

impl From<jsonschema::ValidationError<'_>> for Violation {
    fn from(err: jsonschema::ValidationError<'_>) -> Self {
        Self {
            instance_path: err.instance_path.to_string(),
            schema_path: Some(err.schema_path.to_string()),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)?;
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)?;
        }
        if let Some(schema_path) = &self.schema_path {
            write!(f, " (at {schema_path})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, violation) in self.violations.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}
