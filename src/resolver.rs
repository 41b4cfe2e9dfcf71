//! Reference resolution inside a single OpenAPI document.
//!
//! Every `$ref` is interpreted relative to the specification it appears in.
//! The translated document doubles as the root schema handed to `jsonschema`,
//! so `#/components/schemas/<name>` and any other JSON pointer into the
//! document resolve natively.

use jsonschema::{Retrieve, Uri};
use serde_json::{Value, json};

use crate::dialect;
use crate::spec::OpenApiSpec;

/// A resolution context bound to one specification.
#[derive(Debug, Clone)]
pub struct RefResolver {
    root: Value,
}

impl RefResolver {
    pub fn from_spec(spec: &OpenApiSpec) -> Self {
        let mut root = spec.document().clone();
        dialect::translate_document(&mut root);
        Self { root }
    }

    /// Follow a local reference such as `#/components/schemas/Pet`.
    pub fn resolve(&self, reference: &str) -> Option<&Value> {
        resolve_local(&self.root, reference)
    }

    /// The root schema that validates an instance against the named component schema.
    pub fn entry_point(&self, schema_name: &str) -> Value {
        let mut root = self.root.clone();
        if let Value::Object(object) = &mut root {
            object.insert(
                "allOf".to_string(),
                json!([{ "$ref": component_schema_ref(schema_name) }]),
            );
        }
        root
    }
}

/// Refuses every reference that would leave the specification.
pub(crate) struct LocalOnlyRetriever;

impl Retrieve for LocalOnlyRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external reference '{}' is not supported", uri.as_str()).into())
    }
}

/// `true` for references that point inside the current document.
pub fn is_local(reference: &str) -> bool {
    reference.starts_with('#')
}

/// Resolve a `#`-prefixed reference against `document`.
pub fn resolve_local<'a>(document: &'a Value, reference: &str) -> Option<&'a Value> {
    let fragment = reference.strip_prefix('#')?;
    let pointer = percent_decode(fragment)?;
    if pointer.is_empty() {
        return Some(document);
    }
    document.pointer(&pointer)
}

pub fn component_schema_ref(schema_name: &str) -> String {
    format!(
        "#/components/schemas/{}",
        percent_encode(&escape_token(schema_name))
    )
}

/// Escape one JSON pointer reference token.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Join tokens into a JSON pointer (`""` for the document root).
pub fn pointer<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| format!("/{}", escape_token(token.as_ref())))
        .collect()
}

fn percent_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b'/') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let hex = input.get(idx + 1..idx + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            idx += 3;
        } else {
            decoded.push(bytes[idx]);
            idx += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
