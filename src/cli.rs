use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "openapi-validator",
    version,
    about = "Validates a piece of JSON against an OpenAPI specification."
)]
pub struct Cli {
    /// The path to an OpenAPI 3.0 specification.
    pub spec: PathBuf,
    /// The path to the JSON file that will be validated against the given specification.
    pub json: PathBuf,
    /// The name of the root schema in the given specification that the JSON should be validated against.
    pub schema: String,
}
