use openapi_document_validator::output::Output;

fn main() {
    if let Err(err) = openapi_document_validator::run() {
        Output::new().print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
