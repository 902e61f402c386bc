//! services/api/src/bin/openapi.rs
//!
//! Writes the Momentum OpenAPI document to disk.
//!
//! Usage: `openapi [OUTPUT]` (defaults to `openapi.json`).

use std::error::Error;
use std::path::PathBuf;

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn Error>> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let doc = ApiDoc::openapi();
    let operations = doc.paths.paths.len();
    std::fs::write(&output, doc.to_pretty_json()?)?;

    println!(
        "Wrote {} paths for {} v{} to {}",
        operations,
        doc.info.title,
        doc.info.version,
        output.display()
    );
    Ok(())
}
