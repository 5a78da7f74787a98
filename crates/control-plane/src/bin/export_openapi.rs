// Export the OpenAPI document as JSON
//
// Usage: cargo run --bin export-openapi > docs/api/openapi.json
//
// This binary generates the OpenAPI document without starting the API server.

use sportsboard_control_plane::openapi::ApiDoc;

fn main() -> Result<(), serde_json::Error> {
    println!("{}", ApiDoc::to_json()?);
    Ok(())
}
