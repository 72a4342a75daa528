// Prints the OpenAPI document served at /api-docs/openapi.json
// Usage: cargo run --bin openapi_export > openapi.json

use error_responder::api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
    println!("{}", json);
    Ok(())
}
