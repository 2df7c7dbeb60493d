use std::io;

use serde_json::{Map, Value};
use telerivet::{ResourceId, TelerivetClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let project_id = std::env::var("TELERIVET_PROJECT_ID").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "TELERIVET_PROJECT_ID environment variable is required",
        )
    })?;
    let to_number = std::env::var("TELERIVET_TO_NUMBER").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "TELERIVET_TO_NUMBER environment variable is required",
        )
    })?;
    let content = std::env::var("TELERIVET_MESSAGE")
        .unwrap_or_else(|_| "Hello from the telerivet demo.".to_owned());

    let client = TelerivetClient::from_env()?;
    let project = client.project(ResourceId::new(project_id)?)?;

    let mut params = Map::new();
    params.insert("to_number".to_owned(), Value::String(to_number));
    params.insert("content".to_owned(), Value::String(content));
    let mut message = project.send_message(params).await?;

    let status = message.status().await?;
    println!("id: {:?}, status: {:?}", message.entity().id(), status);

    Ok(())
}
