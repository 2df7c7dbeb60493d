use std::io;

use telerivet::{ResourceId, TelerivetClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let project_id = std::env::var("TELERIVET_PROJECT_ID").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "TELERIVET_PROJECT_ID environment variable is required",
        )
    })?;
    let contact_id = std::env::var("TELERIVET_CONTACT_ID").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "TELERIVET_CONTACT_ID environment variable is required",
        )
    })?;
    let tag = std::env::var("TELERIVET_TAG")
        .unwrap_or_else(|_| "demo".to_owned());

    let client = TelerivetClient::from_env()?;
    let project = client.project(ResourceId::new(project_id)?)?;
    let mut contact = project.contact(ResourceId::new(contact_id)?)?;

    println!("before: {:?}", contact.entity_mut().get_var("tag").await?);
    contact.entity_mut().set_var("tag", tag)?;
    contact.save().await?;
    println!("after: {:?}", contact.entity_mut().get_var("tag").await?);

    Ok(())
}
