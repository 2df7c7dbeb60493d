use std::io;

use telerivet::{FilterOp, Query, ResourceId, SortDir, TelerivetClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let project_id = std::env::var("TELERIVET_PROJECT_ID").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "TELERIVET_PROJECT_ID environment variable is required",
        )
    })?;
    let prefix = std::env::var("TELERIVET_NAME_PREFIX").unwrap_or_default();

    let client = TelerivetClient::from_env()?;
    let project = client.project(ResourceId::new(project_id)?)?;

    let mut query = Query::new().sort("name").sort_dir(SortDir::Asc);
    if !prefix.is_empty() {
        query = query.filter_op("name", FilterOp::Prefix, prefix);
    }
    let mut contacts = project.contacts(query);
    println!("matching contacts: {}", contacts.count().await?);

    contacts.limit(20)?;
    while let Some(contact) = contacts.next().await? {
        let fields = contact.fields()?;
        println!(
            "{} {} {}",
            contact.path(),
            fields.get("name").and_then(|v| v.as_str()).unwrap_or("-"),
            fields
                .get("phone_number")
                .and_then(|v| v.as_str())
                .unwrap_or("-"),
        );
    }

    Ok(())
}
