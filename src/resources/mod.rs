//! Typed facades over [`Entity`](crate::Entity) for a few API resources.
//!
//! Each facade supplies a [`ResourceKind`](crate::ResourceKind) (name and
//! canonical path template), typed accessors for common fields and any
//! resource-specific verbs. All state and I/O stay in the generic entity.

mod contact;
mod message;
mod project;

pub use contact::{CONTACT, Contact};
pub use message::{MESSAGE, Message};
pub use project::{PROJECT, Project};

use serde_json::Value;

use crate::client::TelerivetError;
use crate::entity::Entity;

async fn string_field(
    entity: &mut Entity<'_>,
    name: &str,
) -> Result<Option<String>, TelerivetError> {
    Ok(entity
        .get(name)
        .await?
        .and_then(Value::as_str)
        .map(str::to_owned))
}
