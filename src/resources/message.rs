use super::string_field;
use crate::client::TelerivetError;
use crate::domain::{HttpMethod, ResourceKind};
use crate::entity::Entity;

pub const MESSAGE: ResourceKind =
    ResourceKind::new("message", "/projects/{project_id}/messages/{id}");

#[derive(Debug, Clone)]
/// An incoming or outgoing message.
pub struct Message<'c> {
    entity: Entity<'c>,
}

impl<'c> From<Entity<'c>> for Message<'c> {
    fn from(entity: Entity<'c>) -> Self {
        Self { entity }
    }
}

impl<'c> Message<'c> {
    pub fn entity(&self) -> &Entity<'c> {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity<'c> {
        &mut self.entity
    }

    pub fn into_entity(self) -> Entity<'c> {
        self.entity
    }

    pub async fn content(&mut self) -> Result<Option<String>, TelerivetError> {
        string_field(&mut self.entity, "content").await
    }

    pub async fn status(&mut self) -> Result<Option<String>, TelerivetError> {
        string_field(&mut self.entity, "status").await
    }

    /// `incoming` or `outgoing`.
    pub async fn direction(&mut self) -> Result<Option<String>, TelerivetError> {
        string_field(&mut self.entity, "direction").await
    }

    /// Send a copy of this message again (`POST .../resend`); returns the new message.
    pub async fn resend(&self) -> Result<Message<'c>, TelerivetError> {
        let value = self.entity.action(HttpMethod::Post, "resend", None).await?;
        let path = format!("{}/resend", self.entity.path());
        let mut fields = crate::transport::decode_object(value)
            .map_err(|err| TelerivetError::protocol(HttpMethod::Post, &path, err))?;
        if let Some(project_id) = self.entity.fields()?.get("project_id") {
            fields
                .entry("project_id")
                .or_insert_with(|| project_id.clone());
        }
        let entity = self.entity.client().make_entity(MESSAGE, fields, true)?;
        Ok(Message::from(entity))
    }

    pub async fn delete(&mut self) -> Result<(), TelerivetError> {
        self.entity.delete().await
    }
}
