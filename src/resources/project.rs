use serde_json::{Map, Value};

use super::{Contact, Message, string_field};
use crate::client::{TelerivetClient, TelerivetError};
use crate::cursor::Cursor;
use crate::domain::{HttpMethod, Query, ResourceId, ResourceKind};
use crate::entity::Entity;

pub const PROJECT: ResourceKind = ResourceKind::new("project", "/projects/{id}");

const PROJECT_ID_FIELD: &str = "project_id";

#[derive(Debug, Clone)]
/// A Telerivet project: the scope every contact and message lives in.
pub struct Project<'c> {
    id: ResourceId,
    entity: Entity<'c>,
}

impl<'c> Project<'c> {
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn entity(&self) -> &Entity<'c> {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity<'c> {
        &mut self.entity
    }

    pub async fn name(&mut self) -> Result<Option<String>, TelerivetError> {
        string_field(&mut self.entity, "name").await
    }

    /// Contacts in this project matching `query`.
    pub fn contacts(&self, query: Query) -> Cursor<'c> {
        self.entity.client().make_cursor(
            super::CONTACT,
            format!("{}/contacts", self.entity.path()),
            query,
        )
    }

    /// Messages in this project matching `query`.
    pub fn messages(&self, query: Query) -> Cursor<'c> {
        self.entity.client().make_cursor(
            super::MESSAGE,
            format!("{}/messages", self.entity.path()),
            query,
        )
    }

    /// Identifier-only contact; fields load on first access.
    pub fn contact(&self, id: ResourceId) -> Result<Contact<'c>, TelerivetError> {
        let entity = self.entity.client().make_entity(
            super::CONTACT,
            self.scoped_fields(&id),
            false,
        )?;
        Ok(Contact::from(entity))
    }

    /// Identifier-only message; fields load on first access.
    pub fn message(&self, id: ResourceId) -> Result<Message<'c>, TelerivetError> {
        let entity = self.entity.client().make_entity(
            super::MESSAGE,
            self.scoped_fields(&id),
            false,
        )?;
        Ok(Message::from(entity))
    }

    /// Send a message (`POST /projects/{id}/messages/send`).
    ///
    /// `params` is passed through verbatim (`content`, `to_number`, ...).
    pub async fn send_message(
        &self,
        params: Map<String, Value>,
    ) -> Result<Message<'c>, TelerivetError> {
        let path = format!("{}/messages/send", self.entity.path());
        let entity = self.post_scoped(&path, params, super::MESSAGE).await?;
        Ok(Message::from(entity))
    }

    /// Find a contact by phone number or create it (`POST /projects/{id}/contacts`).
    pub async fn get_or_create_contact(
        &self,
        params: Map<String, Value>,
    ) -> Result<Contact<'c>, TelerivetError> {
        let path = format!("{}/contacts", self.entity.path());
        let entity = self.post_scoped(&path, params, super::CONTACT).await?;
        Ok(Contact::from(entity))
    }

    fn scoped_fields(&self, id: &ResourceId) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(ResourceId::FIELD.to_owned(), Value::String(id.to_string()));
        fields.insert(PROJECT_ID_FIELD.to_owned(), Value::String(self.id.to_string()));
        fields
    }

    async fn post_scoped(
        &self,
        path: &str,
        params: Map<String, Value>,
        kind: ResourceKind,
    ) -> Result<Entity<'c>, TelerivetError> {
        let client = self.entity.client();
        let value = client
            .request(HttpMethod::Post, path, Some(&params))
            .await?;
        let mut fields = crate::transport::decode_object(value)
            .map_err(|err| TelerivetError::protocol(HttpMethod::Post, path, err))?;
        fields
            .entry(PROJECT_ID_FIELD)
            .or_insert_with(|| Value::String(self.id.to_string()));
        client.make_entity(kind, fields, true)
    }
}

impl TelerivetClient {
    /// Identifier-only project; fields load on first access.
    pub fn project(&self, id: ResourceId) -> Result<Project<'_>, TelerivetError> {
        let mut fields = Map::new();
        fields.insert(ResourceId::FIELD.to_owned(), Value::String(id.to_string()));
        let entity = self.make_entity(PROJECT, fields, false)?;
        Ok(Project { id, entity })
    }

    /// Projects accessible with this API key.
    pub fn projects(&self, query: Query) -> Cursor<'_> {
        self.make_cursor(PROJECT, "/projects", query)
    }
}
