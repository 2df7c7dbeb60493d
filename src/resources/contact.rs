use super::string_field;
use crate::client::TelerivetError;
use crate::cursor::Cursor;
use crate::domain::{Query, ResourceKind};
use crate::entity::Entity;

pub const CONTACT: ResourceKind =
    ResourceKind::new("contact", "/projects/{project_id}/contacts/{id}");

#[derive(Debug, Clone)]
/// A contact: a phone number plus name and custom variables.
pub struct Contact<'c> {
    entity: Entity<'c>,
}

impl<'c> From<Entity<'c>> for Contact<'c> {
    fn from(entity: Entity<'c>) -> Self {
        Self { entity }
    }
}

impl<'c> Contact<'c> {
    pub fn entity(&self) -> &Entity<'c> {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity<'c> {
        &mut self.entity
    }

    pub fn into_entity(self) -> Entity<'c> {
        self.entity
    }

    pub async fn name(&mut self) -> Result<Option<String>, TelerivetError> {
        string_field(&mut self.entity, "name").await
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), TelerivetError> {
        self.entity.set("name", name.into())
    }

    pub async fn phone_number(&mut self) -> Result<Option<String>, TelerivetError> {
        string_field(&mut self.entity, "phone_number").await
    }

    pub fn set_phone_number(
        &mut self,
        phone_number: impl Into<String>,
    ) -> Result<(), TelerivetError> {
        self.entity.set("phone_number", phone_number.into())
    }

    /// Messages sent to or received from this contact.
    pub fn messages(&self, query: Query) -> Cursor<'c> {
        self.entity.client().make_cursor(
            super::MESSAGE,
            format!("{}/messages", self.entity.path()),
            query,
        )
    }

    pub async fn save(&mut self) -> Result<(), TelerivetError> {
        self.entity.save().await
    }

    pub async fn delete(&mut self) -> Result<(), TelerivetError> {
        self.entity.delete().await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::*;
    use crate::client::fake::{FakeTransport, fake_client};
    use crate::domain::{HttpMethod, ResourceId};

    #[tokio::test]
    async fn rename_saves_only_name() {
        let transport = FakeTransport::new();
        transport.push_json(
            200,
            json!({"id": "CT1", "project_id": "PJ1", "name": "Al", "phone_number": "+1555"}),
        );
        transport.push_json(
            200,
            json!({"id": "CT1", "project_id": "PJ1", "name": "Alice", "phone_number": "+1555"}),
        );
        let client = fake_client(transport.clone());

        let project = client.project(ResourceId::new("PJ1").unwrap()).unwrap();
        let mut contact = project.contact(ResourceId::new("CT1").unwrap()).unwrap();
        assert_eq!(contact.name().await.unwrap().as_deref(), Some("Al"));

        contact.set_name("Alice").unwrap();
        contact.save().await.unwrap();

        let request = transport.last_request();
        assert!(request.is(HttpMethod::Post, "/projects/PJ1/contacts/CT1"));
        assert_eq!(request.json_body(), Some(json!({"name": "Alice"})));
        assert_eq!(contact.name().await.unwrap().as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn messages_cursor_nests_under_contact() {
        let transport = FakeTransport::new();
        transport.push_json(200, json!({"data": [], "truncated": false}));
        let client = fake_client(transport.clone());

        let mut fields = Map::new();
        fields.insert("id".to_owned(), Value::from("CT1"));
        fields.insert("project_id".to_owned(), Value::from("PJ1"));
        let contact = Contact::from(client.make_entity(CONTACT, fields, true).unwrap());

        let mut cursor = contact.messages(Query::new());
        assert!(cursor.next().await.unwrap().is_none());
        assert!(
            transport
                .last_request()
                .is(HttpMethod::Get, "/projects/PJ1/contacts/CT1/messages")
        );
    }

    #[tokio::test]
    async fn delete_makes_contact_stale() {
        let transport = FakeTransport::new();
        transport.push_json(200, json!({}));
        let client = fake_client(transport);

        let project = client.project(ResourceId::new("PJ1").unwrap()).unwrap();
        let mut contact = project.contact(ResourceId::new("CT1").unwrap()).unwrap();
        contact.delete().await.unwrap();
        assert!(matches!(
            contact.name().await,
            Err(TelerivetError::StaleEntity { .. })
        ));
    }
}
