//! Generic, dirty-tracked representation of one server resource.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{TelerivetClient, TelerivetError};
use crate::domain::{HttpMethod, ResourceId, ResourceKind};

/// Reserved field holding custom variables.
pub const VARS_FIELD: &str = "vars";

#[derive(Debug, Clone)]
/// One server resource as an open field mapping.
///
/// An entity is either hydrated (built from a previous response) or
/// identifier-only, in which case the first read fetches it with one `GET`
/// on its canonical path. Reads after that use the cached mapping; call
/// [`Entity::reload`] for fresh data.
///
/// [`Entity::set`] and [`Entity::set_var`] only touch the local mapping.
/// [`Entity::save`] sends the changed fields, and for custom variables only
/// the changed variables, in a single `POST`.
///
/// After [`Entity::delete`] succeeds the entity is stale and every further
/// operation fails with [`TelerivetError::StaleEntity`].
///
/// Mutation takes `&mut self`; sharing one entity between tasks requires
/// external synchronization.
pub struct Entity<'c> {
    client: &'c TelerivetClient,
    kind: ResourceKind,
    path: String,
    fields: Map<String, Value>,
    dirty_fields: BTreeSet<String>,
    dirty_vars: BTreeSet<String>,
    loaded: bool,
    stale: bool,
}

impl<'c> Entity<'c> {
    pub(crate) fn new(
        client: &'c TelerivetClient,
        kind: ResourceKind,
        fields: Map<String, Value>,
        loaded: bool,
    ) -> Result<Self, TelerivetError> {
        let path = kind.path_for(&fields)?;
        Ok(Self {
            client,
            kind,
            path,
            fields,
            dirty_fields: BTreeSet::new(),
            dirty_vars: BTreeSet::new(),
            loaded,
            stale: false,
        })
    }

    pub fn client(&self) -> &'c TelerivetClient {
        self.client
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Canonical server-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The `id` field, when it is a non-empty string.
    pub fn id(&self) -> Option<ResourceId> {
        self.fields
            .get(ResourceId::FIELD)
            .and_then(Value::as_str)
            .and_then(|id| ResourceId::new(id).ok())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether [`Entity::save`] would send anything.
    pub fn is_dirty(&self) -> bool {
        !self.dirty_fields.is_empty() || !self.dirty_vars.is_empty()
    }

    /// Names of fields changed since the last load or save.
    ///
    /// Includes [`VARS_FIELD`] when only individual custom variables changed.
    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        let vars = (!self.dirty_vars.is_empty() && !self.dirty_fields.contains(VARS_FIELD))
            .then_some(VARS_FIELD);
        self.dirty_fields.iter().map(String::as_str).chain(vars)
    }

    /// The cached mapping, without fetching.
    pub fn fields(&self) -> Result<&Map<String, Value>, TelerivetError> {
        self.ensure_live()?;
        Ok(&self.fields)
    }

    /// Fetch the entity if it has not been loaded yet.
    ///
    /// Local edits made before the first load survive it: dirty values are
    /// written back over the fetched mapping.
    pub async fn ensure_loaded(&mut self) -> Result<(), TelerivetError> {
        self.ensure_live()?;
        if self.loaded {
            return Ok(());
        }

        let mut fetched = self.fetch().await?;
        for name in &self.dirty_fields {
            if let Some(value) = self.fields.get(name) {
                fetched.insert(name.clone(), value.clone());
            }
        }
        if !self.dirty_vars.is_empty() {
            let local = self.vars().cloned().unwrap_or_default();
            if let Some(merged) = vars_entry(&mut fetched) {
                for name in &self.dirty_vars {
                    if let Some(value) = local.get(name) {
                        merged.insert(name.clone(), value.clone());
                    }
                }
            }
        }

        self.fields = fetched;
        self.loaded = true;
        Ok(())
    }

    /// Re-fetch the entity, discarding unsaved local edits.
    pub async fn reload(&mut self) -> Result<(), TelerivetError> {
        self.ensure_live()?;
        let fetched = self.fetch().await?;
        self.fields = fetched;
        self.dirty_fields.clear();
        self.dirty_vars.clear();
        self.loaded = true;
        Ok(())
    }

    /// Read a field, fetching the entity first if it is identifier-only.
    ///
    /// Returns `Ok(None)` when the server did not return the field.
    pub async fn get(&mut self, name: &str) -> Result<Option<&Value>, TelerivetError> {
        self.ensure_loaded().await?;
        Ok(self.fields.get(name))
    }

    /// Write a field locally and mark it dirty. Unknown field names are allowed.
    ///
    /// Setting [`VARS_FIELD`] replaces the whole custom-variable map on save.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), TelerivetError> {
        self.ensure_live()?;
        let name = name.into();
        if name == VARS_FIELD {
            self.dirty_vars.clear();
        }
        self.fields.insert(name.clone(), value.into());
        self.dirty_fields.insert(name);
        Ok(())
    }

    /// Read one custom variable, fetching the entity first if needed.
    pub async fn get_var(&mut self, name: &str) -> Result<Option<&Value>, TelerivetError> {
        self.ensure_loaded().await?;
        Ok(self.vars().and_then(|vars| vars.get(name)))
    }

    /// Write one custom variable locally. `null` deletes it on save.
    pub fn set_var(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), TelerivetError> {
        self.ensure_live()?;
        let name = name.into();
        if let Some(vars) = vars_entry(&mut self.fields) {
            vars.insert(name.clone(), value.into());
        }
        if !self.dirty_fields.contains(VARS_FIELD) {
            self.dirty_vars.insert(name);
        }
        Ok(())
    }

    /// Persist dirty fields with one `POST`; a no-op when nothing changed.
    ///
    /// On success the server's response becomes the field mapping. On failure
    /// the dirty set is kept, so calling `save` again resends the same edits.
    pub async fn save(&mut self) -> Result<(), TelerivetError> {
        self.ensure_live()?;
        if !self.is_dirty() {
            return Ok(());
        }

        let payload = self.dirty_payload();
        debug!(kind = self.kind.name(), path = %self.path, fields = payload.len(), "saving entity");
        let response = self
            .client
            .request(HttpMethod::Post, &self.path, Some(&payload))
            .await?;
        let saved = crate::transport::decode_object(response)
            .map_err(|err| TelerivetError::protocol(HttpMethod::Post, &self.path, err))?;

        if !saved.is_empty() {
            self.fields = saved;
            self.loaded = true;
        }
        self.dirty_fields.clear();
        self.dirty_vars.clear();
        Ok(())
    }

    /// Delete the resource with one `DELETE`; the entity becomes stale.
    pub async fn delete(&mut self) -> Result<(), TelerivetError> {
        self.ensure_live()?;
        self.client
            .request(HttpMethod::Delete, &self.path, None)
            .await?;
        debug!(kind = self.kind.name(), path = %self.path, "entity deleted");
        self.stale = true;
        self.dirty_fields.clear();
        self.dirty_vars.clear();
        Ok(())
    }

    /// Invoke a resource-specific verb below the entity's path, e.g. `resend`.
    pub async fn action(
        &self,
        method: HttpMethod,
        action: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<Value, TelerivetError> {
        self.ensure_live()?;
        let path = format!("{}/{}", self.path, action.trim_start_matches('/'));
        self.client.request(method, &path, params).await
    }

    fn ensure_live(&self) -> Result<(), TelerivetError> {
        if self.stale {
            return Err(TelerivetError::StaleEntity {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    async fn fetch(&self) -> Result<Map<String, Value>, TelerivetError> {
        let value = self
            .client
            .request(HttpMethod::Get, &self.path, None)
            .await?;
        crate::transport::decode_object(value)
            .map_err(|err| TelerivetError::protocol(HttpMethod::Get, &self.path, err))
    }

    fn vars(&self) -> Option<&Map<String, Value>> {
        self.fields.get(VARS_FIELD).and_then(Value::as_object)
    }

    fn dirty_payload(&self) -> Map<String, Value> {
        let mut payload: Map<String, Value> = self
            .fields
            .iter()
            .filter(|(name, _)| self.dirty_fields.contains(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        if !self.dirty_vars.is_empty() && !self.dirty_fields.contains(VARS_FIELD) {
            let vars = self.vars();
            let changed: Map<String, Value> = self
                .dirty_vars
                .iter()
                .map(|name| {
                    let value = vars
                        .and_then(|v| v.get(name))
                        .cloned()
                        .unwrap_or(Value::Null);
                    (name.clone(), value)
                })
                .collect();
            payload.insert(VARS_FIELD.to_owned(), Value::Object(changed));
        }
        payload
    }
}

/// The custom-variable map in `fields`, created (or reset from a non-object) on demand.
fn vars_entry(fields: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    let entry = fields
        .entry(VARS_FIELD)
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    entry.as_object_mut()
}
