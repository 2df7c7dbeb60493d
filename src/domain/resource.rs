use serde_json::{Map, Value};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Descriptor for one kind of server resource.
///
/// Resource kinds are plain data: a name used in logs and errors and a path
/// template whose `{field}` placeholders are filled from the entity's own
/// fields, e.g. `/projects/{project_id}/contacts/{id}`.
pub struct ResourceKind {
    name: &'static str,
    path_template: &'static str,
}

impl ResourceKind {
    pub const fn new(name: &'static str, path_template: &'static str) -> Self {
        Self {
            name,
            path_template,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path_template(&self) -> &'static str {
        self.path_template
    }

    /// Render the canonical path of the instance described by `fields`.
    ///
    /// Placeholder values must be strings or integers and may not contain
    /// path or query delimiters. Text outside placeholders is copied as is.
    pub fn path_for(&self, fields: &Map<String, Value>) -> Result<String, ValidationError> {
        let mut out = String::with_capacity(self.path_template.len() + 16);
        let mut rest = self.path_template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return Ok(out);
            };
            let field = &after[..close];
            out.push_str(&self.render_segment(field, fields.get(field))?);
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn render_segment(
        &self,
        field: &str,
        value: Option<&Value>,
    ) -> Result<String, ValidationError> {
        let rendered = match value {
            None | Some(Value::Null) => {
                return Err(ValidationError::MissingPathField {
                    kind: self.name,
                    field: field.to_owned(),
                });
            }
            Some(Value::String(s)) => s.trim().to_owned(),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            Some(_) => String::new(),
        };
        if rendered.is_empty() || rendered.contains(['/', '?', '#']) {
            return Err(ValidationError::InvalidPathField {
                kind: self.name,
                field: field.to_owned(),
            });
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const CONTACT: ResourceKind =
        ResourceKind::new("contact", "/projects/{project_id}/contacts/{id}");

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn path_for_fills_placeholders() {
        let path = CONTACT
            .path_for(&fields(json!({"id": "CT1", "project_id": "PJ9", "name": "x"})))
            .unwrap();
        assert_eq!(path, "/projects/PJ9/contacts/CT1");
    }

    #[test]
    fn path_for_accepts_integer_ids() {
        let kind = ResourceKind::new("widget", "/widgets/{id}");
        assert_eq!(
            kind.path_for(&fields(json!({"id": 42}))).unwrap(),
            "/widgets/42"
        );
    }

    #[test]
    fn path_for_reports_missing_field() {
        let err = CONTACT.path_for(&fields(json!({"id": "CT1"}))).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingPathField {
                kind: "contact",
                field: "project_id".to_owned()
            }
        );
    }

    #[test]
    fn path_for_rejects_delimiters_and_non_scalars() {
        let err = CONTACT
            .path_for(&fields(json!({"id": "a/b", "project_id": "PJ"})))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPathField { .. }));

        let err = CONTACT
            .path_for(&fields(json!({"id": true, "project_id": "PJ"})))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPathField { .. }));
    }
}
