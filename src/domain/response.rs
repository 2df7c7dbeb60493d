use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default)]
/// One page of a list endpoint.
pub struct Page {
    /// Raw records in server order.
    pub data: Vec<Map<String, Value>>,
    /// `true` when the server holds more matching records after this page.
    pub truncated: bool,
    /// Opaque token for the next page, when the server supplies one.
    pub next_marker: Option<String>,
}

impl Page {
    /// Whether another request may return more records.
    pub fn has_more(&self) -> bool {
        self.truncated && !self.data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Structured `error` object from a failed response.
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub param: Option<String>,
}
