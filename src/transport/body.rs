use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::ApiErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} in response")]
    UnexpectedShape { expected: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorJsonResponse {
    error: ErrorJsonObject,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorJsonObject {
    code: String,
    message: String,
    #[serde(default)]
    param: Option<String>,
}

pub fn encode_json_body(params: &Map<String, Value>) -> Result<String, TransportError> {
    Ok(serde_json::to_string(params)?)
}

/// Decode a 2xx response body.
///
/// A blank body, or one labelled with a non-JSON content type, decodes to an
/// empty object. Anything labelled JSON (or unlabelled) must parse.
pub fn decode_success_body(
    content_type: Option<&str>,
    body: &str,
) -> Result<Value, TransportError> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    if content_type.is_some_and(|ct| !is_json_content_type(ct)) {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_str(body)?)
}

/// Extract the structured `error` object from a failure body, if present.
pub fn decode_error_body(body: &str) -> Option<ApiErrorBody> {
    let parsed: ErrorJsonResponse = serde_json::from_str(body).ok()?;
    Some(ApiErrorBody {
        code: parsed.error.code,
        message: parsed.error.message,
        param: parsed.error.param,
    })
}

pub fn decode_object(value: Value) -> Result<Map<String, Value>, TransportError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(TransportError::UnexpectedShape {
            expected: "JSON object",
        }),
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
