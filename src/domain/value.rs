use std::fmt;

use crate::domain::validation::ValidationError;

#[derive(Clone, PartialEq, Eq, Hash)]
/// Telerivet API key, sent as the Basic auth username.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// Field name used in validation errors.
    pub const FIELD: &'static str = "api_key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keeps the key out of logs and panic messages.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Server-assigned identifier of a single resource (`id`).
///
/// Invariant: non-empty after trimming.
pub struct ResourceId(String);

impl ResourceId {
    /// JSON field name holding the identifier (`id`).
    pub const FIELD: &'static str = "id";

    /// Create a validated [`ResourceId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// HTTP methods used by the API.
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Whether repeating the request cannot cause additional side effects.
    pub fn is_idempotent(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// `error.code` value returned by the API on 4xx responses.
pub struct ApiErrorCode(String);

impl ApiErrorCode {
    /// Wrap a server-supplied code verbatim.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Borrow the code as provided by the server.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Map this code to a known variant, if one exists.
    pub fn known_kind(&self) -> Option<KnownApiErrorCode> {
        KnownApiErrorCode::from_code(&self.0)
    }

    /// Returns `true` for `not_found`.
    pub fn is_not_found(&self) -> bool {
        self.known_kind() == Some(KnownApiErrorCode::NotFound)
    }

    /// Returns `true` for `invalid_param`.
    pub fn is_invalid_param(&self) -> bool {
        self.known_kind() == Some(KnownApiErrorCode::InvalidParam)
    }

    /// Returns `true` when the request was throttled.
    pub fn is_rate_limited(&self) -> bool {
        self.known_kind() == Some(KnownApiErrorCode::RateLimited)
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Known `error.code` values.
///
/// Unknown codes are preserved as [`ApiErrorCode`] and return `None` from
/// [`KnownApiErrorCode::from_code`].
pub enum KnownApiErrorCode {
    InvalidParam,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
}

impl KnownApiErrorCode {
    /// Convert a raw code string into a known variant.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "invalid_param" => Self::InvalidParam,
            "not_found" => Self::NotFound,
            "unauthorized" => Self::Unauthorized,
            "forbidden" => Self::Forbidden,
            "rate_limited" | "rate_limit_exceeded" => Self::RateLimited,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_newtypes_trim_or_validate() {
        assert_eq!(ApiKey::new("  key ").unwrap().as_str(), "key");
        assert!(matches!(
            ApiKey::new("   "),
            Err(ValidationError::Empty {
                field: ApiKey::FIELD
            })
        ));
        assert_eq!(ResourceId::new(" CTabc ").unwrap().as_str(), "CTabc");
        assert!(ResourceId::new("").is_err());
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("secret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(..)");
    }

    #[test]
    fn only_get_is_idempotent() {
        assert!(HttpMethod::Get.is_idempotent());
        assert!(!HttpMethod::Post.is_idempotent());
        assert!(!HttpMethod::Delete.is_idempotent());
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn api_error_code_known_mapping() {
        assert!(ApiErrorCode::new("not_found").is_not_found());
        assert!(ApiErrorCode::new("invalid_param").is_invalid_param());
        assert!(ApiErrorCode::new("rate_limited").is_rate_limited());

        let unknown = ApiErrorCode::new("something_new");
        assert_eq!(unknown.known_kind(), None);
        assert_eq!(unknown.as_str(), "something_new");
    }
}
