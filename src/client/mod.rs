//! Client layer: orchestrates transport calls and maps transport ↔ domain.

#[cfg(test)]
pub(crate) mod fake;
mod http;
mod retry;

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use retry::RetryPolicy;

use self::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::cursor::Cursor;
use crate::domain::{ApiErrorCode, ApiKey, HttpMethod, Query, ResourceKind, ValidationError};
use crate::entity::Entity;

const DEFAULT_API_URL: &str = "https://api.telerivet.com/v1";
const DEFAULT_USER_AGENT: &str = concat!("telerivet-rust/", env!("CARGO_PKG_VERSION"));
const API_KEY_ENV: &str = "TELERIVET_API_KEY";
const API_URL_ENV: &str = "TELERIVET_API_URL";

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`TelerivetClient`] and the entities and cursors built on it.
///
/// Request failures carry the originating method and path. Server-supplied
/// error codes are kept verbatim in [`TelerivetError::Api`] so callers can
/// branch on [`ApiErrorCode::known_kind`] instead of matching messages.
pub enum TelerivetError {
    /// Network failure (DNS, TLS, timeout, connection reset).
    #[error("transport error on {method} {path}: {source}")]
    Transport {
        method: HttpMethod,
        path: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The server answered with a 5xx status after all retries.
    #[error("server error on {method} {path}: HTTP {status}")]
    Server {
        method: HttpMethod,
        path: String,
        status: u16,
        body: Option<String>,
    },

    /// The server rejected the request with a structured `error` body.
    #[error("API error on {method} {path}: {code}: {message}")]
    Api {
        method: HttpMethod,
        path: String,
        status: u16,
        code: ApiErrorCode,
        message: String,
        param: Option<String>,
    },

    /// Any other non-successful status without a structured error body.
    #[error("unexpected HTTP status on {method} {path}: {status}")]
    HttpStatus {
        method: HttpMethod,
        path: String,
        status: u16,
        body: Option<String>,
    },

    /// A successful response could not be decoded.
    #[error("protocol error on {method} {path}: {source}")]
    Protocol {
        method: HttpMethod,
        path: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The entity was deleted; its cached fields are no longer usable.
    #[error("entity at {path} has been deleted")]
    StaleEntity { path: String },

    /// `limit`/`offset` were changed after the first page was fetched.
    #[error("cursor over {path} has already started iterating")]
    CursorStarted { path: String },

    /// The HTTP client could not be configured (TLS roots, certificate files).
    #[error("client configuration error: {0}")]
    Config(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl TelerivetError {
    pub(crate) fn protocol(
        method: HttpMethod,
        path: &str,
        source: crate::transport::TransportError,
    ) -> Self {
        Self::Protocol {
            method,
            path: path.to_owned(),
            source: Box::new(source),
        }
    }

    /// Whether the failure may go away on its own (network errors and 5xx).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Server { .. })
    }

    /// Server-supplied error code for [`TelerivetError::Api`].
    pub fn api_code(&self) -> Option<&ApiErrorCode> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.api_code().is_some_and(ApiErrorCode::is_not_found)
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. }
            | Self::Api { status, .. }
            | Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-relative path of the request or entity involved.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Transport { path, .. }
            | Self::Server { path, .. }
            | Self::Api { path, .. }
            | Self::HttpStatus { path, .. }
            | Self::Protocol { path, .. }
            | Self::StaleEntity { path }
            | Self::CursorStarted { path } => Some(path),
            Self::Config(_) | Self::Validation(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum CaBundle {
    Pem(Vec<u8>),
    File(PathBuf),
}

impl CaBundle {
    fn load(&self) -> Result<Vec<reqwest::Certificate>, TelerivetError> {
        let pem = match self {
            Self::Pem(bytes) => bytes.clone(),
            Self::File(path) => std::fs::read(path)
                .map_err(|err| TelerivetError::Config(Box::new(err)))?,
        };
        reqwest::Certificate::from_pem_bundle(&pem)
            .map_err(|err| TelerivetError::Config(Box::new(err)))
    }
}

#[derive(Debug, Clone)]
/// Builder for [`TelerivetClient`].
///
/// Use this when you need to customize the base URL, timeout, retries,
/// trusted roots or user-agent.
pub struct TelerivetClientBuilder {
    api_key: ApiKey,
    api_url: String,
    timeout: Option<Duration>,
    retry: RetryPolicy,
    ca_bundle: Option<CaBundle>,
    user_agent: Option<String>,
}

impl TelerivetClientBuilder {
    /// Create a builder with the default base URL and retry policy.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_owned(),
            timeout: None,
            retry: RetryPolicy::default(),
            ca_bundle: None,
            user_agent: None,
        }
    }

    /// Override the API base URL (`https://api.telerivet.com/v1` by default).
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Per-request deadline covering connect, send and body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Maximum number of retries for retryable failures.
    pub fn retries(mut self, max_retries: u32) -> Self {
        self.retry.set_max_retries(max_retries);
        self
    }

    /// Replace the whole retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Trust the PEM-encoded root certificates in `pem` in addition to the defaults.
    pub fn ca_bundle_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca_bundle = Some(CaBundle::Pem(pem.into()));
        self
    }

    /// Trust the PEM-encoded root certificates read from `path` at build time.
    pub fn ca_bundle_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(CaBundle::File(path.into()));
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`TelerivetClient`].
    pub fn build(self) -> Result<TelerivetClient, TelerivetError> {
        let parsed = url::Url::parse(&self.api_url).map_err(|_| ValidationError::InvalidUrl {
            input: self.api_url.clone(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidUrl {
                input: self.api_url,
            }
            .into());
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(bundle) = &self.ca_bundle {
            for cert in bundle.load()? {
                builder = builder.add_root_certificate(cert);
            }
        }

        let client = builder
            .build()
            .map_err(|err| TelerivetError::Config(Box::new(err)))?;

        Ok(TelerivetClient {
            api_key: self.api_key,
            api_url: self.api_url.trim_end_matches('/').to_owned(),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            retry: self.retry,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Shared configuration root for every entity and cursor.
///
/// The client is read-only after construction and cheap to clone; clones
/// share one connection pool. [`Entity`] and [`Cursor`] borrow the client,
/// so it always outlives them.
pub struct TelerivetClient {
    api_key: ApiKey,
    api_url: String,
    user_agent: String,
    retry: RetryPolicy,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for TelerivetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelerivetClient")
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl TelerivetClient {
    /// Create a client using the default base URL and retry policy.
    ///
    /// For more customization, use [`TelerivetClient::builder`].
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: RetryPolicy::default(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(api_key: ApiKey) -> TelerivetClientBuilder {
        TelerivetClientBuilder::new(api_key)
    }

    /// Build a client from `TELERIVET_API_KEY` and optional `TELERIVET_API_URL`.
    pub fn from_env() -> Result<Self, TelerivetError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TelerivetError> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ValidationError::MissingEnvVar { name: API_KEY_ENV })?;
        let mut builder = Self::builder(ApiKey::new(api_key)?);
        if let Some(api_url) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            builder = builder.api_url(api_url);
        }
        builder.build()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// `User-Agent` header sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Perform one authenticated request/response exchange.
    ///
    /// `params` become query parameters for `GET`/`DELETE` and a JSON body for
    /// `POST`. Retries for network failures and 5xx responses happen here,
    /// following the client's [`RetryPolicy`].
    ///
    /// Errors:
    /// - [`TelerivetError::Transport`] for network failures,
    /// - [`TelerivetError::Server`] for 5xx responses,
    /// - [`TelerivetError::Api`] for 4xx responses with an `error` object,
    /// - [`TelerivetError::HttpStatus`] for other non-2xx responses,
    /// - [`TelerivetError::Protocol`] for undecodable success bodies.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<Value, TelerivetError> {
        let request = self.build_request(method, path, params)?;
        let mut failed_attempts = 0u32;
        loop {
            debug!(%method, path, attempt = failed_attempts + 1, "sending request");
            match self.execute(&request, path).await {
                Ok(value) => return Ok(value),
                Err(err)
                    if err.is_retryable() && self.retry.allows(method, failed_attempts + 1) =>
                {
                    failed_attempts += 1;
                    let delay = self.retry.delay_for(failed_attempts);
                    warn!(
                        %method,
                        path,
                        attempt = failed_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying request"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Construct an entity of `kind` from `fields`.
    ///
    /// With `loaded = false` only the identifying fields need to be present;
    /// the rest are fetched on first access.
    pub fn make_entity(
        &self,
        kind: ResourceKind,
        fields: Map<String, Value>,
        loaded: bool,
    ) -> Result<Entity<'_>, TelerivetError> {
        Entity::new(self, kind, fields, loaded)
    }

    /// Construct a lazy cursor over the list endpoint at `path`.
    pub fn make_cursor(
        &self,
        kind: ResourceKind,
        path: impl Into<String>,
        query: Query,
    ) -> Cursor<'_> {
        Cursor::new(self, kind, path.into(), query)
    }

    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<HttpRequest, TelerivetError> {
        let joined = if path.starts_with('/') {
            format!("{}{path}", self.api_url)
        } else {
            format!("{}/{path}", self.api_url)
        };
        let mut url = url::Url::parse(&joined).map_err(|_| ValidationError::InvalidUrl {
            input: joined.clone(),
        })?;

        let mut body = None;
        if let Some(params) = params {
            match method {
                HttpMethod::Post => {
                    let encoded = crate::transport::encode_json_body(params)
                        .map_err(|err| TelerivetError::protocol(method, path, err))?;
                    body = Some(encoded);
                }
                HttpMethod::Get | HttpMethod::Delete => {
                    let pairs = crate::transport::encode_query(params);
                    if !pairs.is_empty() {
                        url.query_pairs_mut().extend_pairs(pairs);
                    }
                }
            }
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            api_key: self.api_key.clone(),
            user_agent: self.user_agent.clone(),
            body,
        })
    }

    async fn execute(&self, request: &HttpRequest, path: &str) -> Result<Value, TelerivetError> {
        let method = request.method;
        let response = self
            .http
            .send(request)
            .await
            .map_err(|source| TelerivetError::Transport {
                method,
                path: path.to_owned(),
                source,
            })?;
        debug!(%method, path, status = response.status, "received response");
        map_response(method, path, response)
    }
}

fn map_response(
    method: HttpMethod,
    path: &str,
    response: HttpResponse,
) -> Result<Value, TelerivetError> {
    let status = response.status;
    match status {
        200..=299 => {
            crate::transport::decode_success_body(response.content_type.as_deref(), &response.body)
                .map_err(|err| TelerivetError::protocol(method, path, err))
        }
        400..=499 => match crate::transport::decode_error_body(&response.body) {
            Some(error) => Err(TelerivetError::Api {
                method,
                path: path.to_owned(),
                status,
                code: ApiErrorCode::new(error.code),
                message: error.message,
                param: error.param,
            }),
            None => Err(TelerivetError::HttpStatus {
                method,
                path: path.to_owned(),
                status,
                body: non_blank(response.body),
            }),
        },
        500..=599 => Err(TelerivetError::Server {
            method,
            path: path.to_owned(),
            status,
            body: non_blank(response.body),
        }),
        _ => Err(TelerivetError::HttpStatus {
            method,
            path: path.to_owned(),
            status,
            body: non_blank(response.body),
        }),
    }
}

fn non_blank(body: String) -> Option<String> {
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}
