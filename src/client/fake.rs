//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use super::http::{BoxError, BoxFuture, HttpRequest, HttpResponse, HttpTransport};
use super::{RetryPolicy, TelerivetClient};
use crate::domain::{ApiKey, HttpMethod};

pub(crate) const TEST_API_URL: &str = "https://example.invalid/v1";

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

#[derive(Debug, Default)]
struct FakeTransportState {
    requests: Vec<HttpRequest>,
    responses: VecDeque<Result<HttpResponse, String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push_raw(status, Some("application/json"), body.to_string())
    }

    pub fn push_raw(
        &self,
        status: u16,
        content_type: Option<&str>,
        body: impl Into<String>,
    ) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Ok(HttpResponse {
                status,
                content_type: content_type.map(str::to_owned),
                body: body.into(),
            }));
        self
    }

    pub fn push_network_error(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Err(message.to_owned()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl HttpTransport for FakeTransport {
    fn send<'a>(
        &'a self,
        request: &'a HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let scripted = {
                let mut state = self.state.lock().unwrap();
                state.requests.push(request.clone());
                state.responses.pop_front()
            };
            match scripted {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(message.into()),
                None => Err("no scripted response left".into()),
            }
        })
    }
}

impl HttpRequest {
    /// Path relative to [`TEST_API_URL`].
    pub fn relative_path(&self) -> String {
        let url = url::Url::parse(&self.url).unwrap();
        url.path().trim_start_matches("/v1").to_owned()
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let url = url::Url::parse(&self.url).unwrap();
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .map(|body| serde_json::from_str(body).unwrap())
    }

    pub fn is(&self, method: HttpMethod, path: &str) -> bool {
        self.method == method && self.relative_path() == path
    }
}

pub(crate) fn fake_client(transport: FakeTransport) -> TelerivetClient {
    fake_client_with_retry(transport, RetryPolicy::new(2).base_delay(Duration::ZERO))
}

pub(crate) fn fake_client_with_retry(
    transport: FakeTransport,
    retry: RetryPolicy,
) -> TelerivetClient {
    TelerivetClient {
        api_key: ApiKey::new("test_key").unwrap(),
        api_url: TEST_API_URL.to_owned(),
        user_agent: super::DEFAULT_USER_AGENT.to_owned(),
        retry,
        http: Arc::new(transport),
    }
}
