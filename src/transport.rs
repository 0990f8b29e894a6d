// HTTP plumbing: parameter sets, the transport seam and its reqwest implementation
use crate::error::{ClientError, TransportError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const XML_CONTENT_TYPE: &str = "application/xml";

// Ordered provider field names and their values. Field names are case-sensitive
// and must match what the remote service expects.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Params {
    fields: Vec<(&'static str, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, name: &'static str, value: impl ToString) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }

    // Absent optional fields are left out entirely rather than sent empty
    pub fn push_opt(self, name: &'static str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.push(name, value),
            None => self,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn as_pairs(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Never print the API key
impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.fields {
            if *name == "key" {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostBody {
    Form(Params),
    Xml(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

// Single-request transport used by the client. `path` is relative to the
// base URL. Non-2xx answers are reported as [`TransportError::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &Params) -> Result<RawResponse, TransportError>;

    async fn post(&self, path: &str, body: &PostBody) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<RawResponse, TransportError> {
        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }

    // The URL carries the API key in its query string, so it is stripped
    fn classify(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout(self.timeout_ms);
        }

        let is_connect = error.is_connect();
        let message = describe(&error.without_url());
        if is_connect {
            TransportError::Connection(message)
        } else {
            TransportError::Request(message)
        }
    }
}

// reqwest keeps the interesting part ("Connection refused") in the source chain
fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &Params) -> Result<RawResponse, TransportError> {
        debug!(method = "GET", path, fields = query.len(), "sending request");
        let request = self.client.get(self.url(path)).query(query.as_pairs());
        self.send(request).await
    }

    async fn post(&self, path: &str, body: &PostBody) -> Result<RawResponse, TransportError> {
        let request = self.client.post(self.url(path));
        let request = match body {
            PostBody::Form(form) => {
                debug!(method = "POST", path, fields = form.len(), "sending form");
                request.form(form.as_pairs())
            }
            PostBody::Xml(xml) => {
                debug!(method = "POST", path, bytes = xml.len(), "sending xml document");
                request
                    .header(CONTENT_TYPE, XML_CONTENT_TYPE)
                    .body(xml.clone())
            }
        };
        self.send(request).await
    }
}
