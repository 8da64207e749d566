//! Transport seam between the typed client and the network.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

/// A request described by its method and unencoded path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Path segments, percent-encoded by the transport.
    pub segments: Vec<String>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl TransportRequest {
    /// Creates a body-less request.
    #[must_use]
    pub fn new(method: Method, segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response handed back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response body text.
    pub body: String,
}

/// Failures below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The base URL cannot carry path segments.
    #[error("base url cannot be a base: {0}")]
    InvalidBaseUrl(String),

    /// The request never completed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Any other transport failure.
    #[error("transport failure: {0}")]
    Other(String),
}

/// Sends requests to the task API.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns whatever status the server answered.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Appends percent-encoded segments to `base`.
///
/// A `/` inside a segment is encoded, so an owner id can never add path
/// components.
///
/// # Errors
///
/// Returns [`TransportError::InvalidBaseUrl`] for URLs such as `mailto:`.
pub fn join_segments(base: &Url, segments: &[String]) -> Result<Url, TransportError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| TransportError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Creates a transport for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidBaseUrl`] when the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url)
            .map_err(|err| TransportError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        Ok(Self::with_client(Client::new(), parsed))
    }

    /// Creates a transport sharing an existing client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Returns the API root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = join_segments(&self.base_url, &request.segments)?;
        tracing::debug!(method = %request.method, %url, "sending task api request");

        let mut builder = self.client.request(request.method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}
