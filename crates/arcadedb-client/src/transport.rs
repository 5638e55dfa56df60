//! Request transport.
//!
//! A [`Transport`] performs exactly one HTTP exchange. Retries, header defaults
//! and response classification live in [`Client`](crate::Client), so every
//! transport shares the same policy.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Error;

/// Header map keyed by lower-cased header name.
pub type Headers = BTreeMap<String, String>;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A single request to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Endpoint path, relative to the server base URL.
    pub path: String,
    /// JSON payload, sent as the request body.
    pub payload: Option<Value>,
    /// Request headers (lower-cased names).
    pub headers: Headers,
    /// Return the response headers instead of the parsed body.
    pub return_headers: bool,
}

impl Request {
    /// Look up a request header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Unclassified response of a single exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lower-cased names).
    pub headers: Headers,
    /// Response body text.
    pub body: String,
}

impl RawResponse {
    /// Create a response with no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Add a response header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }
}

/// One request/response exchange with the server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange. Network failures map to [`Error::Transport`].
    async fn execute(&self, request: &Request) -> Result<RawResponse, Error>;
}

/// `reqwest`-backed transport with Basic authentication.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Build the HTTP client for a configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<RawResponse, Error> {
        let url = self.config.url(&request.path);

        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        builder = builder.basic_auth(&self.config.username, Some(&self.config.password));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = &request.payload {
            builder = builder.body(serde_json::to_vec(payload)?);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        debug!(%url, status, body_len = body.len(), "response received");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
