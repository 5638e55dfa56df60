//! ArcadeDB request client.
//!
//! This module provides the `Client` struct that issues authenticated requests
//! against the ArcadeDB HTTP API.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::endpoint::Endpoints;
use crate::error::Error;
use crate::response::{classify, Outcome};
use crate::transport::{Headers, HttpTransport, Method, Request, Transport};

/// Command sent to verify the server at construction time.
const HEALTH_COMMAND: &str = "list databases";

/// Payload of the generic server command endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCommand {
    pub command: String,
}

impl ServerCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// Per-call request options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra headers. These win over the configured defaults.
    pub headers: Headers,
    /// Return the response headers instead of the body.
    pub return_headers: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extra header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Ask for the response headers instead of the body.
    pub fn returning_headers(mut self) -> Self {
        self.return_headers = true;
        self
    }
}

/// An ArcadeDB client holding one set of credentials and one target host.
///
/// A constructed client is proof of reachable, authenticated connectivity:
/// construction verifies the server and fails on bad credentials.
///
/// # Example
///
/// ```ignore
/// use arcadedb_client::{Client, ClientConfig, RequestOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::localhost().with_credentials("root", "playwithdata");
///     let client = Client::connect(config).await?;
///
///     let databases = client
///         .get(&client.endpoints().databases(), RequestOptions::new())
///         .await?;
///     println!("{:?}", databases);
///     Ok(())
/// }
/// ```
pub struct Client<T = HttpTransport> {
    config: ClientConfig,
    endpoints: Endpoints,
    transport: T,
}

impl Client<HttpTransport> {
    /// Connect to an ArcadeDB server over HTTP.
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport).await
    }
}

impl<T: Transport> Client<T> {
    /// Connect using a custom transport.
    pub async fn with_transport(config: ClientConfig, transport: T) -> Result<Self, Error> {
        config.validate()?;

        let client = Self {
            endpoints: Endpoints::new(&config.api_prefix),
            config,
            transport,
        };
        client.verify().await?;

        info!(client = %client.config, "connected to ArcadeDB server");
        Ok(client)
    }

    /// Issue a POST request with a JSON payload.
    pub async fn post(
        &self,
        path: &str,
        payload: &Value,
        options: RequestOptions,
    ) -> Result<Outcome, Error> {
        let request = self.build_request(Method::Post, path, Some(payload.clone()), options);
        self.send(request).await
    }

    /// Issue a GET request.
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Outcome, Error> {
        let request = self.build_request(Method::Get, path, None, options);
        self.send(request).await
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// API paths for the configured prefix.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Verify connectivity and credentials with a trivial server command.
    async fn verify(&self) -> Result<(), Error> {
        let payload = serde_json::to_value(ServerCommand::new(HEALTH_COMMAND))?;
        match self
            .post(&self.endpoints.server(), &payload, RequestOptions::new())
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_auth() => Err(Error::InvalidCredentials),
            Err(e) => Err(Error::Unreachable(e.to_string())),
        }
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
        options: RequestOptions,
    ) -> Request {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), self.config.content_type.clone());
        for (name, value) in options.headers {
            headers.insert(name.to_ascii_lowercase(), value);
        }

        Request {
            method,
            path: path.to_string(),
            payload,
            headers,
            return_headers: options.return_headers,
        }
    }

    /// Send a request, retrying transient failures per the retry policy.
    async fn send(&self, request: Request) -> Result<Outcome, Error> {
        let policy = &self.config.retry;
        info!(
            method = request.method.as_str(),
            url = %self.config.url(&request.path),
            "sending request"
        );
        if let Some(payload) = &request.payload {
            debug!(%payload, "request payload");
        }

        let mut attempt = 1;
        loop {
            let result = match self.transport.execute(&request).await {
                Ok(raw) => classify(raw, request.return_headers),
                Err(e) => Err(e),
            };

            match result {
                Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                    let delay = policy.delay_after(attempt);
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl<T> fmt::Display for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.config, f)
    }
}
