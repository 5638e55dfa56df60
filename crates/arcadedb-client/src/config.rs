//! Client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default ArcadeDB HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 2480;

/// Default API path prefix.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Default `Content-Type` header value.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per request.
pub const DEFAULT_RETRY_MAX: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default multiplier applied to the delay after each retry.
pub const DEFAULT_RETRY_BACKOFF: u32 = 2;

/// Environment variable overriding the API path prefix.
pub const ENV_API_ENDPOINT: &str = "ARCADE_API_ENDPOINT";
/// Environment variable overriding the attempt limit.
pub const ENV_RETRY_MAX: &str = "ARCADE_API_RETRY_MAX";
/// Environment variable overriding the base retry delay, in seconds.
pub const ENV_RETRY_DELAY: &str = "ARCADE_API_RETRY_DELAY";
/// Environment variable overriding the backoff multiplier.
pub const ENV_RETRY_BACKOFF: &str = "ARCADE_API_RETRY_BACKOFF";

/// URL scheme used to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    /// URL scheme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(Error::Config(format!("unsupported protocol: {}", other))),
        }
    }
}

/// Retry policy shared by every request of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub delay: Duration,
    /// Factor applied to the delay after every retry.
    pub backoff: u32,
}

impl RetryPolicy {
    /// Create a retry policy.
    pub fn new(max_attempts: u32, delay: Duration, backoff: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            backoff,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, 1)
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_MAX, DEFAULT_RETRY_DELAY, DEFAULT_RETRY_BACKOFF)
    }
}

/// Client configuration.
///
/// Immutable once handed to [`Client`](crate::Client).
#[derive(Clone)]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,

    /// Server HTTP port.
    pub port: u16,

    /// URL scheme.
    pub protocol: Protocol,

    /// Basic-auth user name.
    pub username: String,

    /// Basic-auth password.
    pub password: String,

    /// `Content-Type` sent with every request.
    pub content_type: String,

    /// API path prefix (e.g., "/api/v1").
    pub api_prefix: String,

    /// Per-request transport timeout.
    pub timeout: Duration,

    /// Retry policy.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Create a new client configuration for the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            protocol: Protocol::default(),
            username: String::new(),
            password: String::new(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a configuration for a server on localhost and the default port.
    pub fn localhost() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_HTTP_PORT)
    }

    /// Set the credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set the URL scheme.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the `Content-Type` header value.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the API path prefix.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Apply `ARCADE_API_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, Error> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup(ENV_API_ENDPOINT) {
            self.api_prefix = prefix;
        }
        if let Some(max) = lookup(ENV_RETRY_MAX) {
            self.retry.max_attempts = parse_var::<u32>(ENV_RETRY_MAX, &max)?.max(1);
        }
        if let Some(delay) = lookup(ENV_RETRY_DELAY) {
            self.retry.delay = Duration::from_secs(parse_var(ENV_RETRY_DELAY, &delay)?);
        }
        if let Some(backoff) = lookup(ENV_RETRY_BACKOFF) {
            self.retry.backoff = parse_var(ENV_RETRY_BACKOFF, &backoff)?;
        }
        Ok(self)
    }

    /// Check the fields required before any request can be made.
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(Error::Config("port is required".to_string()));
        }
        Ok(())
    }

    /// Base URL of the server (scheme, host and port).
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url();
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::localhost()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("content_type", &self.content_type)
            .field("api_prefix", &self.api_prefix)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<host={} port={} user={}>", self.host, self.port, self.username)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value for {}: {:?}", key, value)))
}
