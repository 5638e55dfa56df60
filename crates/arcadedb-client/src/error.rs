//! Client error types.

use thiserror::Error;

/// Exception identifier ArcadeDB reports for rejected credentials.
pub const SECURITY_EXCEPTION: &str = "com.arcadedb.server.security.ServerSecurityException";

/// Class name of the security exception, without its package.
const SECURITY_EXCEPTION_CLASS: &str = "ServerSecurityException";

/// Whether a reported exception identifier denotes rejected credentials.
///
/// Matched on the class name so that relocated or repackaged server builds
/// are still recognized.
pub fn is_security_exception(exception: &str) -> bool {
    exception
        .rsplit('.')
        .next()
        .is_some_and(|class| class == SECURITY_EXCEPTION_CLASS)
}

/// Placeholder used when an error body carries no usable field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The server rejected the credentials.
    #[error("authentication failed: {detail} ({exception})")]
    Auth { exception: String, detail: String },

    /// Structured error reported by the server.
    #[error("server error (HTTP {status}): {exception}: {detail}")]
    Server {
        status: u16,
        exception: String,
        detail: String,
    },

    /// Network-level failure (connection refused, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The connectivity check was rejected for authentication reasons.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The connectivity check failed for any other reason.
    #[error("unable to connect to server: {0}")]
    Unreachable(String),

    /// Payload serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A successful response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Whether another attempt of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Server { .. } | Error::Transport(_))
    }

    /// Whether this is an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. } | Error::InvalidCredentials)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
