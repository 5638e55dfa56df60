//! Error types for database access.

use thiserror::Error;

/// Database access errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the request client (auth, server, transport, ...).
    #[error(transparent)]
    Client(#[from] arcadedb_client::Error),

    /// Dialect or parameter formatting failure.
    #[error(transparent)]
    Lang(#[from] arcadedb_lang::Error),

    /// Malformed request; retrying cannot fix it.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation not valid for the current database state.
    #[error("state error: {0}")]
    State(String),

    /// The server did not acknowledge a lifecycle command.
    #[error("could not {action} database {database}: {response}")]
    Rejected {
        action: &'static str,
        database: String,
        response: String,
    },

    /// Invalid access-layer configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wire-protocol driver failure.
    #[error("driver error: {0}")]
    Driver(String),
}

impl Error {
    /// Whether the server rejected the credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Client(e) if e.is_auth())
    }

    /// Whether the request itself was malformed.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Lang(_))
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Driver(err.to_string())
    }
}

/// Result type for database access.
pub type Result<T> = std::result::Result<T, Error>;
