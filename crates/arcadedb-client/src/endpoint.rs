//! HTTP API paths.

/// Header carrying the transaction session identifier.
pub const SESSION_HEADER: &str = "arcadedb-session-id";

/// Paths of the ArcadeDB HTTP API under a configurable prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    prefix: String,
}

impl Endpoints {
    /// Create the path set for an API prefix such as "/api/v1".
    pub fn new(prefix: impl AsRef<str>) -> Self {
        let trimmed = prefix.as_ref().trim_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };
        Self { prefix }
    }

    /// The normalized prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generic server command endpoint.
    pub fn server(&self) -> String {
        format!("{}/server", self.prefix)
    }

    /// Database existence check.
    pub fn exists(&self, database: &str) -> String {
        format!("{}/exists/{}", self.prefix, database)
    }

    /// Database listing.
    pub fn databases(&self) -> String {
        format!("{}/databases", self.prefix)
    }

    /// Idempotent query execution.
    pub fn query(&self, database: &str) -> String {
        format!("{}/query/{}", self.prefix, database)
    }

    /// Mutating command execution.
    pub fn command(&self, database: &str) -> String {
        format!("{}/command/{}", self.prefix, database)
    }

    /// Transaction begin.
    pub fn begin(&self, database: &str) -> String {
        format!("{}/begin/{}", self.prefix, database)
    }

    /// Transaction commit.
    pub fn commit(&self, database: &str) -> String {
        format!("{}/commit/{}", self.prefix, database)
    }

    /// Transaction rollback.
    pub fn rollback(&self, database: &str) -> String {
        format!("{}/rollback/{}", self.prefix, database)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_API_PREFIX)
    }
}
