//! Request and result types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use arcadedb_client::Outcome;
use arcadedb_lang::{Language, Params};

use crate::error::{Error, Result};

/// Result serialization mode (HTTP driver only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Serializer {
    Graph,
    Record,
}

impl Serializer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Serializer::Graph => "graph",
            Serializer::Record => "record",
        }
    }
}

impl FromStr for Serializer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graph" => Ok(Serializer::Graph),
            "record" => Ok(Serializer::Record),
            _ => Err(Error::Validation(format!(
                "serializer must be 'graph' or 'record', got {:?}",
                s
            ))),
        }
    }
}

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    #[default]
    ReadCommitted,
    RepeatableRead,
}

impl IsolationLevel {
    /// Name sent to the server.
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ_COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE_READ",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution path used by a [`Database`](crate::Database).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Driver {
    /// The HTTP API.
    #[default]
    Http,
    /// The PostgreSQL wire protocol (requires the `postgres` feature).
    Postgres,
}

/// Server-issued transaction session identifier.
///
/// Deliberately not `Clone`: commit and rollback consume it, so an identifier
/// cannot be used after its terminal call.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an identifier obtained elsewhere.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Give up the typed wrapper.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A statement to run against a database.
///
/// # Example
///
/// ```ignore
/// let request = QueryRequest::new(Language::Cypher, "MATCH (p:Person {name: $name}) RETURN p")
///     .with_param("name", "Alice")
///     .with_limit(10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Query language.
    pub language: Language,
    /// Statement text.
    pub command: String,
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Bound parameters.
    pub params: Option<Params>,
    /// Result serialization mode.
    pub serializer: Option<Serializer>,
    /// Transaction session the statement belongs to.
    pub session_id: Option<String>,
    /// Route to the command endpoint instead of the query endpoint.
    pub mutating: bool,
}

impl QueryRequest {
    /// Create a read-only statement.
    pub fn new(language: Language, command: impl Into<String>) -> Self {
        Self {
            language,
            command: command.into(),
            limit: None,
            params: None,
            serializer: None,
            session_id: None,
            mutating: false,
        }
    }

    /// Create a SQL statement.
    pub fn sql(command: impl Into<String>) -> Self {
        Self::new(Language::Sql, command)
    }

    /// Create a statement from a language name (case-insensitive).
    pub fn parse(language: &str, command: impl Into<String>) -> Result<Self> {
        let language = language
            .parse::<Language>()
            .map_err(|e| Error::Validation(e.to_string()))?;
        Ok(Self::new(language, command))
    }

    /// Limit the number of rows returned.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Replace the bound parameters.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Bind one parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(name.into(), value.into());
        self
    }

    /// Request a result serialization mode.
    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Run inside an open transaction.
    pub fn in_session(mut self, session: &SessionId) -> Self {
        self.session_id = Some(session.as_str().to_string());
        self
    }

    /// Mark the statement as mutating.
    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }
}

/// JSON body of the query and command endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct QueryPayload<'a> {
    pub command: &'a str,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a Params>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serializer: Option<Serializer>,
}

/// A result row of the wire-protocol driver.
pub type Row = Map<String, Value>;

/// Result of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Parsed `result` field of the response.
    Value(Value),
    /// Raw response text.
    Text(String),
    /// No result.
    Empty,
    /// Rows fetched through the wire-protocol driver.
    Rows(Vec<Row>),
}

impl QueryOutput {
    /// Collapse into a JSON value; rows become an array of objects.
    pub fn into_value(self) -> Option<Value> {
        match self {
            QueryOutput::Value(value) => Some(value),
            QueryOutput::Text(text) => Some(Value::String(text)),
            QueryOutput::Empty => None,
            QueryOutput::Rows(rows) => Some(Value::Array(rows.into_iter().map(Value::Object).collect())),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QueryOutput::Empty)
    }
}

impl TryFrom<Outcome> for QueryOutput {
    type Error = Error;

    fn try_from(outcome: Outcome) -> Result<Self> {
        match outcome {
            Outcome::Result(value) => Ok(QueryOutput::Value(value)),
            Outcome::Text(text) => Ok(QueryOutput::Text(text)),
            Outcome::Empty => Ok(QueryOutput::Empty),
            Outcome::Headers(_) => Err(arcadedb_client::Error::UnexpectedResponse(
                "headers returned for a statement".to_string(),
            )
            .into()),
        }
    }
}
