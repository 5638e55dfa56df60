//! Per-database access facade.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use arcadedb_client::{
    Client, HttpTransport, Outcome, RequestOptions, ServerCommand, Transport, SESSION_HEADER,
};
use arcadedb_lang::{format_cypher, Params};

use crate::error::{Error, Result};
use crate::model::{Driver, IsolationLevel, QueryOutput, QueryPayload, QueryRequest, SessionId};
use crate::options::DatabaseOptions;
use crate::transaction::{Transaction, TransactionManager};
use crate::wire;

/// Acknowledgement of a successful server command.
const ACK: &str = "ok";

/// Entry point for one existing database.
///
/// An instance can only be obtained for a database that exists, either by
/// [`Database::open`] or by [`Database::create`].
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use arcadedb_client::{Client, ClientConfig};
/// use arcadedb_dao::{Database, IsolationLevel, QueryRequest};
///
/// let client = Arc::new(Client::connect(ClientConfig::localhost().with_credentials("root", "pw")).await?);
/// let db = Database::open(client, "mydb").await?;
///
/// let tx = db.transaction(IsolationLevel::RepeatableRead).await?;
/// tx.query(QueryRequest::sql("INSERT INTO Person SET name = 'Ann'").mutating()).await?;
/// tx.commit().await?;
/// ```
pub struct Database<T: Transport = HttpTransport> {
    client: Arc<Client<T>>,
    name: String,
    options: DatabaseOptions,
    transactions: TransactionManager<T>,
    #[cfg(feature = "postgres")]
    wire: Option<wire::PgDriver>,
}

impl<T: Transport> Database<T> {
    /// Whether a database exists on the server.
    pub async fn exists(client: &Client<T>, name: &str) -> Result<bool> {
        let outcome = client
            .get(&client.endpoints().exists(name), RequestOptions::new())
            .await?;
        match outcome {
            Outcome::Result(Value::Bool(exists)) => Ok(exists),
            other => Err(unexpected("exists", &other)),
        }
    }

    /// Names of every database on the server.
    pub async fn list_databases(client: &Client<T>) -> Result<Vec<String>> {
        let outcome = client
            .get(&client.endpoints().databases(), RequestOptions::new())
            .await?;
        match outcome {
            Outcome::Result(value @ Value::Array(_)) => Ok(serde_json::from_value(value)
                .map_err(arcadedb_client::Error::from)?),
            other => Err(unexpected("databases", &other)),
        }
    }

    /// Create a database and open it with default options.
    pub async fn create(client: Arc<Client<T>>, name: &str) -> Result<Self> {
        Self::create_with(client, name, DatabaseOptions::default()).await
    }

    /// Create a database and open it.
    pub async fn create_with(
        client: Arc<Client<T>>,
        name: &str,
        options: DatabaseOptions,
    ) -> Result<Self> {
        if Self::exists(&client, name).await? {
            return Err(Error::State(format!("database {} already exists", name)));
        }
        server_command(&client, "create", name).await?;
        info!(database = name, "database created");
        Self::open_with(client, name, options).await
    }

    /// Drop a database. Returns `true` once the server acknowledged it.
    pub async fn delete(client: &Client<T>, name: &str) -> Result<bool> {
        if !Self::exists(client, name).await? {
            return Err(Error::State(format!("database {} does not exist", name)));
        }
        server_command(client, "drop", name).await?;
        info!(database = name, "database dropped");
        Ok(true)
    }

    /// Open an existing database with default options.
    pub async fn open(client: Arc<Client<T>>, name: &str) -> Result<Self> {
        Self::open_with(client, name, DatabaseOptions::default()).await
    }

    /// Open an existing database.
    pub async fn open_with(
        client: Arc<Client<T>>,
        name: &str,
        options: DatabaseOptions,
    ) -> Result<Self> {
        if !Self::exists(&client, name).await? {
            return Err(Error::State(format!(
                "database {} does not exist, use Database::create to create it",
                name
            )));
        }

        #[cfg(feature = "postgres")]
        let wire = match options.driver {
            Driver::Postgres => Some(wire::PgDriver::connect(client.config(), name).await?),
            Driver::Http => None,
        };
        #[cfg(not(feature = "postgres"))]
        require_http(options.driver)?;

        Ok(Self {
            transactions: TransactionManager::new(client.clone(), name),
            client,
            name: name.to_string(),
            options,
            #[cfg(feature = "postgres")]
            wire,
        })
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    pub fn client(&self) -> &Arc<Client<T>> {
        &self.client
    }

    /// Run a statement.
    ///
    /// Cypher statements with bound parameters are rewritten client-side
    /// first; every other language is sent exactly as given. Mutating
    /// statements go to the command endpoint, all others to the query
    /// endpoint.
    pub async fn query(&self, request: QueryRequest) -> Result<QueryOutput> {
        if !self.options.is_enabled(request.language) {
            return Err(Error::Validation(format!(
                "language {} not enabled",
                request.language
            )));
        }

        let (command, params) = prepare(&request)?;
        match self.options.driver {
            Driver::Http => self.query_http(&request, &command, params.as_ref()).await,
            Driver::Postgres => self.query_wire(&request, &command, params.as_ref()).await,
        }
    }

    /// Open a transaction and return its session id.
    pub async fn begin_transaction(&self, level: IsolationLevel) -> Result<SessionId> {
        self.http_only("transactions")?;
        self.transactions.begin(level).await
    }

    /// Commit the transaction identified by `session`.
    pub async fn commit(&self, session: SessionId) -> Result<()> {
        self.transactions.commit(session).await
    }

    /// Roll back the transaction identified by `session`.
    pub async fn rollback(&self, session: SessionId) -> Result<()> {
        self.transactions.rollback(session).await
    }

    /// Open a transaction guarded by a [`Transaction`] handle.
    pub async fn transaction(&self, level: IsolationLevel) -> Result<Transaction<'_, T>> {
        let session = self.begin_transaction(level).await?;
        Ok(Transaction::new(self, session))
    }

    async fn query_http(
        &self,
        request: &QueryRequest,
        command: &str,
        params: Option<&Params>,
    ) -> Result<QueryOutput> {
        let endpoints = self.client.endpoints();
        let path = if request.mutating {
            endpoints.command(&self.name)
        } else {
            endpoints.query(&self.name)
        };

        let payload = serde_json::to_value(QueryPayload {
            command,
            language: request.language,
            limit: request.limit,
            params,
            serializer: request.serializer,
        })
        .map_err(arcadedb_client::Error::from)?;

        let mut options = RequestOptions::new();
        if let Some(session) = &request.session_id {
            debug!(database = %self.name, session = %session, "statement joins transaction");
            options = options.with_header(SESSION_HEADER, session.as_str());
        }

        let outcome = self.client.post(&path, &payload, options).await?;
        QueryOutput::try_from(outcome)
    }

    #[cfg(feature = "postgres")]
    async fn query_wire(
        &self,
        request: &QueryRequest,
        command: &str,
        params: Option<&Params>,
    ) -> Result<QueryOutput> {
        wire::check_request(request)?;
        let bound = match params {
            Some(params) if !params.is_empty() => wire::bind_named(command, params)?,
            _ => wire::Bound {
                command: command.to_string(),
                values: Vec::new(),
            },
        };
        let driver = self
            .wire
            .as_ref()
            .ok_or_else(|| Error::State(format!("no wire-protocol connection to {}", self.name)))?;
        let rows = driver
            .execute(
                &wire::wire_command(request.language, &bound.command),
                &bound.values,
            )
            .await?;
        Ok(QueryOutput::Rows(rows))
    }

    #[cfg(not(feature = "postgres"))]
    async fn query_wire(
        &self,
        request: &QueryRequest,
        _command: &str,
        _params: Option<&Params>,
    ) -> Result<QueryOutput> {
        wire::check_request(request)?;
        Err(Error::Config(
            "the postgres driver requires the `postgres` feature".to_string(),
        ))
    }

    fn http_only(&self, feature: &str) -> Result<()> {
        match self.options.driver {
            Driver::Http => Ok(()),
            Driver::Postgres => Err(Error::Validation(format!(
                "{} are only supported by the HTTP driver",
                feature
            ))),
        }
    }
}

impl<T: Transport> fmt::Debug for Database<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("client", &self.client)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Apply client-side templating where the language needs it.
fn prepare(request: &QueryRequest) -> Result<(Cow<'_, str>, Option<Params>)> {
    match &request.params {
        Some(params) if request.language.is_templated() && !params.is_empty() => {
            let formatted = format_cypher(&request.command, params)?;
            let remaining = (!formatted.remaining.is_empty()).then_some(formatted.remaining);
            Ok((Cow::Owned(formatted.query), remaining))
        }
        params => Ok((Cow::Borrowed(request.command.as_str()), params.clone())),
    }
}

#[cfg(not(feature = "postgres"))]
fn require_http(driver: Driver) -> Result<()> {
    match driver {
        Driver::Http => Ok(()),
        Driver::Postgres => Err(Error::Config(
            "the postgres driver requires the `postgres` feature".to_string(),
        )),
    }
}

/// Run `{action} database {name}` and require the `ok` acknowledgement.
async fn server_command<T: Transport>(
    client: &Client<T>,
    action: &'static str,
    name: &str,
) -> Result<()> {
    let command = ServerCommand::new(format!("{} database {}", action, name));
    let payload = serde_json::to_value(&command).map_err(arcadedb_client::Error::from)?;
    let outcome = client
        .post(&client.endpoints().server(), &payload, RequestOptions::new())
        .await?;

    match outcome.into_value() {
        Some(Value::String(ack)) if ack == ACK => Ok(()),
        other => Err(Error::Rejected {
            action,
            database: name.to_string(),
            response: other.map_or_else(|| "no response".to_string(), |v| v.to_string()),
        }),
    }
}

fn unexpected(call: &str, outcome: &Outcome) -> Error {
    arcadedb_client::Error::UnexpectedResponse(format!("{} returned {:?}", call, outcome)).into()
}
