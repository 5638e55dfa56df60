//! Explicit transactions.
//!
//! A transaction is opened with a begin call that returns a server-issued
//! session id in the `arcadedb-session-id` response header. Every statement
//! that must run inside the transaction carries the same header, and exactly
//! one commit or rollback closes it.
//!
//! ```text
//! begin(level) ──► Open(session) ──► commit(session) ──► Closed
//!                       │
//!                       └─────────► rollback(session) ─► Closed
//! ```
//!
//! Nothing here tracks open sessions; the caller owns the [`SessionId`] and
//! hands it back on every call.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use arcadedb_client::{Client, HttpTransport, RequestOptions, Transport, SESSION_HEADER};

use crate::database::Database;
use crate::error::Result;
use crate::model::{IsolationLevel, QueryOutput, QueryRequest, SessionId};

/// Exception name reported when a begin response lacks the session header.
pub const MISSING_SESSION_ID: &str = "MissingSessionId";

/// Begin, commit and rollback calls for one database.
pub struct TransactionManager<T = HttpTransport> {
    client: Arc<Client<T>>,
    database: String,
}

impl<T: Transport> TransactionManager<T> {
    pub fn new(client: Arc<Client<T>>, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    /// Open a transaction and return its session id.
    pub async fn begin(&self, level: IsolationLevel) -> Result<SessionId> {
        let path = self.client.endpoints().begin(&self.database);
        let payload = json!({ "isolationLevel": level.as_str() });
        let outcome = self
            .client
            .post(&path, &payload, RequestOptions::new().returning_headers())
            .await?;

        let session = outcome.header(SESSION_HEADER).ok_or_else(|| {
            arcadedb_client::Error::Server {
                status: 200,
                exception: MISSING_SESSION_ID.to_string(),
                detail: format!("begin response carries no {} header", SESSION_HEADER),
            }
        })?;

        debug!(database = %self.database, session, %level, "transaction opened");
        Ok(SessionId::new(session))
    }

    /// Commit and close the transaction.
    pub async fn commit(&self, session: SessionId) -> Result<()> {
        let path = self.client.endpoints().commit(&self.database);
        self.finish(&path, session).await?;
        info!(database = %self.database, "transaction committed");
        Ok(())
    }

    /// Roll back and close the transaction.
    pub async fn rollback(&self, session: SessionId) -> Result<()> {
        let path = self.client.endpoints().rollback(&self.database);
        self.finish(&path, session).await?;
        info!(database = %self.database, "transaction rolled back");
        Ok(())
    }

    async fn finish(&self, path: &str, session: SessionId) -> Result<()> {
        let options = RequestOptions::new().with_header(SESSION_HEADER, session.into_inner());
        self.client.post(path, &json!({}), options).await?;
        Ok(())
    }
}

/// An open transaction bound to a [`Database`].
///
/// Statements run through [`Transaction::query`] carry the session id.
/// Dropping the guard without committing or rolling back only logs a warning;
/// the server expires the session on its own.
pub struct Transaction<'db, T: Transport = HttpTransport> {
    database: &'db Database<T>,
    session: Option<SessionId>,
}

impl<'db, T: Transport> Transaction<'db, T> {
    pub(crate) fn new(database: &'db Database<T>, session: SessionId) -> Self {
        Self {
            database,
            session: Some(session),
        }
    }

    /// Session id of the open transaction.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Run a statement inside the transaction.
    pub async fn query(&self, request: QueryRequest) -> Result<QueryOutput> {
        let request = match &self.session {
            Some(session) => request.in_session(session),
            None => request,
        };
        self.database.query(request).await
    }

    pub async fn commit(mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => self.database.commit(session).await,
            None => Ok(()),
        }
    }

    pub async fn rollback(mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => self.database.rollback(session).await,
            None => Ok(()),
        }
    }
}

impl<T: Transport> Drop for Transaction<'_, T> {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            warn!(
                database = self.database.name(),
                session = session.as_str(),
                "transaction dropped without commit or rollback"
            );
        }
    }
}
