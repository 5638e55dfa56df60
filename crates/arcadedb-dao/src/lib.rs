//! ArcadeDB DAO - Database access layer for ArcadeDB.
//!
//! This crate composes the request client and the dialect support into a
//! per-database facade:
//!
//! - [`Database`]: existence checks, create/drop, statement routing
//! - [`TransactionManager`] and [`Transaction`]: explicit sessions
//! - [`QueryRequest`] / [`QueryOutput`]: typed statements and results
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use arcadedb_client::{Client, ClientConfig};
//! use arcadedb_dao::{Database, Language, QueryRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::localhost()
//!         .with_credentials("root", "playwithdata")
//!         .with_env_overrides()?;
//!     let client = Arc::new(Client::connect(config).await?);
//!
//!     let db = if Database::exists(&client, "social").await? {
//!         Database::open(client, "social").await?
//!     } else {
//!         Database::create(client, "social").await?
//!     };
//!
//!     let people = db
//!         .query(
//!             QueryRequest::new(Language::Cypher, "MATCH (p:Person {name: $name}) RETURN p")
//!                 .with_param("name", "Alice")
//!                 .with_limit(10),
//!         )
//!         .await?;
//!     println!("{:?}", people.into_value());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `postgres`: statements can run over the PostgreSQL wire protocol
//!   ([`Driver::Postgres`]) through `sqlx`.

pub mod database;
pub mod error;
pub mod model;
pub mod options;
pub mod transaction;
pub mod wire;

pub use database::Database;
pub use error::{Error, Result};
pub use model::{
    Driver, IsolationLevel, QueryOutput, QueryRequest, Row, Serializer, SessionId,
};
pub use options::DatabaseOptions;
pub use transaction::{Transaction, TransactionManager};

pub use arcadedb_lang::{Language, Params};

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use arcadedb_client::{
        Client, ClientConfig, Error, RawResponse, Request, RetryPolicy, Transport,
    };
    use async_trait::async_trait;

    use crate::Database;

    /// Transport replaying canned responses and recording requests.
    #[derive(Clone, Default)]
    pub struct Scripted {
        responses: Arc<Mutex<VecDeque<Result<RawResponse, Error>>>>,
        requests: Arc<Mutex<Vec<Request>>>,
    }

    impl Scripted {
        pub fn push(&self, response: Result<RawResponse, Error>) -> &Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub fn ok(&self, body: &str) -> &Self {
            self.push(Ok(RawResponse::new(200, body)))
        }

        pub fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }

        pub fn last_request(&self) -> Request {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn execute(&self, request: &Request) -> Result<RawResponse, Error> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("no scripted response".into())))
        }
    }

    /// A client that passed its connectivity check, without retries.
    pub async fn connected(transport: &Scripted) -> Arc<Client<Scripted>> {
        transport.ok(r#"{"result":["mydb"]}"#);
        let config = ClientConfig::localhost()
            .with_credentials("root", "playwithdata")
            .with_retry(RetryPolicy::none());
        Arc::new(
            Client::with_transport(config, transport.clone())
                .await
                .unwrap(),
        )
    }

    /// A facade over an existing database.
    pub async fn opened(transport: &Scripted, name: &str) -> Database<Scripted> {
        let client = connected(transport).await;
        transport.ok(r#"{"result":true}"#);
        Database::open(client, name).await.unwrap()
    }
}
