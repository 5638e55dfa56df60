//! ArcadeDB Client - Request client for the ArcadeDB HTTP API.
//!
//! This crate provides the authenticated, retrying request layer used by
//! `arcadedb-dao`. Responses are classified into an [`Outcome`] or a typed
//! [`Error`]; callers never inspect raw HTTP responses.
//!
//! # Quick Start
//!
//! ```ignore
//! use arcadedb_client::{Client, ClientConfig, RequestOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Construction verifies the server and rejects bad credentials
//!     let config = ClientConfig::new("localhost", 2480)
//!         .with_credentials("root", "playwithdata")
//!         .with_env_overrides()?;
//!     let client = Client::connect(config).await?;
//!
//!     let outcome = client
//!         .post(
//!             &client.endpoints().query("mydb"),
//!             &json!({"command": "select 1", "language": "sql"}),
//!             RequestOptions::new(),
//!         )
//!         .await?;
//!     println!("{:?}", outcome.into_value());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod response;
pub mod transport;

pub use client::{Client, RequestOptions, ServerCommand};
pub use config::{ClientConfig, Protocol, RetryPolicy};
pub use endpoint::{Endpoints, SESSION_HEADER};
pub use error::{is_security_exception, Error, SECURITY_EXCEPTION};
pub use response::Outcome;
pub use transport::{Headers, HttpTransport, Method, RawResponse, Request, Transport};
