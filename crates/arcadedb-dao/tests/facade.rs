//! End-to-end facade tests against an in-process fake server.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use arcadedb_client::{Client, ClientConfig, RetryPolicy, SESSION_HEADER};
use arcadedb_dao::{Database, Error, IsolationLevel, Language, QueryRequest};

const SESSION: &str = "AS-0000000-0042";

#[derive(Default)]
struct ServerState {
    databases: BTreeSet<String>,
    open_sessions: BTreeSet<String>,
}

type Shared = Arc<Mutex<ServerState>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn result(value: Value) -> (StatusCode, String) {
    (StatusCode::OK, json!({ "result": value }).to_string())
}

async fn server_command(State(state): State<Shared>, body: String) -> (StatusCode, String) {
    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let command = payload["command"].as_str().unwrap_or_default();
    let mut state = state.lock().unwrap();

    if command == "list databases" {
        return result(json!(state.databases));
    }
    if let Some(name) = command.strip_prefix("create database ") {
        state.databases.insert(name.to_string());
        return result(json!("ok"));
    }
    if let Some(name) = command.strip_prefix("drop database ") {
        state.databases.remove(name);
        return result(json!("ok"));
    }
    (
        StatusCode::BAD_REQUEST,
        json!({"exception": "com.arcadedb.exception.CommandParsingException"}).to_string(),
    )
}

async fn exists(State(state): State<Shared>, Path(db): Path<String>) -> (StatusCode, String) {
    result(json!(state.lock().unwrap().databases.contains(&db)))
}

async fn databases(State(state): State<Shared>) -> (StatusCode, String) {
    result(json!(state.lock().unwrap().databases))
}

fn echo(endpoint: &str, headers: &HeaderMap, body: &str) -> (StatusCode, String) {
    let payload: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    result(json!([{ "endpoint": endpoint, "payload": payload, "session": session }]))
}

async fn query(headers: HeaderMap, body: String) -> (StatusCode, String) {
    echo("query", &headers, &body)
}

async fn command(headers: HeaderMap, body: String) -> (StatusCode, String) {
    echo("command", &headers, &body)
}

async fn begin(State(state): State<Shared>) -> (StatusCode, [(&'static str, &'static str); 1]) {
    state.lock().unwrap().open_sessions.insert(SESSION.to_string());
    (StatusCode::NO_CONTENT, [(SESSION_HEADER, SESSION)])
}

async fn finish(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, String) {
    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if state.lock().unwrap().open_sessions.remove(session) {
        (StatusCode::NO_CONTENT, String::new())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "exception": "com.arcadedb.server.http.handler.TransactionNotFoundException",
                "detail": format!("transaction {} not found", session)
            })
            .to_string(),
        )
    }
}

async fn spawn_server(state: Shared) -> SocketAddr {
    let router = Router::new()
        .route("/api/v1/server", post(server_command))
        .route("/api/v1/exists/:db", get(exists))
        .route("/api/v1/databases", get(databases))
        .route("/api/v1/query/:db", post(query))
        .route("/api/v1/command/:db", post(command))
        .route("/api/v1/begin/:db", post(begin))
        .route("/api/v1/commit/:db", post(finish))
        .route("/api/v1/rollback/:db", post(finish))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn client(state: &Shared) -> Arc<Client> {
    let addr = spawn_server(state.clone()).await;
    let config = ClientConfig::new(addr.ip().to_string(), addr.port())
        .with_credentials("root", "playwithdata")
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy::new(2, Duration::from_millis(10), 2));
    Arc::new(Client::connect(config).await.unwrap())
}

#[tokio::test]
async fn test_database_lifecycle() {
    init_tracing();
    let state = Shared::default();
    let client = client(&state).await;

    assert!(!Database::exists(&client, "social").await.unwrap());
    let db = Database::create(client.clone(), "social").await.unwrap();
    assert_eq!(db.name(), "social");
    assert_eq!(
        Database::list_databases(&client).await.unwrap(),
        vec!["social".to_string()]
    );

    let err = Database::create(client.clone(), "social").await.unwrap_err();
    assert!(matches!(err, Error::State(_)));

    assert!(Database::delete(&client, "social").await.unwrap());
    let err = Database::open(client, "social").await.unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[tokio::test]
async fn test_cypher_query_over_http() {
    init_tracing();
    let state = Shared::default();
    state.lock().unwrap().databases.insert("social".to_string());
    let db = Database::open(client(&state).await, "social").await.unwrap();

    let output = db
        .query(
            QueryRequest::new(Language::Cypher, "MATCH (p:Person {name: $name}) RETURN p")
                .with_param("name", "Alice")
                .with_limit(10),
        )
        .await
        .unwrap();

    let rows = output.into_value().unwrap();
    assert_eq!(rows[0]["endpoint"], "query");
    assert_eq!(
        rows[0]["payload"],
        json!({
            "command": "MATCH (p:Person {name: 'Alice'}) RETURN p",
            "language": "cypher",
            "limit": 10
        })
    );
}

#[tokio::test]
async fn test_transaction_commit_and_stale_session() {
    init_tracing();
    let state = Shared::default();
    state.lock().unwrap().databases.insert("social".to_string());
    let db = Database::open(client(&state).await, "social").await.unwrap();

    let tx = db.transaction(IsolationLevel::RepeatableRead).await.unwrap();
    let output = tx
        .query(QueryRequest::sql("INSERT INTO Person SET name = 'Ann'").mutating())
        .await
        .unwrap();
    let rows = output.into_value().unwrap();
    assert_eq!(rows[0]["endpoint"], "command");
    assert_eq!(rows[0]["session"], SESSION);
    tx.commit().await.unwrap();

    // The server no longer knows the session.
    let err = db
        .rollback(arcadedb_dao::SessionId::new(SESSION))
        .await
        .unwrap_err();
    match err {
        Error::Client(arcadedb_client::Error::Server { detail, .. }) => {
            assert!(detail.contains(SESSION));
        }
        other => panic!("expected server error, got {:?}", other),
    }
}
