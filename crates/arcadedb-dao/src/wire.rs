//! PostgreSQL wire-protocol path.
//!
//! The server also speaks the PostgreSQL protocol. Statements in languages
//! other than SQL are sent with a `{language}` prefix, and the connection
//! reuses the HTTP credentials. When the client targets the default HTTP port
//! the default PostgreSQL port is used instead, so no second port setting is
//! needed.
//!
//! Named parameters are rewritten into positional `$n` placeholders and
//! bound with their native types. The connection itself requires the
//! `postgres` feature.

use arcadedb_client::config::DEFAULT_HTTP_PORT;
use arcadedb_lang::{tokenize, Language, Params, TokenClass};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::QueryRequest;

/// Default port of the PostgreSQL protocol plugin.
pub const DEFAULT_WIRE_PORT: u16 = 5432;

/// Port to open the wire-protocol connection on.
pub fn wire_port(http_port: u16) -> u16 {
    if http_port == DEFAULT_HTTP_PORT {
        DEFAULT_WIRE_PORT
    } else {
        http_port
    }
}

/// Statement text as sent over the wire protocol.
pub fn wire_command(language: Language, command: &str) -> String {
    match language {
        Language::Sql => command.to_string(),
        other => format!("{{{}}}{}", other, command),
    }
}

/// Reject request features the wire protocol cannot carry.
pub(crate) fn check_request(request: &QueryRequest) -> Result<()> {
    if request.serializer.is_some() {
        return Err(Error::Validation(
            "serializer is only supported by the HTTP driver".to_string(),
        ));
    }
    if request.session_id.is_some() {
        return Err(Error::Validation(
            "session id is only supported by the HTTP driver".to_string(),
        ));
    }
    Ok(())
}

/// A statement rewritten for positional binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    /// Statement text with `$1`, `$2`, ... placeholders.
    pub command: String,
    /// Values in placeholder order.
    pub values: Vec<Value>,
}

/// Rewrite `:name` and `$name` references into positional placeholders.
///
/// Only names present in `params` are rewritten; a name referenced several
/// times keeps a single placeholder. Lists have no scalar wire encoding and
/// are rejected.
pub fn bind_named(command: &str, params: &Params) -> Result<Bound> {
    let tokens = tokenize(command);
    let mut rewritten = String::with_capacity(command.len());
    let mut names: Vec<&str> = Vec::new();
    let mut values = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let reference = tokens.get(i + 1).filter(|next| {
            token.class == TokenClass::Punctuation
                && matches!(
                    (token.text, next.class),
                    (":", TokenClass::Identifier) | ("$", TokenClass::Variable)
                )
        });
        let bound = reference.and_then(|next| params.get_key_value(next.name()));

        let Some((name, value)) = bound else {
            rewritten.push_str(token.text);
            i += 1;
            continue;
        };

        if value.is_array() {
            return Err(Error::Validation(format!(
                "list parameter {} cannot be bound over the wire protocol",
                name
            )));
        }

        let position = match names.iter().position(|known| *known == name.as_str()) {
            Some(index) => index + 1,
            None => {
                names.push(name);
                values.push(value.clone());
                names.len()
            }
        };
        rewritten.push('$');
        rewritten.push_str(&position.to_string());
        i += 2;
    }

    Ok(Bound {
        command: rewritten,
        values,
    })
}

#[cfg(feature = "postgres")]
pub use driver::PgDriver;

#[cfg(feature = "postgres")]
mod driver {
    use std::fmt;

    use serde_json::Value;
    use sqlx::postgres::{PgArguments, PgConnectOptions, PgConnection, PgRow, PgSslMode};
    use sqlx::query::Query;
    use sqlx::{Column, Connection, Postgres, Row as _, TypeInfo};
    use tokio::sync::Mutex;
    use tracing::{debug, info};

    use arcadedb_client::ClientConfig;

    use super::wire_port;
    use crate::error::Result;
    use crate::model::Row;

    type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

    /// A single PostgreSQL-protocol connection to one database.
    pub struct PgDriver {
        conn: Mutex<PgConnection>,
        database: String,
    }

    impl PgDriver {
        /// Open a connection with the client's host and credentials.
        pub async fn connect(config: &ClientConfig, database: &str) -> Result<Self> {
            let port = wire_port(config.port);
            let options = PgConnectOptions::new()
                .host(&config.host)
                .port(port)
                .username(&config.username)
                .password(&config.password)
                .database(database)
                .ssl_mode(PgSslMode::Disable);

            let conn = PgConnection::connect_with(&options).await?;
            info!(host = %config.host, port, database, "opened wire-protocol connection");

            Ok(Self {
                conn: Mutex::new(conn),
                database: database.to_string(),
            })
        }

        /// Run a statement and fetch every row.
        ///
        /// `values` bind to `$1`, `$2`, ... in order. Without values the
        /// statement goes through the simple query protocol.
        pub async fn execute(&self, command: &str, values: &[Value]) -> Result<Vec<Row>> {
            let mut conn = self.conn.lock().await;
            debug!(
                database = %self.database,
                command,
                bound = values.len(),
                "executing over wire protocol"
            );

            let rows = if values.is_empty() {
                sqlx::raw_sql(command).fetch_all(&mut *conn).await?
            } else {
                values
                    .iter()
                    .fold(sqlx::query(command), bind_value)
                    .fetch_all(&mut *conn)
                    .await?
            };
            Ok(rows.iter().map(decode_row).collect())
        }
    }

    impl fmt::Debug for PgDriver {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("PgDriver")
                .field("database", &self.database)
                .finish_non_exhaustive()
        }
    }

    /// Bind one JSON scalar with its closest PostgreSQL type.
    fn bind_value<'q>(query: PgQuery<'q>, value: &Value) -> PgQuery<'q> {
        match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(flag) => query.bind(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => query.bind(integer),
                None => query.bind(number.as_f64()),
            },
            Value::String(text) => query.bind(text.clone()),
            other => query.bind(other.to_string()),
        }
    }

    /// Convert a row into a JSON object keyed by column name.
    fn decode_row(row: &PgRow) -> Row {
        let mut object = Row::new();
        for column in row.columns() {
            let index = column.ordinal();
            let typed = match column.type_info().name() {
                "BOOL" => row.try_get::<Option<bool>, _>(index).ok().flatten().map(Value::from),
                "INT2" => row.try_get::<Option<i16>, _>(index).ok().flatten().map(Value::from),
                "INT4" => row.try_get::<Option<i32>, _>(index).ok().flatten().map(Value::from),
                "INT8" => row.try_get::<Option<i64>, _>(index).ok().flatten().map(Value::from),
                "FLOAT4" => row.try_get::<Option<f32>, _>(index).ok().flatten().map(Value::from),
                "FLOAT8" => row.try_get::<Option<f64>, _>(index).ok().flatten().map(Value::from),
                _ => None,
            };
            let value = typed
                .or_else(|| {
                    row.try_get_unchecked::<Option<String>, _>(index)
                        .ok()
                        .flatten()
                        .map(Value::String)
                })
                .unwrap_or(Value::Null);
            object.insert(column.name().to_string(), value);
        }
        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Serializer, SessionId};
    use serde_json::json;

    #[test]
    fn test_wire_port_substitution() {
        assert_eq!(wire_port(2480), 5432);
        assert_eq!(wire_port(15432), 15432);
    }

    #[test]
    fn test_wire_command_prefix() {
        assert_eq!(wire_command(Language::Sql, "select 1"), "select 1");
        assert_eq!(
            wire_command(Language::Cypher, "MATCH (n) RETURN n"),
            "{cypher}MATCH (n) RETURN n"
        );
        assert_eq!(wire_command(Language::Gremlin, "g.V()"), "{gremlin}g.V()");
    }

    #[test]
    fn test_check_request() {
        assert!(check_request(&QueryRequest::sql("select 1")).is_ok());

        let serialized = QueryRequest::sql("select 1").with_serializer(Serializer::Record);
        assert!(matches!(
            check_request(&serialized),
            Err(Error::Validation(_))
        ));

        let session = SessionId::new("AS-1");
        let in_session = QueryRequest::sql("select 1").in_session(&session);
        assert!(matches!(
            check_request(&in_session),
            Err(Error::Validation(_))
        ));
    }

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        }
    }

    #[test]
    fn test_bind_named_positions() {
        let bound = bind_named(
            "SELECT FROM Person WHERE name = :name AND age > :age OR nick = :name",
            &params(json!({"name": "Ann", "age": 30, "unused": true})),
        )
        .unwrap();

        assert_eq!(
            bound.command,
            "SELECT FROM Person WHERE name = $1 AND age > $2 OR nick = $1"
        );
        assert_eq!(bound.values, vec![json!("Ann"), json!(30)]);
    }

    #[test]
    fn test_bind_named_dollar_references() {
        let bound = bind_named(
            "MATCH (p:Person) WHERE p.name = $name RETURN p",
            &params(json!({"name": null})),
        )
        .unwrap();

        // `:Person` is a label, not a bound name.
        assert_eq!(bound.command, "MATCH (p:Person) WHERE p.name = $1 RETURN p");
        assert_eq!(bound.values, vec![Value::Null]);
    }

    #[test]
    fn test_bind_named_skips_literals_and_comments() {
        let command = "SELECT ':name' AS a /* :name */ FROM V WHERE b = :name";
        let bound = bind_named(command, &params(json!({"name": "x"}))).unwrap();
        assert_eq!(bound.command, "SELECT ':name' AS a /* :name */ FROM V WHERE b = $1");
        assert_eq!(bound.values.len(), 1);
    }

    #[test]
    fn test_bind_named_rejects_lists() {
        let result = bind_named(
            "SELECT FROM V WHERE id IN :ids",
            &params(json!({"ids": [1, 2]})),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
