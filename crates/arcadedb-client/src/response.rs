//! Response classification.
//!
//! Every raw response is normalized into either an [`Outcome`] or a typed
//! [`Error`]. Callers never see status codes or unparsed error bodies.

use serde_json::Value;

use crate::error::{is_security_exception, Error, UNKNOWN_ERROR};
use crate::transport::{Headers, RawResponse};

/// Successful response of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The `result` field of a JSON body.
    Result(Value),
    /// A non-empty body that is not JSON or has no `result` field.
    Text(String),
    /// An empty body.
    Empty,
    /// Response headers, when requested instead of the body.
    Headers(Headers),
}

impl Outcome {
    /// The semantic result, with raw text promoted to a JSON string.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Result(value) => Some(value),
            Outcome::Text(text) => Some(Value::String(text)),
            Outcome::Empty | Outcome::Headers(_) => None,
        }
    }

    /// Look up a header of a [`Outcome::Headers`] outcome.
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            Outcome::Headers(headers) => headers
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
            _ => None,
        }
    }

    /// Whether the server sent nothing back.
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }
}

/// Classify a raw response.
pub fn classify(response: RawResponse, return_headers: bool) -> Result<Outcome, Error> {
    if response.status >= 400 {
        return Err(classify_error(response.status, &response.body));
    }

    if return_headers {
        return Ok(Outcome::Headers(response.headers));
    }

    if response.body.is_empty() {
        return Ok(Outcome::Empty);
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(mut map)) => match map.remove("result") {
            Some(result) => Ok(Outcome::Result(result)),
            None => Ok(Outcome::Text(response.body)),
        },
        _ => Ok(Outcome::Text(response.body)),
    }
}

/// Turn an error body into an authentication or server error.
fn classify_error(status: u16, body: &str) -> Error {
    let map = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => {
            return Error::Server {
                status,
                exception: UNKNOWN_ERROR.to_string(),
                detail: format!("unparseable error response (HTTP {})", status),
            }
        }
    };

    let field = |name: &str| map.get(name).and_then(Value::as_str).map(str::to_string);

    let exception = field("exception");
    let detail = field("detail")
        .or_else(|| exception.clone())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
    let exception = exception.unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    if is_security_exception(&exception) {
        Error::Auth { exception, detail }
    } else {
        Error::Server {
            status,
            exception,
            detail,
        }
    }
}
