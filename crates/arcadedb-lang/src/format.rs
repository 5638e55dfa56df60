//! Client-side parameter inlining for Cypher.
//!
//! Each `$name` reference (a `$` punctuation token followed by a variable
//! token) is replaced by a quoted literal of its bound value. Values that
//! cannot be inlined safely are left as references and returned in
//! [`Formatted::remaining`], to be sent as the regular parameter map:
//!
//! - lists, which have no single-literal form;
//! - strings containing `$`, which could turn into new references.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::lexer::{tokenize, TokenClass};

/// Parameter mapping, keyed by name without the `$` marker.
pub type Params = Map<String, Value>;

/// Result of formatting a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Formatted {
    /// Query text with inlined literals.
    pub query: String,
    /// Parameters that were left as references.
    pub remaining: Params,
}

/// Inline bound parameters into a Cypher query.
///
/// Every referenced name must be bound. Bound names that the query never
/// references are dropped.
pub fn format_cypher(query: &str, params: &Params) -> Result<Formatted, Error> {
    let tokens = tokenize(query);
    let mut rewritten = String::with_capacity(query.len());
    let mut remaining = Params::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let reference = tokens
            .get(i + 1)
            .filter(|next| token.class == TokenClass::Punctuation && next.class == TokenClass::Variable);

        let Some(variable) = reference else {
            rewritten.push_str(token.text);
            i += 1;
            continue;
        };

        let name = variable.name();
        let value = params.get(name).ok_or_else(|| Error::MissingParameter {
            name: name.to_string(),
            span: token.span.merge(variable.span),
        })?;

        if is_inlinable(value) {
            rewritten.push_str(&quote_literal(&render(value)));
        } else {
            rewritten.push_str(token.text);
            rewritten.push_str(variable.text);
            remaining.insert(name.to_string(), value.clone());
        }
        i += 2;
    }

    Ok(Formatted {
        query: rewritten,
        remaining,
    })
}

/// Escape backslashes and single quotes for a single-quoted literal.
pub fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", escape_literal(text))
}

fn is_inlinable(value: &Value) -> bool {
    match value {
        Value::Array(_) => false,
        Value::String(s) => !s.contains('$'),
        _ => true,
    }
}

/// Textual form of a value: strings as-is, everything else as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        }
    }

    /// Reverse of `escape_literal`.
    fn unescape(text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    #[test]
    fn test_scalars_are_inlined() {
        let formatted = format_cypher(
            "MATCH (p:Person) WHERE p.name = $name AND p.age > $age RETURN p",
            &params(json!({"name": "Alice", "age": 30})),
        )
        .unwrap();

        assert_eq!(
            formatted.query,
            "MATCH (p:Person) WHERE p.name = 'Alice' AND p.age > '30' RETURN p"
        );
        assert!(formatted.remaining.is_empty());
    }

    #[test]
    fn test_lists_are_skipped() {
        let formatted = format_cypher(
            "MATCH (p) WHERE p.id IN $ids AND p.name = $name RETURN p",
            &params(json!({"ids": [1, 2, 3], "name": "Bob"})),
        )
        .unwrap();

        assert_eq!(
            formatted.query,
            "MATCH (p) WHERE p.id IN $ids AND p.name = 'Bob' RETURN p"
        );
        assert_eq!(formatted.remaining, params(json!({"ids": [1, 2, 3]})));
    }

    #[test]
    fn test_strings_with_marker_are_skipped() {
        let formatted = format_cypher(
            "CREATE (i:Item {price: $price})",
            &params(json!({"price": "$5.00"})),
        )
        .unwrap();

        assert_eq!(formatted.query, "CREATE (i:Item {price: $price})");
        assert_eq!(formatted.remaining, params(json!({"price": "$5.00"})));
    }

    #[test]
    fn test_escaping_round_trip() {
        let original = r"O'Brien said \ hi";
        let formatted = format_cypher(
            "RETURN $quote AS q",
            &params(json!({ "quote": original })),
        )
        .unwrap();

        assert_eq!(formatted.query, r"RETURN 'O\'Brien said \\ hi' AS q");

        let literal = formatted
            .query
            .strip_prefix("RETURN '")
            .and_then(|rest| rest.strip_suffix("' AS q"))
            .unwrap();
        assert_eq!(unescape(literal), original);
    }

    #[test]
    fn test_missing_parameter() {
        let err = format_cypher(
            "MATCH (n) WHERE n.id = $id RETURN n",
            &params(json!({"other": 1})),
        )
        .unwrap_err();

        assert_eq!(
            err,
            Error::MissingParameter {
                name: "id".to_string(),
                span: crate::span::Span::new(23, 26),
            }
        );
    }

    #[test]
    fn test_markers_inside_literals_and_comments_untouched() {
        let query = "RETURN '$name' AS a, $name AS b // $name";
        let formatted = format_cypher(query, &params(json!({"name": "x"}))).unwrap();
        assert_eq!(formatted.query, "RETURN '$name' AS a, 'x' AS b // $name");

        // Unbound references inside block comments are not required.
        let query = "RETURN /* $other */ $name";
        let formatted = format_cypher(query, &params(json!({"name": "x"}))).unwrap();
        assert_eq!(formatted.query, "RETURN /* $other */ 'x'");
    }

    #[test]
    fn test_unreferenced_parameters_dropped() {
        let formatted = format_cypher(
            "MATCH (n) RETURN n LIMIT 1",
            &params(json!({"unused": [1]})),
        )
        .unwrap();
        assert_eq!(formatted.query, "MATCH (n) RETURN n LIMIT 1");
        assert!(formatted.remaining.is_empty());
    }

    #[test]
    fn test_non_string_rendering() {
        let formatted = format_cypher(
            "RETURN $flag, $nothing, $ratio, $props",
            &params(json!({"flag": true, "nothing": null, "ratio": 0.5, "props": {"k": "v"}})),
        )
        .unwrap();
        assert_eq!(
            formatted.query,
            r#"RETURN 'true', 'null', '0.5', '{"k":"v"}'"#
        );
    }

    #[test]
    fn test_repeated_reference() {
        let formatted = format_cypher(
            "MATCH (a {id: $id}), (b {id: $id}) RETURN a, b",
            &params(json!({"id": "n1"})),
        )
        .unwrap();
        assert_eq!(
            formatted.query,
            "MATCH (a {id: 'n1'}), (b {id: 'n1'}) RETURN a, b"
        );
    }

    #[test]
    fn test_backtick_parameter() {
        let formatted = format_cypher(
            "RETURN $`full name`",
            &params(json!({"full name": "Ada Lovelace"})),
        )
        .unwrap();
        assert_eq!(formatted.query, "RETURN 'Ada Lovelace'");
    }
}
