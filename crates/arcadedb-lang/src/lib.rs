//! ArcadeDB query dialects.
//!
//! This crate defines the closed set of query languages the server accepts
//! and the client-side parameter templating used for Cypher.
//!
//! # Cypher Templating
//!
//! Cypher support for native parameters is partial, so bound values are
//! inlined as quoted literals. The query is tokenized first, so `$` inside
//! string literals or comments is never touched:
//!
//! ```text
//! MATCH (p:Person) WHERE p.name = $name AND p.id IN $ids RETURN p
//!   with {name: "O'Hara", ids: [1, 2]}
//! =>
//! MATCH (p:Person) WHERE p.name = 'O\'Hara' AND p.id IN $ids RETURN p
//!   with remaining {ids: [1, 2]}
//! ```
//!
//! # Usage
//!
//! ```rust
//! use arcadedb_lang::{format_cypher, Language, Params};
//! use serde_json::json;
//!
//! let language: Language = "CYPHER".parse().unwrap();
//! assert!(language.is_templated());
//!
//! let mut params = Params::new();
//! params.insert("name".into(), json!("Alice"));
//! let formatted = format_cypher("MATCH (p {name: $name}) RETURN p", &params).unwrap();
//! assert_eq!(formatted.query, "MATCH (p {name: 'Alice'}) RETURN p");
//! ```

pub mod error;
pub mod format;
pub mod language;
pub mod lexer;
pub mod span;

pub use error::Error;
pub use format::{escape_literal, format_cypher, Formatted, Params};
pub use language::Language;
pub use lexer::{tokenize, Lexer, Token, TokenClass};
pub use span::Span;
