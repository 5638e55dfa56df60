//! Supported query dialects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Query language accepted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Sql,
    SqlScript,
    GraphQl,
    Cypher,
    Gremlin,
    Mongo,
}

impl Language {
    /// Every supported dialect.
    pub const ALL: [Language; 6] = [
        Language::Sql,
        Language::SqlScript,
        Language::GraphQl,
        Language::Cypher,
        Language::Gremlin,
        Language::Mongo,
    ];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Sql => "sql",
            Language::SqlScript => "sqlscript",
            Language::GraphQl => "graphql",
            Language::Cypher => "cypher",
            Language::Gremlin => "gremlin",
            Language::Mongo => "mongo",
        }
    }

    /// Whether bound parameters are inlined client-side before sending.
    pub fn is_templated(&self) -> bool {
        matches!(self, Language::Cypher)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|language| language.as_str() == lowered)
            .ok_or_else(|| Error::UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("SQL".parse::<Language>().unwrap(), Language::Sql);
        assert_eq!("Cypher".parse::<Language>().unwrap(), Language::Cypher);
        assert_eq!("sqlscript".parse::<Language>().unwrap(), Language::SqlScript);
        assert_eq!(" graphql ".parse::<Language>().unwrap(), Language::GraphQl);
    }

    #[test]
    fn test_unknown_language() {
        assert!(matches!(
            "sparql".parse::<Language>(),
            Err(Error::UnknownLanguage(name)) if name == "sparql"
        ));
    }

    #[test]
    fn test_names_round_trip() {
        for language in Language::ALL {
            assert_eq!(language.as_str().parse::<Language>().unwrap(), language);
            let json = serde_json::to_string(&language).unwrap();
            assert_eq!(json, format!("\"{}\"", language.as_str()));
        }
    }

    #[test]
    fn test_only_cypher_is_templated() {
        let templated: Vec<_> = Language::ALL.into_iter().filter(Language::is_templated).collect();
        assert_eq!(templated, vec![Language::Cypher]);
    }
}
