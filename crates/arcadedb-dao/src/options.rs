//! Facade options.

use std::collections::BTreeSet;

use arcadedb_lang::Language;

use crate::error::{Error, Result};
use crate::model::Driver;

/// Environment variable holding the comma-separated enabled languages.
pub const ENV_ENABLED_LANGUAGES: &str = "ARCADE_ENABLED_LANGUAGES";

/// Options of a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Execution path for statements.
    pub driver: Driver,
    /// Languages accepted by `query`.
    pub languages: BTreeSet<Language>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            driver: Driver::Http,
            languages: Language::ALL.iter().copied().collect(),
        }
    }
}

impl DatabaseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the execution path.
    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.driver = driver;
        self
    }

    /// Restrict the accepted languages.
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = Language>) -> Self {
        self.languages = languages.into_iter().collect();
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_ENABLED_LANGUAGES) {
            self.languages = parse_languages(&raw)?;
        }
        Ok(self)
    }

    /// Whether `language` is accepted.
    pub fn is_enabled(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }
}

fn parse_languages(raw: &str) -> Result<BTreeSet<Language>> {
    let languages = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.parse::<Language>()
                .map_err(|e| Error::Config(format!("{}: {}", ENV_ENABLED_LANGUAGES, e)))
        })
        .collect::<Result<BTreeSet<_>>>()?;

    if languages.is_empty() {
        return Err(Error::Config(format!(
            "{} enables no languages",
            ENV_ENABLED_LANGUAGES
        )));
    }
    Ok(languages)
}
