//! Error types for dialect handling and parameter formatting.

use crate::span::{offset_to_line_col, Span};
use thiserror::Error;

/// Dialect and formatting errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The language name is not one of the supported dialects.
    #[error("language {0} not supported")]
    UnknownLanguage(String),

    /// A `$name` reference has no bound value.
    #[error("variable {name} not found in the parameters")]
    MissingParameter {
        /// Referenced name, without the `$` marker.
        name: String,
        /// Span of the `$name` reference.
        span: Span,
    },
}

impl Error {
    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        let span = match self {
            Error::MissingParameter { span, .. } => *span,
            Error::UnknownLanguage(_) => return format!("error: {}\n", self),
        };

        let (line, col) = offset_to_line_col(source, span.start);
        let mut result = format!("error: {}\n", self);
        result.push_str(&format!("  --> line {}:{}\n", line, col));

        if let Some(source_line) = source.lines().nth(line - 1) {
            result.push_str(&format!("   |\n{:3}| {}\n   |", line, source_line));
            for _ in 0..col {
                result.push(' ');
            }
            result.push('^');
            for _ in 1..span.len() {
                result.push('~');
            }
            result.push('\n');
        }

        result
    }
}
