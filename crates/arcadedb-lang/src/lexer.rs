//! Lexer for Cypher query text using logos.
//!
//! Unlike a parsing lexer, nothing is skipped: whitespace and comments are
//! kept as tokens so the original text can be rebuilt by concatenating token
//! texts. Bytes that match no rule become [`TokenClass::Other`].

use crate::span::Span;
use logos::Logos;

/// Raw lexemes recognized by logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"'([^'\\]|\\.)*'")]
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"`[^`]*`")]
    QuotedName,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    // `$` followed by a parameter name; split in two tokens below.
    #[regex(r"\$([a-zA-Z_][a-zA-Z0-9_]*|[0-9]+|`[^`]+`)")]
    Parameter,

    #[regex(r"[(){}\[\],;:.|]")]
    Punctuation,

    #[regex(r"[=<>!+\-*%^~]+")]
    #[token("/")]
    Operator,

    #[regex(r"[^\x00-\x7F]+")]
    NonAscii,
}

/// Consume a block comment body up to and including `*/`.
/// An unterminated comment runs to the end of input.
fn block_comment(lex: &mut logos::Lexer<Lexeme>) {
    let rest = lex.remainder();
    let len = rest.find("*/").map_or(rest.len(), |end| end + 2);
    lex.bump(len);
}

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Whitespace,
    Comment,
    StringLiteral,
    Identifier,
    Number,
    Punctuation,
    Operator,
    /// Parameter name following a `$` punctuation token.
    Variable,
    Other,
}

/// A token borrowing its text from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub class: TokenClass,
    pub text: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    /// Name of a variable token, with backtick quoting removed.
    pub fn name(&self) -> &'src str {
        let text = self.text;
        if text.len() >= 2 && text.starts_with('`') && text.ends_with('`') {
            &text[1..text.len() - 1]
        } else {
            text
        }
    }
}

/// Lexer that produces classified tokens.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, Lexeme>,
    pending: Option<Token<'src>>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: Lexeme::lexer(source),
            pending: None,
        }
    }

    /// Get the source string.
    pub fn source(&self) -> &'src str {
        self.inner.source()
    }

    fn next_inner(&mut self) -> Option<Token<'src>> {
        let lexeme = self.inner.next()?;
        let text = self.inner.slice();
        let span: Span = self.inner.span().into();

        let class = match lexeme {
            Ok(Lexeme::Whitespace) => TokenClass::Whitespace,
            Ok(Lexeme::LineComment | Lexeme::BlockComment) => TokenClass::Comment,
            Ok(Lexeme::String) => TokenClass::StringLiteral,
            Ok(Lexeme::QuotedName | Lexeme::Identifier) => TokenClass::Identifier,
            Ok(Lexeme::Number) => TokenClass::Number,
            Ok(Lexeme::Punctuation) => TokenClass::Punctuation,
            Ok(Lexeme::Operator) => TokenClass::Operator,
            Ok(Lexeme::Parameter) => {
                // `$` is one byte, so both halves stay on char boundaries.
                self.pending = Some(Token {
                    class: TokenClass::Variable,
                    text: &text[1..],
                    span: Span::new(span.start + 1, span.end),
                });
                return Some(Token {
                    class: TokenClass::Punctuation,
                    text: &text[..1],
                    span: Span::new(span.start, span.start + 1),
                });
            }
            Ok(Lexeme::NonAscii) | Err(()) => TokenClass::Other,
        };

        Some(Token { class, text, span })
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pending.take().or_else(|| self.next_inner())
    }
}

/// Tokenize a source string into a vector of tokens.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Lexer::new(source).collect()
}
