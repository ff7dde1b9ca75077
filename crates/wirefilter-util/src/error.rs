//! The shared error type for the filter pipeline.
//!
//! Every phase reports through [`FilterError`]: the lexer and parser at
//! compile time, schema validation at compile time, and the evaluator for
//! the two failure modes that can only be discovered while executing (bad
//! regex patterns and bad CIDR literals). A missing value is not an error;
//! it collapses to `false` at the filter boundary.

use thiserror::Error;

use crate::Span;

/// Errors produced while compiling or executing a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Lexical error: unterminated string or raw string, integer overflow,
    /// or an unexpected character. Carries the byte position.
    #[error("lex error at {span}: {message}")]
    Lex { message: String, span: Span },

    /// Syntax error from the parser. Carries the offending token literal.
    #[error("parse error: {message}")]
    Parse { message: String, token: String },

    /// A field referenced in the expression is not declared in the schema.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A function call denied by the schema's function policy.
    #[error("function not allowed: {0}")]
    FunctionNotAllowed(String),

    /// A regex pattern that failed to compile at execute time.
    #[error("invalid regex pattern '{pattern}': {message}")]
    Regex { pattern: String, message: String },

    /// A CIDR literal that failed to parse at execute time.
    #[error("invalid CIDR '{literal}': {message}")]
    Cidr { literal: String, message: String },
}

impl FilterError {
    /// Creates a lexical error at the given span.
    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        Self::Lex {
            message: message.into(),
            span,
        }
    }

    /// Creates a parse error carrying the offending token literal.
    pub fn parse(message: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            token: token.into(),
        }
    }
}

/// Result alias used across the filter pipeline.
pub type FilterResult<T> = std::result::Result<T, FilterError>;
