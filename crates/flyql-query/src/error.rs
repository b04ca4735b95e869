//! Error types for FlyQL parsing.
//!
//! A single parse call can surface several independent mistakes, so the
//! parser accumulates [`ParseErrorMessage`]s and returns them together in
//! one [`ParseError`]. Messages serialize cleanly so an API boundary can
//! enumerate them in a 4xx response body.

use serde::Serialize;
use thiserror::Error;

/// A single syntax error with its location in the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseErrorMessage {
    /// Absolute byte offset (0-indexed) where the error occurred.
    pub offset: usize,
    /// Logical line (1-indexed).
    pub line: usize,
    /// Logical column (1-indexed) within the line.
    pub column: usize,
    /// Description of the error.
    pub message: String,
}

impl std::fmt::Display for ParseErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.line, self.column, self.message)
    }
}

/// One or more syntax errors from a single parse call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
pub struct ParseError {
    /// The accumulated errors, in source order of discovery.
    pub errors: Vec<ParseErrorMessage>,
}
