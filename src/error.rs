//! Error types for task construction and work execution.
//!
//! The taxonomy follows the two failure domains of the crate:
//!
//! - [`ConstructionError`] — caller-contract violations detected before
//!   any worker thread exists. These fail fast out of constructors.
//! - [`WorkError`] — failures inside a work function (I/O, parse, query
//!   evaluation). These never cross the task boundary as errors; they
//!   are logged, captured in the task's outcome, and the task still
//!   reports completion with an empty/default result.

use std::io;

use thiserror::Error;

/// Invalid arguments at task construction time.
///
/// These are contract violations, not runtime failures: they are
/// reported before any thread work begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// The file path given to a task was empty.
    #[error("path must not be empty")]
    EmptyPath,

    /// The path expression given to a query task was empty.
    #[error("path expression must not be empty")]
    EmptyExpression,
}

/// A failure inside a task's work function.
///
/// Work errors are caught on the worker thread, logged, and surfaced
/// through the owning task's outcome accessor. They carry owned data
/// so a completed outcome can be inspected repeatedly.
#[derive(Debug, Clone, Error)]
pub enum WorkError {
    /// Reading the file failed (missing, unreadable, not UTF-8).
    #[error("I/O error: {0}")]
    Io(String),

    /// The loaded text was not well-formed XML.
    #[error(transparent)]
    Parse(#[from] XmlError),

    /// The path expression was malformed.
    #[error(transparent)]
    Query(#[from] PathError),
}

impl From<io::Error> for WorkError {
    fn from(err: io::Error) -> Self {
        WorkError::Io(err.to_string())
    }
}

/// An XML parse error with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("XML parse error at byte {pos}: {message}")]
pub struct XmlError {
    /// Error message.
    pub message: String,
    /// Byte offset in the source text.
    pub pos: usize,
}

impl XmlError {
    pub(crate) fn new(message: impl Into<String>, pos: usize) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

/// A path-expression error with the byte offset of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path expression error at byte {pos}: {message}")]
pub struct PathError {
    /// Error message.
    pub message: String,
    /// Byte offset in the expression.
    pub pos: usize,
}

impl PathError {
    pub(crate) fn new(message: impl Into<String>, pos: usize) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}
