//! Structured-document engine.
//!
//! An in-memory tree of element, attribute, and text nodes, with:
//! - parse-from-text ([`Document::parse`]),
//! - path-expression evaluation returning zero, one, or many nodes
//!   ([`path::query`], [`path::query_single`]),
//! - node attribute and text access, programmatic construction, and
//!   serialization back to markup.
//!
//! [`SharedDocument`] is the handle the background tasks share with
//! their caller: it carries the document's own lock, so concurrent
//! tasks touching one document serialize on the document's identity.

mod document;
mod parser;

pub mod path;

pub use document::{Document, NodeId, SharedDocument};
