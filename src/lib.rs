//! # offthread
//!
//! **offthread** lets a single-threaded cooperative scheduler delegate
//! blocking work (file I/O, XML parsing and querying) to a dedicated
//! worker thread per task, and observe completion through non-blocking
//! polling instead of a blocking join.
//!
//! The scheduler side never blocks: driving a task's [`begin`] sequence
//! yields control back to the scheduler on every tick and re-checks
//! worker-thread liveness on every resumption. The worker side is free
//! to block; that is what the thread is for.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use offthread::runtime::Scheduler;
//! use offthread::task::{DocumentTask, QuerySingleTask};
//! use offthread::xml::SharedDocument;
//!
//! let sched = Scheduler::new();
//! let doc = SharedDocument::new();
//!
//! let mut load = DocumentTask::new("catalog.xml", doc.clone()).unwrap();
//! sched.block_on(load.begin());
//!
//! let mut query = QuerySingleTask::new(doc.clone(), "//catalog/book/author").unwrap();
//! sched.block_on(query.begin());
//!
//! if let Some(author) = query.node() {
//!     println!("{}", doc.with(|d| d.text(author)));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`runtime`] — Cooperative single-threaded scheduler (`spawn`, `block_on`, `yield_now`)
//! - [`task`] — Background tasks: file loading, document loading, path queries
//! - [`xml`] — Structured-document engine: parsing, querying, building, serializing
//!
//! [`begin`]: task::Background::begin

mod error;

pub mod runtime;
pub mod task;
pub mod xml;

pub use error::{ConstructionError, PathError, WorkError, XmlError};
pub use runtime::Scheduler;
pub use runtime::yield_now::yield_now;
