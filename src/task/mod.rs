//! Background tasks observed via non-blocking polling.
//!
//! Every task in this module owns one dedicated worker thread whose
//! lifetime is bounded by one invocation of its work function. The
//! owner drives [`Background::begin`] from a cooperative scheduler;
//! each tick re-checks worker liveness and yields, so the scheduler
//! never blocks on a task.
//!
//! Concrete tasks:
//! - [`FileTask`] — read a file's full contents into memory,
//! - [`DocumentTask`] — read a file and parse it into a shared document,
//! - [`QuerySingleTask`] / [`QueryListTask`] — evaluate a path
//!   expression against a shared document.
//!
//! Work failures (missing file, bad parse, bad expression) never cross
//! the task boundary: they are logged and captured in each task's
//! outcome, and the task still reports completion with an empty or
//! default result.

mod core;
mod document;
mod file;
mod query;
mod state;

pub use self::core::Background;
pub use document::DocumentTask;
pub use file::FileTask;
pub use query::{QueryListTask, QuerySingleTask};
pub use state::WorkState;
