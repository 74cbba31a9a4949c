use std::fs;

use tracing::error;

use crate::error::{ConstructionError, WorkError};

use super::core::Background;
use super::state::WorkState;

/// A background task that reads a file's full contents into memory.
///
/// The read happens on the task's worker thread with plain blocking
/// I/O; the dedicated thread exists precisely to absorb the block.
///
/// An I/O failure (missing file, unreadable file, invalid UTF-8) never
/// crosses the task boundary as an error: it is logged, captured in the
/// [`outcome`](Self::outcome), and the task still completes with an
/// empty [`content`](Self::content).
pub struct FileTask {
    /// The file path, immutable after construction.
    path: String,

    /// Worker-thread machinery and result slot.
    task: Background<Result<String, WorkError>>,
}

impl FileTask {
    /// Creates a file-loading task.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptyPath`] if `path` is empty.
    pub fn new(path: impl Into<String>) -> Result<Self, ConstructionError> {
        let path = path.into();

        if path.is_empty() {
            return Err(ConstructionError::EmptyPath);
        }

        let work_path = path.clone();
        let task = Background::new(move || load_file(&work_path));

        Ok(Self { path, task })
    }

    /// The path this task reads from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkState {
        self.task.state()
    }

    /// Drives the read to completion, yielding each scheduler tick.
    ///
    /// See [`Background::begin`] for the completion contract.
    pub async fn begin(&mut self) {
        self.task.begin().await;
    }

    /// The loaded text.
    ///
    /// Empty until the task has completed successfully, and empty after
    /// a failed read; check [`outcome`](Self::outcome) to tell the two
    /// apart.
    pub fn content(&self) -> String {
        self.task.peek(|result| match result {
            Some(Ok(content)) => content.clone(),
            _ => String::new(),
        })
    }

    /// The captured result of the work function.
    ///
    /// `None` until the task completes. A task that ended in
    /// [`WorkState::Aborted`] also reports `None`.
    pub fn outcome(&self) -> Option<Result<String, WorkError>> {
        self.task.peek(|result| result.cloned())
    }
}

/// Reads the file at `path` fully into a string.
///
/// Failures are logged here, on the worker thread, and returned as a
/// captured [`WorkError`] rather than propagated.
pub(crate) fn load_file(path: &str) -> Result<String, WorkError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) => {
            error!(path, %err, "file read failed");
            Err(err.into())
        }
    }
}
