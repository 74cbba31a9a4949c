use tracing::error;

use crate::error::{ConstructionError, WorkError};
use crate::xml::{Document, SharedDocument};

use super::core::Background;
use super::file::load_file;
use super::state::WorkState;

/// A background task that reads a file and parses it into a shared
/// structured document.
///
/// The document is owned by the caller: created before the task exists
/// and shared by handle for the task's entire lifetime. The worker
/// thread only populates it, under the document's own lock, and only
/// when the parse succeeds; a parse failure is logged, captured in the
/// [`outcome`](Self::outcome), and leaves the document in its previous
/// state while the task still completes.
pub struct DocumentTask {
    /// The file path, immutable after construction.
    path: String,

    /// Worker-thread machinery and result slot.
    ///
    /// The slot keeps the loaded text separate from the parse status:
    /// a read that succeeds stays observable even when the parse fails.
    task: Background<(String, Result<(), WorkError>)>,
}

impl DocumentTask {
    /// Creates a document-loading task targeting a caller-owned
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptyPath`] if `path` is empty.
    pub fn new(
        path: impl Into<String>,
        document: SharedDocument,
    ) -> Result<Self, ConstructionError> {
        let path = path.into();

        if path.is_empty() {
            return Err(ConstructionError::EmptyPath);
        }

        let work_path = path.clone();
        let task = Background::new(move || load_document(&work_path, &document));

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

    /// Drives the load-and-parse to completion, yielding each tick.
    ///
    /// See [`Background::begin`] for the completion contract.
    pub async fn begin(&mut self) {
        self.task.begin().await;
    }

    /// The loaded text, once the read has succeeded.
    ///
    /// The content survives a failed parse: the read and the parse are
    /// separate stages, and only the read feeds this accessor.
    pub fn content(&self) -> String {
        self.task.peek(|result| match result {
            Some((content, _)) => content.clone(),
            None => String::new(),
        })
    }

    /// The captured result of the work function.
    ///
    /// `None` until the task completes.
    pub fn outcome(&self) -> Option<Result<String, WorkError>> {
        self.task.peek(|result| {
            result.map(|(content, status)| match status {
                Ok(()) => Ok(content.clone()),
                Err(err) => Err(err.clone()),
            })
        })
    }
}

/// The document work function: file read, then parse, then install.
///
/// The loaded text is captured as soon as the read succeeds, before any
/// parsing. An empty file is a successful load with nothing to parse,
/// matching the file-task contract that emptiness is not an error.
fn load_document(path: &str, document: &SharedDocument) -> (String, Result<(), WorkError>) {
    let content = match load_file(path) {
        Ok(content) => content,
        Err(err) => return (String::new(), Err(err)),
    };

    if content.is_empty() {
        return (content, Ok(()));
    }

    match Document::parse(&content) {
        Ok(parsed) => {
            document.replace(parsed);
            (content, Ok(()))
        }
        Err(err) => {
            error!(path, %err, "loaded text was not well-formed XML");
            (content, Err(err.into()))
        }
    }
}
