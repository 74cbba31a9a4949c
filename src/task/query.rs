use tracing::error;

use crate::error::{ConstructionError, WorkError};
use crate::xml::{NodeId, SharedDocument, path};

use super::core::Background;
use super::state::WorkState;

/// A background task that evaluates a path expression against a shared
/// document and captures the first matching node.
///
/// The evaluation runs on the worker thread under the document's lock.
/// A malformed expression is logged, captured in the
/// [`outcome`](Self::outcome), and the captured node stays `None` while
/// the task still completes.
pub struct QuerySingleTask {
    /// The path expression, immutable after construction.
    expression: String,

    /// Worker-thread machinery and result slot.
    task: Background<Result<Option<NodeId>, WorkError>>,
}

impl QuerySingleTask {
    /// Creates a single-result query task against a caller-owned
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptyExpression`] if `expression`
    /// is empty.
    pub fn new(
        document: SharedDocument,
        expression: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        let expression = expression.into();

        if expression.is_empty() {
            return Err(ConstructionError::EmptyExpression);
        }

        let work_expr = expression.clone();
        let task = Background::new(move || {
            document.with(|doc| match path::query_single(doc, &work_expr) {
                Ok(node) => Ok(node),
                Err(err) => {
                    error!(expression = work_expr.as_str(), %err, "query evaluation failed");
                    Err(err.into())
                }
            })
        });

        Ok(Self { expression, task })
    }

    /// The path expression this task evaluates.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkState {
        self.task.state()
    }

    /// Drives the evaluation to completion, yielding each tick.
    ///
    /// See [`Background::begin`] for the completion contract.
    pub async fn begin(&mut self) {
        self.task.begin().await;
    }

    /// The first matching node in document order.
    ///
    /// `None` before completion, on zero matches, and on a failed
    /// evaluation; check [`outcome`](Self::outcome) to tell these
    /// apart.
    pub fn node(&self) -> Option<NodeId> {
        self.task.peek(|result| match result {
            Some(Ok(node)) => *node,
            _ => None,
        })
    }

    /// The captured result of the work function.
    pub fn outcome(&self) -> Option<Result<Option<NodeId>, WorkError>> {
        self.task.peek(|result| result.cloned())
    }
}

/// A background task that evaluates a path expression against a shared
/// document and captures all matching nodes.
///
/// Matches are captured as an ordered sequence in document order. Zero
/// matches yields an empty sequence, never an absent one.
pub struct QueryListTask {
    /// The path expression, immutable after construction.
    expression: String,

    /// Worker-thread machinery and result slot.
    task: Background<Result<Vec<NodeId>, WorkError>>,
}

impl QueryListTask {
    /// Creates a list-result query task against a caller-owned
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptyExpression`] if `expression`
    /// is empty.
    pub fn new(
        document: SharedDocument,
        expression: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        let expression = expression.into();

        if expression.is_empty() {
            return Err(ConstructionError::EmptyExpression);
        }

        let work_expr = expression.clone();
        let task = Background::new(move || {
            document.with(|doc| match path::query(doc, &work_expr) {
                Ok(nodes) => Ok(nodes),
                Err(err) => {
                    error!(expression = work_expr.as_str(), %err, "query evaluation failed");
                    Err(err.into())
                }
            })
        });

        Ok(Self { expression, task })
    }

    /// The path expression this task evaluates.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkState {
        self.task.state()
    }

    /// Drives the evaluation to completion, yielding each tick.
    ///
    /// See [`Background::begin`] for the completion contract.
    pub async fn begin(&mut self) {
        self.task.begin().await;
    }

    /// All matching nodes in document order.
    ///
    /// Empty before completion, on zero matches, and on a failed
    /// evaluation.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.task.peek(|result| match result {
            Some(Ok(nodes)) => nodes.clone(),
            _ => Vec::new(),
        })
    }

    /// The captured result of the work function.
    pub fn outcome(&self) -> Option<Result<Vec<NodeId>, WorkError>> {
        self.task.peek(|result| result.cloned())
    }
}
