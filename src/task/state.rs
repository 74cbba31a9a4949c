/// Task has been constructed and holds its work function.
///
/// No worker thread exists yet.
pub(crate) const CREATED: usize = 0;

/// The worker thread has started and the work function is running.
pub(crate) const RUNNING: usize = 1;

/// The work function returned and the worker thread exited naturally.
///
/// This is the normal terminal state. The result slot holds the
/// captured value.
pub(crate) const COMPLETED: usize = 2;

/// The work function panicked.
///
/// The panic was caught at the thread boundary; the result slot is
/// empty and stays empty.
pub(crate) const ABORTED: usize = 3;

/// Lifecycle state of a background task.
///
/// ```text
/// Created --begin()--> Running --work returns--> Completed
///                      Running --work panics--> Aborted
/// ```
///
/// A second `begin()` while `Running` is a logged no-op and does not
/// change the state. `Completed` and `Aborted` are terminal; a task is
/// single-use and never re-spawns its worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkState {
    /// Constructed, worker thread not yet spawned.
    Created,
    /// Worker thread running the work function.
    Running,
    /// Work function returned; result captured.
    Completed,
    /// Work function panicked; result slot empty.
    Aborted,
}

impl WorkState {
    /// Decodes the atomic representation.
    pub(crate) fn from_raw(raw: usize) -> Self {
        match raw {
            CREATED => WorkState::Created,
            RUNNING => WorkState::Running,
            COMPLETED => WorkState::Completed,
            _ => WorkState::Aborted,
        }
    }

    /// Whether the task reached a terminal state.
    pub fn is_finished(self) -> bool {
        matches!(self, WorkState::Completed | WorkState::Aborted)
    }
}
