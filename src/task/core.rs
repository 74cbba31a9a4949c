use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{error, warn};

use crate::runtime::yield_now::yield_now;

use super::state::{ABORTED, COMPLETED, CREATED, RUNNING, WorkState};

/// State shared between the owner and the worker thread.
///
/// The slot mutex is the task's instance-level mutual exclusion: the
/// worker acquires it to write the result exactly once, and owner-side
/// accessors acquire it to read after completion.
struct Shared<T> {
    /// Lifecycle state, written by `begin()` and the worker thread.
    state: AtomicUsize,

    /// Write-once result slot, populated by the worker under the lock.
    slot: Mutex<Option<T>>,
}

/// A unit of work executed on a dedicated worker thread, observed by
/// the owner via non-blocking polling.
///
/// `Background<T>` is the base every concrete task in this crate is
/// built on. Construction captures the work function; nothing executes
/// until [`begin`](Self::begin) is driven by a cooperative scheduler.
/// The work function runs exactly once, on its own thread, never on the
/// scheduler's thread, and its return value is captured in the result
/// slot for the owner to read after completion.
///
/// A `Background` is single-use: once the worker thread has run, the
/// task stays in its terminal state and further `begin()` calls are
/// logged no-ops.
pub struct Background<T> {
    /// State and result slot shared with the worker thread.
    shared: Arc<Shared<T>>,

    /// The work function, consumed by the first `begin()`.
    work: Option<Box<dyn FnOnce() -> T + Send + 'static>>,

    /// Handle to the worker thread while it is alive.
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Background<T> {
    /// Creates a task around a work function.
    ///
    /// The worker thread is not spawned here; the task starts in
    /// [`WorkState::Created`] and holds the closure until `begin()`.
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                state: AtomicUsize::new(CREATED),
                slot: Mutex::new(None),
            }),
            work: Some(Box::new(work)),
            handle: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkState {
        WorkState::from_raw(self.shared.state.load(Ordering::Acquire))
    }

    /// Runs the work function on a dedicated worker thread and polls
    /// for its completion, yielding to the scheduler on every tick.
    ///
    /// This is the task's only suspension point. Each resumption
    /// re-checks whether the worker thread is still alive; the
    /// scheduler never blocks on it. Once the thread has finished, the
    /// (already terminated) thread is joined so the handle is never
    /// left dangling, one final yield is taken, and the call returns.
    ///
    /// Calling `begin()` while the worker is already running, or after
    /// the task has finished, logs a warning and returns immediately
    /// without starting new work.
    ///
    /// A panic inside the work function does not cross this boundary:
    /// it is caught on the worker thread, the result slot stays empty,
    /// and the task ends in [`WorkState::Aborted`].
    pub async fn begin(&mut self) {
        let Some(work) = self.work.take() else {
            warn!("background task already started, begin() is a no-op");
            return;
        };

        let shared = self.shared.clone();
        shared.state.store(RUNNING, Ordering::Release);

        let handle = thread::spawn(move || {
            match panic::catch_unwind(AssertUnwindSafe(work)) {
                Ok(value) => {
                    // Instance mutex: at most one critical section per
                    // task, released even if a reader poisoned it.
                    let mut slot = match shared.slot.lock() {
                        Ok(slot) => slot,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    *slot = Some(value);
                    drop(slot);

                    shared.state.store(COMPLETED, Ordering::Release);
                }
                Err(_) => {
                    error!("background work function panicked");
                    shared.state.store(ABORTED, Ordering::Release);
                }
            }
        });
        self.handle = Some(handle);

        // Waiting while the worker is alive, one tick per check.
        while self.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            yield_now().await;
        }

        // The thread has finished; joining only reclaims the handle.
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        yield_now().await;
    }

    /// Clones the captured result, if the work function has completed.
    ///
    /// `None` while the task is running and after an aborted run.
    pub fn result(&self) -> Option<T>
    where
        T: Clone,
    {
        self.peek(|result| result.cloned())
    }

    /// Reads the captured result through a closure, under the instance
    /// mutex.
    ///
    /// The closure sees `None` until the work function has completed
    /// and its value has been stored.
    pub(crate) fn peek<R>(&self, read: impl FnOnce(Option<&T>) -> R) -> R {
        let slot = match self.shared.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };

        read(slot.as_ref())
    }
}
