use std::cell::UnsafeCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::thread::Thread;

use super::waker::{Wakeable, make_waker};

/// Task is idle and not scheduled.
///
/// The task exists but is not currently queued or running.
pub(crate) const IDLE: usize = 0;

/// Task is queued for execution.
///
/// The task has been scheduled and is waiting in the ready queue.
pub(crate) const QUEUED: usize = 1;

/// Task is currently being polled by the scheduler.
///
/// At most one poll may observe this state at a time.
pub(crate) const RUNNING: usize = 2;

/// Task has completed execution.
///
/// The future has returned `Poll::Ready` and will not be polled again.
pub(crate) const COMPLETED: usize = 3;

/// Task has been notified while running.
///
/// This state indicates that the task was woken while already being
/// polled and should be re-queued once the poll finishes.
pub(crate) const NOTIFIED: usize = 4;

/// The ready queue shared between the scheduler and task wakers.
///
/// Pushes may come from any thread (a waker can travel to a worker
/// thread), so the queue lives behind a mutex. Waking a task while the
/// scheduler is parked unparks the scheduler thread.
pub(crate) struct ReadyQueue {
    /// Tasks ready to be polled, in arrival order.
    items: Mutex<VecDeque<Arc<ScheduledTask>>>,

    /// The scheduler thread, unparked whenever work arrives.
    owner: Thread,
}

impl ReadyQueue {
    /// Creates a ready queue owned by the given scheduler thread.
    pub(crate) fn new(owner: Thread) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            owner,
        }
    }

    /// Pushes a task and unparks the scheduler.
    pub(crate) fn push(&self, task: Arc<ScheduledTask>) {
        self.items.lock().unwrap().push_back(task);
        self.owner.unpark();
    }

    /// Pops the next ready task, if any.
    pub(crate) fn pop(&self) -> Option<Arc<ScheduledTask>> {
        self.items.lock().unwrap().pop_front()
    }

    /// Number of tasks currently queued.
    ///
    /// Used by the scheduler to bound one round-robin pass: tasks that
    /// re-queue themselves while the pass runs wait for the next pass.
    pub(crate) fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

/// A spawned future managed by the scheduler.
///
/// A `ScheduledTask` is the container for a fire-and-forget future. It
/// coordinates the future's lifecycle state, waker registration, and
/// re-queueing.
pub(crate) struct ScheduledTask {
    /// The underlying future.
    ///
    /// Wrapped in `UnsafeCell` for interior mutability during `poll`,
    /// and `Pin<Box<...>>` to keep the future pinned in memory.
    future: UnsafeCell<Pin<Box<dyn Future<Output = ()> + Send>>>,

    /// The current lifecycle state (IDLE, QUEUED, ...).
    state: AtomicUsize,

    /// The ready queue for rescheduling.
    queue: Arc<ReadyQueue>,
}

// Safety: the future is only polled on the scheduler thread, and the
// RUNNING state guarantees exclusive access to the cell. Wakers on
// other threads only touch `state` and `queue`.
unsafe impl Send for ScheduledTask {}
unsafe impl Sync for ScheduledTask {}

impl ScheduledTask {
    /// Creates a new task in the `QUEUED` state, ready to be pushed.
    pub(crate) fn new<F>(future: F, queue: Arc<ReadyQueue>) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            future: UnsafeCell::new(Box::pin(future)),
            state: AtomicUsize::new(QUEUED),
            queue,
        }
    }

    /// Polls the task once.
    ///
    /// This method transitions the task to `RUNNING`, polls the inner
    /// future, and handles the resulting `Poll` state:
    /// - `Poll::Pending`: back to `IDLE`, or re-queued if notified.
    /// - `Poll::Ready`: marked `COMPLETED` and never polled again.
    pub(crate) fn run(self: Arc<Self>) {
        let current = self.state.load(Ordering::Acquire);

        if current != QUEUED && current != NOTIFIED {
            return;
        }

        // Transition to RUNNING. This ensures exclusive access to the cell.
        if self
            .state
            .compare_exchange(current, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let waker = make_waker(self.clone());
        let mut cx = Context::from_waker(&waker);

        // Safety: the RUNNING state guarantees no other poll is in progress.
        let poll = unsafe { (&mut *self.future.get()).as_mut().poll(&mut cx) };

        match poll {
            Poll::Pending => {
                // Return to IDLE unless a wake-up arrived during the poll.
                if self
                    .state
                    .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // Notified while running; move back to QUEUED and reschedule.
                    self.state.store(QUEUED, Ordering::Release);
                    self.queue.push(self.clone());
                }
            }
            Poll::Ready(()) => {
                self.state.store(COMPLETED, Ordering::Release);
            }
        }
    }
}

impl Wakeable for ScheduledTask {
    /// Signals the task to be rescheduled.
    ///
    /// If the task is `IDLE`, it moves to `QUEUED` and is pushed onto
    /// the ready queue. If the task is `RUNNING`, it moves to
    /// `NOTIFIED` so it is re-queued right after the current poll.
    fn wake_task(self: Arc<Self>) {
        loop {
            let state = self.state.load(Ordering::Acquire);

            match state {
                IDLE => {
                    if self
                        .state
                        .compare_exchange(IDLE, QUEUED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.queue.push(self.clone());
                        return;
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return;
                    }
                }
                // Already queued, notified, or finished: nothing to do.
                _ => return,
            }
        }
    }
}
