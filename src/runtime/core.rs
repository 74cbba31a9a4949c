use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::thread::{self, Thread};

use super::task::{ReadyQueue, ScheduledTask};
use super::waker::{Wakeable, make_waker};

/// The cooperative single-threaded scheduler.
///
/// `Scheduler` advances many in-flight operations one step at a time,
/// never blocking on any one of them. It is responsible for:
/// - spawning fire-and-forget futures,
/// - driving a future to completion via [`block_on`](Self::block_on),
/// - round-robin fairness between ready tasks,
/// - parking the thread only when no task has work.
///
/// All futures are polled on the thread that created the scheduler;
/// [`block_on`](Self::block_on) must be called from that same thread.
/// Blocking work never runs here; tasks in [`crate::task`] move it to
/// dedicated worker threads and the scheduler only polls for their
/// completion.
pub struct Scheduler {
    /// Ready queue shared with task wakers.
    queue: Arc<ReadyQueue>,
}

impl Scheduler {
    /// Creates a new scheduler owned by the current thread.
    pub fn new() -> Self {
        Self {
            queue: Arc::new(ReadyQueue::new(thread::current())),
        }
    }

    /// Spawns a future onto the scheduler.
    ///
    /// The future starts making progress the next time the scheduler
    /// runs a pass inside [`block_on`](Self::block_on). Spawned futures
    /// are fire-and-forget; results are observed through the task
    /// objects they drive, not through a join handle.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// sched.spawn(async {
    ///     // in-flight operation
    /// });
    /// ```
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = Arc::new(ScheduledTask::new(future, self.queue.clone()));
        self.queue.push(task);
    }

    /// Runs a future to completion on the scheduler's thread.
    ///
    /// The future is polled inline, interleaved with one round-robin
    /// pass over the ready queue per step, so spawned tasks make
    /// progress while the main future is suspended. The thread parks
    /// only when neither the main future nor any task has been woken.
    ///
    /// The future does not need to be `Send` or `'static`: it is never
    /// moved off this thread, so it may borrow from the caller's stack.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let mut task = FileTask::new("data.txt")?;
    /// sched.block_on(task.begin());
    /// assert!(!task.content().is_empty());
    /// ```
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        let mut future = pin!(future);

        // Initially woken so the first pass polls the future.
        let main = Arc::new(MainWaker {
            thread: thread::current(),
            woken: AtomicBool::new(true),
        });

        let waker = make_waker(main.clone());
        let mut cx = Context::from_waker(&waker);

        loop {
            if main.woken.swap(false, Ordering::AcqRel) {
                if let Poll::Ready(value) = future.as_mut().poll(&mut cx) {
                    return value;
                }
            }

            // One pass: only the tasks ready at the start of the pass.
            // Tasks that re-queue themselves wait for the next pass.
            let pass = self.queue.len();
            for _ in 0..pass {
                let Some(task) = self.queue.pop() else { break };
                task.run();
            }

            if !main.woken.load(Ordering::Acquire) && self.queue.len() == 0 {
                // A wake between the check and the park leaves an
                // unpark token, so the park returns immediately.
                thread::park();
            }
        }
    }
}

impl Default for Scheduler {
    /// Creates a default scheduler.
    fn default() -> Self {
        Self::new()
    }
}

/// Waker state for the future driven by `block_on`.
///
/// Waking marks the future ready and unparks the scheduler thread.
struct MainWaker {
    /// The scheduler thread to unpark.
    thread: Thread,

    /// Set when the main future should be re-polled.
    woken: AtomicBool,
}

impl Wakeable for MainWaker {
    fn wake_task(self: Arc<Self>) {
        self.woken.store(true, Ordering::Release);
        self.thread.unpark();
    }
}
