use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that yields execution back to the scheduler exactly once.
enum YieldOnce {
    /// Not yet suspended; the next poll yields.
    Pending,
    /// Already yielded once; the next poll completes.
    Done,
}

impl Future for YieldOnce {
    type Output = ();

    /// Polls the yield future.
    ///
    /// The first poll schedules the task to be polled again and
    /// suspends; the second poll completes.
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match *self {
            YieldOnce::Pending => {
                *self = YieldOnce::Done;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            YieldOnce::Done => Poll::Ready(()),
        }
    }
}

/// Yields execution back to the scheduler.
///
/// This is one scheduler tick: other in-flight operations make progress
/// before the current one continues. The function yields exactly once,
/// and wakes itself before yielding, so a polling loop built on it is
/// re-polled on every scheduler pass.
///
/// # Examples
///
/// ```rust,ignore
/// while !handle.is_finished() {
///     // Re-check on the next tick
///     yield_now().await;
/// }
/// ```
pub async fn yield_now() {
    YieldOnce::Pending.await
}
