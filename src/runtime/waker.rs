use std::mem;
use std::sync::Arc;
use std::task::{RawWaker, RawWakerVTable, Waker};

/// Something the scheduler can wake.
///
/// Implemented by scheduled tasks (waking re-queues the task) and by
/// the `block_on` driver (waking unparks the scheduler thread).
pub(crate) trait Wakeable: Send + Sync + 'static {
    /// Signals the implementor that progress is possible.
    fn wake_task(self: Arc<Self>);
}

/// Returns the `RawWakerVTable` for a wakeable of type `W`.
///
/// The vtable defines how the scheduler interacts with the wakeable when:
/// - cloning the waker,
/// - waking,
/// - waking by reference,
/// - dropping the waker.
///
/// # Safety
///
/// All functions in the vtable must uphold the invariants required
/// by [`RawWaker`], in particular:
/// - reference counts must be correctly managed,
/// - the wakeable must remain valid for the lifetime of the waker.
fn vtable<W: Wakeable>() -> &'static RawWakerVTable {
    &RawWakerVTable::new(
        clone_raw::<W>,
        wake_raw::<W>,
        wake_by_ref_raw::<W>,
        drop_raw::<W>,
    )
}

/// Creates a [`Waker`] backed by an `Arc<W>`.
///
/// The returned waker calls [`Wakeable::wake_task`] when woken.
///
/// # Safety
///
/// The pointer stored inside the `RawWaker` originates from
/// `Arc::into_raw` and follows proper reference counting semantics.
/// This function is safe to call as long as `W` correctly implements
/// the wake logic.
pub(crate) fn make_waker<W: Wakeable>(wakeable: Arc<W>) -> Waker {
    unsafe {
        Waker::from_raw(RawWaker::new(
            Arc::into_raw(wakeable) as *const (),
            vtable::<W>(),
        ))
    }
}

/// Clones the raw waker.
///
/// This increments the reference count of the underlying `Arc<W>`
/// and returns a new `RawWaker` pointing to the same wakeable.
fn clone_raw<W: Wakeable>(ptr: *const ()) -> RawWaker {
    let arc = unsafe { Arc::<W>::from_raw(ptr as *const W) };
    let cloned = arc.clone();
    mem::forget(arc);

    RawWaker::new(Arc::into_raw(cloned) as *const (), vtable::<W>())
}

/// Wakes the wakeable and consumes the waker.
///
/// This transfers ownership of the `Arc<W>` into the wake call.
fn wake_raw<W: Wakeable>(ptr: *const ()) {
    let arc = unsafe { Arc::<W>::from_raw(ptr as *const W) };
    arc.wake_task();
}

/// Wakes the wakeable without consuming the waker.
///
/// The underlying `Arc<W>` is cloned to preserve the original
/// reference count.
fn wake_by_ref_raw<W: Wakeable>(ptr: *const ()) {
    let arc = unsafe { Arc::<W>::from_raw(ptr as *const W) };
    arc.clone().wake_task();
    mem::forget(arc);
}

/// Drops the raw waker.
///
/// This decrements the reference count of the underlying `Arc<W>`.
/// No other action is performed.
fn drop_raw<W: Wakeable>(ptr: *const ()) {
    unsafe { Arc::<W>::from_raw(ptr as *const W) };
}
