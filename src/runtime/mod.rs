//! Cooperative single-threaded scheduler.
//!
//! This module contains the "run a suspendable sequence to completion,
//! yielding control each step" primitive that background tasks are
//! written against.
//!
//! It is responsible for:
//! - executing futures on the scheduler's own thread,
//! - advancing many in-flight operations one step at a time,
//! - parking only when no task has work, never blocking on any one task,
//! - enabling cooperative multitasking via yielding.
//!
//! The scheduler itself never runs task work functions; those execute
//! on dedicated worker threads owned by the tasks in [`crate::task`].

mod core;
mod task;
mod waker;

pub(crate) mod yield_now;

pub use self::core::Scheduler;
pub use yield_now::yield_now;
