use offthread::runtime::Scheduler;
use offthread::task::{Background, WorkState};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn work_runs_on_a_worker_thread_and_the_result_is_captured() {
    let sched = Scheduler::new();
    let scheduler_thread = thread::current().id();

    let mut task = Background::new(move || {
        assert_ne!(thread::current().id(), scheduler_thread);
        40 + 2
    });

    assert_eq!(task.state(), WorkState::Created);
    assert_eq!(task.result(), None);

    sched.block_on(task.begin());

    assert_eq!(task.state(), WorkState::Completed);
    assert_eq!(task.result(), Some(42));
}

#[test]
fn work_function_runs_exactly_once() {
    let sched = Scheduler::new();
    let runs = Arc::new(AtomicUsize::new(0));

    let task_runs = runs.clone();
    let mut task = Background::new(move || {
        task_runs.fetch_add(1, Ordering::SeqCst);
    });

    sched.block_on(task.begin());
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // A second begin() is a logged no-op; no new thread, no new run.
    sched.block_on(task.begin());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(task.state(), WorkState::Completed);
}

#[test]
fn slow_work_does_not_block_the_scheduler() {
    let sched = Scheduler::new();
    let ticks = Arc::new(AtomicUsize::new(0));

    let mut task = Background::new(|| {
        thread::sleep(Duration::from_millis(50));
        "done"
    });

    // A spawned task keeps ticking while the worker sleeps.
    let spawned_ticks = ticks.clone();
    sched.spawn(async move {
        loop {
            spawned_ticks.fetch_add(1, Ordering::SeqCst);
            offthread::yield_now().await;
        }
    });

    sched.block_on(task.begin());

    assert_eq!(task.result(), Some("done"));
    assert!(
        ticks.load(Ordering::SeqCst) > 1,
        "scheduler made no progress during the blocking work"
    );
}

#[test]
fn panicking_work_aborts_the_task_without_crossing_the_boundary() {
    let sched = Scheduler::new();

    let mut task: Background<i32> = Background::new(|| panic!("boom"));

    sched.block_on(task.begin());

    assert_eq!(task.state(), WorkState::Aborted);
    assert_eq!(task.result(), None);
    assert!(task.state().is_finished());
}
