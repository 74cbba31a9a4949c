use offthread::runtime::Scheduler;
use offthread::yield_now;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[test]
fn block_on_returns_the_future_value() {
    let sched = Scheduler::new();

    let result = sched.block_on(async { 42 });

    assert_eq!(result, 42);
}

#[test]
fn block_on_accepts_borrowing_futures() {
    let sched = Scheduler::new();
    let values = vec![1, 2, 3];

    // The future borrows from the caller's stack; no 'static bound.
    let sum = sched.block_on(async { values.iter().sum::<i32>() });

    assert_eq!(sum, 6);
    assert_eq!(values.len(), 3);
}

#[test]
fn spawned_tasks_run_while_the_main_future_is_suspended() {
    let sched = Scheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let counter = counter.clone();
        sched.spawn(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    sched.block_on(async {
        while counter.load(Ordering::SeqCst) < 3 {
            yield_now().await;
        }
    });

    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[test]
fn ready_tasks_advance_in_round_robin_fashion() {
    let sched = Scheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    let done = Arc::new(AtomicUsize::new(0));

    for tag in [1usize, 2] {
        let order = order.clone();
        let done = done.clone();

        sched.spawn(async move {
            for _ in 0..5 {
                order.lock().unwrap().push(tag);
                yield_now().await;
            }
            done.fetch_add(1, Ordering::SeqCst);
        });
    }

    sched.block_on(async {
        while done.load(Ordering::SeqCst) < 2 {
            yield_now().await;
        }
    });

    // Neither task gets more than one step ahead of the other.
    let order = order.lock().unwrap();
    assert_eq!(order.len(), 10);
    for prefix in 1..=order.len() {
        let ones = order[..prefix].iter().filter(|&&t| t == 1).count();
        let twos = prefix - ones;
        assert!(ones.abs_diff(twos) <= 1, "unfair interleaving: {order:?}");
    }
}

#[test]
fn yield_now_suspends_exactly_once() {
    let sched = Scheduler::new();
    let polls = Arc::new(AtomicUsize::new(0));

    let observed = {
        let polls = polls.clone();
        sched.block_on(async move {
            polls.fetch_add(1, Ordering::SeqCst);
            yield_now().await;
            polls.fetch_add(1, Ordering::SeqCst);
            polls.load(Ordering::SeqCst)
        })
    };

    assert_eq!(observed, 2);
}
