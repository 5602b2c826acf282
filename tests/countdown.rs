use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use streamboard_terminal::countdown::{Clock, Remaining, start_countdown};

/// Advances one second every time it is read.
struct SteppingClock {
    now: AtomicI64,
}

impl SteppingClock {
    fn starting_at(now: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
        })
    }
}

impl Clock for SteppingClock {
    fn now_secs(&self) -> i64 {
        self.now.fetch_add(1, Ordering::SeqCst)
    }
}

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now_secs(&self) -> i64 {
        self.0
    }
}

#[test]
fn five_ticks_then_one_expiry() {
    let now = 1_760_000_000;
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let expiries = Arc::new(AtomicUsize::new(0));

    let tick_log = ticks.clone();
    let expire_count = expiries.clone();
    let handle = start_countdown(
        now + 5,
        SteppingClock::starting_at(now),
        Duration::from_millis(1),
        move |remaining: Remaining| tick_log.lock().unwrap().push(remaining.total_secs()),
        move || {
            expire_count.fetch_add(1, Ordering::SeqCst);
        },
    );
    handle.wait();

    assert_eq!(*ticks.lock().unwrap(), vec![5, 4, 3, 2, 1]);
    assert_eq!(expiries.load(Ordering::SeqCst), 1);
}

#[test]
fn past_target_expires_without_ticking() {
    let now = 1_760_000_000;
    let (tx, rx) = mpsc::channel();
    let expire_tx = tx.clone();
    let handle = start_countdown(
        now - 30,
        Arc::new(FixedClock(now)),
        Duration::from_millis(1),
        move |_| {
            let _ = tx.send("tick");
        },
        move || {
            let _ = expire_tx.send("expired");
        },
    );
    handle.wait();

    let events: Vec<&str> = rx.try_iter().collect();
    assert_eq!(events, vec!["expired"]);
}

#[test]
fn cancel_stops_further_ticks() {
    let now = 1_760_000_000;
    let ticks = Arc::new(AtomicUsize::new(0));
    let expiries = Arc::new(AtomicUsize::new(0));

    let tick_count = ticks.clone();
    let expire_count = expiries.clone();
    let handle = start_countdown(
        now + 3_600,
        Arc::new(FixedClock(now)),
        Duration::from_millis(5),
        move |_| {
            tick_count.fetch_add(1, Ordering::SeqCst);
        },
        move || {
            expire_count.fetch_add(1, Ordering::SeqCst);
        },
    );
    std::thread::sleep(Duration::from_millis(30));
    handle.cancel();

    let after_cancel = ticks.load(Ordering::SeqCst);
    assert!(after_cancel >= 1);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    assert_eq!(expiries.load(Ordering::SeqCst), 0);
}

#[test]
fn restarting_replaces_the_previous_task() {
    let now = 1_760_000_000;
    let (tx, rx) = mpsc::channel();

    let first_tx = tx.clone();
    let first = start_countdown(
        now + 600,
        Arc::new(FixedClock(now)),
        Duration::from_millis(5),
        move |r: Remaining| {
            let _ = first_tx.send(("first", r.total_secs()));
        },
        || {},
    );
    first.cancel();
    // Everything the first task sent is already queued once cancel returns.
    let stale: Vec<(&str, i64)> = rx.try_iter().collect();
    assert!(stale.iter().all(|(name, _)| *name == "first"));

    let second_tx = tx.clone();
    let second = start_countdown(
        now + 2,
        SteppingClock::starting_at(now),
        Duration::from_millis(1),
        move |r: Remaining| {
            let _ = second_tx.send(("second", r.total_secs()));
        },
        || {},
    );
    second.wait();

    let rest: Vec<(&str, i64)> = rx.try_iter().collect();
    assert_eq!(rest, vec![("second", 2), ("second", 1)]);
}

#[test]
fn slow_ticks_do_not_push_the_schedule_back() {
    let now = 1_760_000_000;
    let cadence = Duration::from_millis(40);
    let work = Duration::from_millis(25);
    let started = Instant::now();
    let handle = start_countdown(
        now + 5,
        SteppingClock::starting_at(now),
        cadence,
        move |_| std::thread::sleep(work),
        || {},
    );
    handle.wait();
    let elapsed = started.elapsed();

    // Expiry is the sixth step: 200 ms on a fixed schedule, 325 ms if each
    // wait started after the callback returned.
    let drifting = (cadence + work) * 5;
    assert!(elapsed >= cadence * 5, "finished too early: {elapsed:?}");
    assert!(elapsed < drifting, "cadence drifted: {elapsed:?}");
}
