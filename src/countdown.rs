use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::debug;

pub const TICK_CADENCE: Duration = Duration::from_secs(1);

pub trait Clock: Send + Sync {
    fn now_secs(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        Utc::now().timestamp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    pub fn from_secs(total: i64) -> Self {
        let total = total.max(0);
        Self {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }

    pub fn total_secs(&self) -> i64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Tick(Remaining),
    Expired,
    Finished,
}

/// Countdown logic without any scheduling. `Expired` is reported once; every
/// later step is `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    target: i64,
    finished: bool,
}

impl Countdown {
    pub fn new(target_secs: i64) -> Self {
        Self {
            target: target_secs,
            finished: false,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn step(&mut self, now_secs: i64) -> CountdownStep {
        if self.finished {
            return CountdownStep::Finished;
        }
        let remaining = self.target - now_secs;
        if remaining <= 0 {
            self.finished = true;
            return CountdownStep::Expired;
        }
        CountdownStep::Tick(Remaining::from_secs(remaining))
    }
}

/// Owner side of a running countdown. Cancelling (or dropping) stops the
/// task and waits for it, so no callback runs once `cancel` has returned.
#[derive(Debug)]
pub struct CountdownHandle {
    target: i64,
    cancel_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    pub fn cancel(mut self) {
        self.shutdown();
    }

    /// Blocks until the countdown expires on its own.
    pub fn wait(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.cancel_tx = None;
    }

    fn shutdown(&mut self) {
        // Dropping the sender wakes the task out of its wait.
        self.cancel_tx = None;
        let Some(thread) = self.thread.take() else {
            return;
        };
        if thread.thread().id() != thread::current().id() {
            let _ = thread.join();
        }
        debug!(target_secs = self.target, "countdown stopped");
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs a countdown to `target_secs` on its own thread.
///
/// The first evaluation happens immediately and then once per `cadence`.
/// Deadlines are fixed at `start + n * cadence`, so slow callbacks do not
/// push later ticks back.
/// `on_tick` gets the remaining time while it is positive; `on_expire` runs
/// exactly once when it reaches zero, after which the task ends.
pub fn start_countdown<T, E>(
    target_secs: i64,
    clock: Arc<dyn Clock>,
    cadence: Duration,
    mut on_tick: T,
    on_expire: E,
) -> CountdownHandle
where
    T: FnMut(Remaining) + Send + 'static,
    E: FnOnce() + Send + 'static,
{
    let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
    let thread = thread::spawn(move || {
        let mut countdown = Countdown::new(target_secs);
        let mut on_expire = Some(on_expire);
        let started = Instant::now();
        let mut ticks: u32 = 0;
        loop {
            if !matches!(cancel_rx.try_recv(), Err(TryRecvError::Empty)) {
                return;
            }
            match countdown.step(clock.now_secs()) {
                CountdownStep::Tick(remaining) => on_tick(remaining),
                CountdownStep::Expired => {
                    if let Some(expire) = on_expire.take() {
                        expire();
                    }
                    return;
                }
                CountdownStep::Finished => return,
            }
            ticks = ticks.saturating_add(1);
            let deadline = started + cadence.saturating_mul(ticks);
            let wait = deadline.saturating_duration_since(Instant::now());
            match cancel_rx.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    });

    CountdownHandle {
        target: target_secs,
        cancel_tx: Some(cancel_tx),
        thread: Some(thread),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_breaks_down_seconds() {
        let r = Remaining::from_secs(2 * 86_400 + 3 * 3_600 + 4 * 60 + 5);
        assert_eq!(
            r,
            Remaining {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
        assert_eq!(r.to_string(), "02d 03h 04m 05s");
        assert_eq!(r.total_secs(), 2 * 86_400 + 3 * 3_600 + 4 * 60 + 5);
    }

    #[test]
    fn step_expires_once() {
        let mut countdown = Countdown::new(100);
        assert_eq!(
            countdown.step(99),
            CountdownStep::Tick(Remaining::from_secs(1))
        );
        assert_eq!(countdown.step(100), CountdownStep::Expired);
        assert!(countdown.is_finished());
        assert_eq!(countdown.step(50), CountdownStep::Finished);
    }
}
