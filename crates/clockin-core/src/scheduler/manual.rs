//! Deterministic scheduler driven by an explicit clock.
//!
//! Nothing fires until [`ManualScheduler::advance`] moves the clock. Used in
//! tests and by one-shot CLI commands that never tick.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Scheduler, TickCallback, TickHandle};
use crate::observable::lock;

struct ManualTimer {
    id: u64,
    interval: Duration,
    next_due: Duration,
    callback: Arc<dyn Fn() + Send + Sync>,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since creation.
    pub fn now(&self) -> Duration {
        lock(&self.clock).now
    }

    /// Number of callbacks still scheduled.
    pub fn active_timers(&self) -> usize {
        lock(&self.clock).timers.len()
    }

    /// Move the clock forward, firing every callback that falls due, in
    /// due-time order. Callbacks may schedule or cancel timers.
    pub fn advance(&self, by: Duration) {
        let target = lock(&self.clock).now + by;
        loop {
            let mut clock = lock(&self.clock);
            let due = clock
                .timers
                .iter_mut()
                .filter(|t| t.next_due <= target)
                .min_by_key(|t| (t.next_due, t.id))
                .map(|t| {
                    let at = t.next_due;
                    t.next_due += t.interval;
                    (at, Arc::clone(&t.callback))
                });

            match due {
                Some((at, callback)) => {
                    clock.now = at;
                    drop(clock);
                    callback();
                }
                None => {
                    clock.now = target;
                    break;
                }
            }
        }
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, interval: Duration, callback: TickCallback) -> TickHandle {
        let interval = interval.max(Duration::from_millis(1));
        let id = {
            let mut clock = lock(&self.clock);
            let id = clock.next_id;
            clock.next_id += 1;
            let next_due = clock.now + interval;
            clock.timers.push(ManualTimer {
                id,
                interval,
                next_due,
                callback: Arc::from(callback),
            });
            id
        };

        let weak = Arc::downgrade(&self.clock);
        TickHandle::new(move || {
            if let Some(clock) = weak.upgrade() {
                lock(&clock).timers.retain(|t| t.id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(scheduler: &ManualScheduler, every: Duration) -> (Arc<AtomicUsize>, TickHandle) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let handle = scheduler.schedule(
            every,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (count, handle)
    }

    #[test]
    fn fires_once_per_elapsed_interval() {
        let scheduler = ManualScheduler::new();
        let (count, _handle) = counting(&scheduler, Duration::from_secs(1));

        scheduler.advance(Duration::from_millis(999));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        scheduler.advance_secs(5);
        assert_eq!(count.load(Ordering::SeqCst), 6);
        assert_eq!(scheduler.now(), Duration::from_secs(6));
    }

    #[test]
    fn cancelled_timer_stops_firing() {
        let scheduler = ManualScheduler::new();
        let (count, mut handle) = counting(&scheduler, Duration::from_secs(1));

        scheduler.advance_secs(2);
        handle.cancel();
        scheduler.advance_secs(10);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.active_timers(), 0);
    }

    #[test]
    fn callback_can_cancel_itself() {
        let scheduler = ManualScheduler::new();
        let slot: Arc<Mutex<Option<TickHandle>>> = Arc::new(Mutex::new(None));
        let count = Arc::new(AtomicUsize::new(0));

        let inner_slot = Arc::clone(&slot);
        let counter = Arc::clone(&count);
        let handle = scheduler.schedule(
            Duration::from_secs(1),
            Box::new(move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                    inner_slot.lock().unwrap().take();
                }
            }),
        );
        *slot.lock().unwrap() = Some(handle);

        scheduler.advance_secs(10);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
