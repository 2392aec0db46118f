//! Scheduler backed by a tokio runtime.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::{Scheduler, TickCallback, TickHandle};

/// Spawns one tokio task per scheduled callback; cancelling aborts the task.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime the caller is running in.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, period: Duration, callback: TickCallback) -> TickHandle {
        let period = period.max(Duration::from_millis(1));
        let task = self.handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        debug!(?period, "tick task spawned");

        TickHandle::new(move || {
            task.abort();
            debug!("tick task aborted");
        })
    }
}
