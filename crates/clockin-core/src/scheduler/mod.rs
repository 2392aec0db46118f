//! Periodic callback scheduling.
//!
//! The timer never owns a thread. It asks a [`Scheduler`] for a repeating
//! callback and keeps the returned [`TickHandle`]; cancelling (or dropping)
//! the handle stops the callback.

mod interval;
mod manual;

use std::fmt;
use std::time::Duration;

pub use interval::TokioScheduler;
pub use manual::ManualScheduler;

/// Callback fired once per interval.
pub type TickCallback = Box<dyn Fn() + Send + Sync>;

/// Source of repeating callbacks.
pub trait Scheduler: Send + Sync {
    /// Fire `callback` every `interval`, first time one interval from now.
    fn schedule(&self, interval: Duration, callback: TickCallback) -> TickHandle;
}

/// Cancellation handle for a scheduled callback.
///
/// Cancellation is idempotent. Dropping the handle cancels it.
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickHandle")
            .field("active", &self.is_active())
            .finish()
    }
}
