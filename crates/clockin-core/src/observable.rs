//! Synchronous publish/subscribe primitives shared by every store.
//!
//! Listeners are called in registration order, after the store's lock has
//! been released, so a listener may call back into the store that notified
//! it. Changes are queued under that lock and delivered strictly in the order
//! they happened: a change made from inside a listener (or by another thread
//! mid-delivery) is delivered once the current one has reached every
//! listener.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Ordered list of listeners for values of type `T`.
pub struct Subscribers<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is explicitly unsubscribed.
    pub fn add(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::new(listener)));
            id
        };

        let weak = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                lock(&registry).listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Deliver `value` to every listener registered at the time of the call.
    pub fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Handle returned by every `subscribe` call.
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop receiving notifications. Safe to call on an already removed listener.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

struct Pending<T> {
    queue: VecDeque<T>,
    draining: bool,
}

/// FIFO of notifications awaiting delivery.
///
/// Owners [`enqueue`](Self::enqueue) while holding their own lock, so queue
/// order is mutation order, then [`drain`](Self::drain) with it released.
/// Only one thread delivers at a time; everyone else just enqueues.
pub(crate) struct Dispatch<T> {
    pending: Mutex<Pending<T>>,
}

impl<T> Dispatch<T> {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(Pending {
                queue: VecDeque::new(),
                draining: false,
            }),
        }
    }

    pub(crate) fn enqueue(&self, item: T) {
        lock(&self.pending).queue.push_back(item);
    }

    /// Deliver queued items in order. Returns at once when another call is
    /// already draining; that call delivers what was just queued.
    pub(crate) fn drain(&self, deliver: impl Fn(&T)) {
        {
            let mut pending = lock(&self.pending);
            if pending.draining {
                return;
            }
            pending.draining = true;
        }
        let _reset = DrainReset(&self.pending);
        loop {
            let next = {
                let mut pending = lock(&self.pending);
                let next = pending.queue.pop_front();
                if next.is_none() {
                    pending.draining = false;
                }
                next
            };
            match next {
                Some(item) => deliver(&item),
                None => return,
            }
        }
    }
}

/// Clears the draining flag if a listener panics mid-delivery.
struct DrainReset<'a, T>(&'a Mutex<Pending<T>>);

impl<T> Drop for DrainReset<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            lock(self.0).draining = false;
        }
    }
}

type Sink<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Cell<T> {
    value: Mutex<T>,
    sink: Option<Sink<T>>,
    subscribers: Subscribers<T>,
    dispatch: Dispatch<T>,
}

/// A value behind a lock that notifies subscribers on every change.
///
/// An optional sink sees each new value before subscribers do; stores use it
/// to write the full value to persistence. The sink runs under the value lock,
/// so persisted values land in the same order as the in-memory ones.
pub struct Observable<T> {
    cell: Arc<Cell<T>>,
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self::build(initial, None)
    }

    pub fn with_sink(initial: T, sink: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self::build(initial, Some(Box::new(sink)))
    }

    fn build(initial: T, sink: Option<Sink<T>>) -> Self {
        Self {
            cell: Arc::new(Cell {
                value: Mutex::new(initial),
                sink,
                subscribers: Subscribers::new(),
                dispatch: Dispatch::new(),
            }),
        }
    }

    /// Point-in-time copy of the value.
    pub fn get(&self) -> T {
        lock(&self.cell.value).clone()
    }

    /// Read through a borrow without cloning the whole value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&lock(&self.cell.value))
    }

    /// Atomic read-modify-write and sink, then subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut value = lock(&self.cell.value);
            f(&mut value);
            if let Some(sink) = &self.cell.sink {
                sink(&*value);
            }
            self.cell.dispatch.enqueue(value.clone());
        }
        let subscribers = &self.cell.subscribers;
        self.cell.dispatch.drain(|snapshot| subscribers.notify(snapshot));
    }

    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Register a listener. It is called immediately with the current value,
    /// then after every change.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        listener(&self.get());
        self.cell.subscribers.add(listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.cell.subscribers.len()
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*lock(&self.cell.value))
            .field("subscribers", &self.cell.subscribers.registry_len())
            .finish()
    }
}

impl<T> Subscribers<T> {
    fn registry_len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

/// Lock ignoring poisoning: a panicking listener must not brick the store.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
