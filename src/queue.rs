//! Bounded-growth FIFO hand-off queue: a `Mutex<VecDeque<T>>` plus a
//! `Condvar`. Growth is unbounded in principle, so overrun is observed
//! as growing depth, not prevented by blocking the producer.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

struct Inner<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

/// A clonable handle to a shared FIFO. One producer and one consumer
/// touch each instance in this codebase's logical roles, though nothing
/// here prevents a general MPMC usage.
pub struct Queue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(VecDeque::new()),
                not_empty: Condvar::new(),
            }),
        }
    }

    /// Push never blocks and never fails.
    pub fn push(&self, item: T) {
        let mut items = self.inner.items.lock().unwrap();
        items.push_back(item);
        self.inner.not_empty.notify_one();
    }

    /// Blocks until an item is available.
    pub fn pop(&self) -> T {
        let mut items = self.inner.items.lock().unwrap();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            items = self.inner.not_empty.wait(items).unwrap();
        }
    }

    /// Drains everything currently buffered without blocking.
    pub fn drain(&self) -> Vec<T> {
        let mut items = self.inner.items.lock().unwrap();
        items.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.lock().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.items.lock().unwrap().len()
    }

    /// Blocks until the queue becomes non-empty or `deadline` elapses.
    /// Returns whether it is actually non-empty when this returns. Used
    /// by the Analyzer for cooperative shutdown: a timeout re-checks
    /// `running` instead of blocking forever on a producer that has
    /// stopped. A spurious wakeup with nothing queued must report
    /// `false` so the caller re-checks `running` instead of falling
    /// through to a blocking `pop`.
    pub fn wait_non_empty(&self, deadline: Duration) -> bool {
        let items = self.inner.items.lock().unwrap();
        if !items.is_empty() {
            return true;
        }
        let (items, _) = self
            .inner
            .not_empty
            .wait_timeout(items, deadline)
            .unwrap();
        !items.is_empty()
    }
}
