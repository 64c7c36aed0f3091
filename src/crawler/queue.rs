//! Unbounded FIFO work queue shared between tasks
//!
//! Both the frontier (identifiers awaiting fetch) and the result queue
//! (fetch results awaiting persistence) are `WorkQueue`s. Producers never
//! block; consumers wait asynchronously and give up as soon as their stop
//! token is cancelled.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Notify,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<T>> {
        // A panicking holder cannot leave the deque half-modified
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item and wakes one waiting consumer
    pub fn push(&self, item: T) {
        self.items().push_back(item);
        self.available.notify_one();
    }

    /// Removes the oldest item without waiting
    pub fn try_pop(&self) -> Option<T> {
        self.items().pop_front()
    }

    /// Waits for the oldest item
    ///
    /// Returns `None` once `stop` is cancelled. A stop that is already
    /// cancelled wins over available items, so a stopped consumer never
    /// dequeues again. Dropping the returned future loses nothing.
    pub async fn pop(&self, stop: &CancellationToken) -> Option<T> {
        loop {
            if stop.is_cancelled() {
                return None;
            }

            // Register interest before checking, so a push between the
            // check and the await still wakes us.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.try_pop() {
                return Some(item);
            }

            tokio::select! {
                biased;
                _ = stop.cancelled() => return None,
                _ = &mut notified => {}
            }
        }
    }

    /// Current number of queued items
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Copies out the queued items, oldest first
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items().iter().cloned().collect()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
