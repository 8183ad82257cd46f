//! Idle resource storage

use crossbeam::queue::ArrayQueue;
use std::time::{Duration, Instant};

/// A resource sitting in the pool together with the moment it was returned
#[derive(Debug)]
pub(crate) struct IdleEntry<T> {
    pub resource: T,
    pub returned_at: Instant,
}

impl<T> IdleEntry<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            returned_at: Instant::now(),
        }
    }

    pub fn idle_for(&self) -> Duration {
        self.returned_at.elapsed()
    }

    /// An entry is stale once it has been idle for longer than `timeout`
    pub fn is_stale(&self, timeout: Option<Duration>) -> bool {
        match timeout {
            Some(timeout) => self.idle_for() > timeout,
            None => false,
        }
    }
}

/// Bounded lock-free queue of idle entries
///
/// Push and pop never block. A refused push hands the entry back so the
/// caller can close the resource rather than lose it.
pub(crate) struct IdleStore<T> {
    queue: ArrayQueue<IdleEntry<T>>,
}

impl<T> IdleStore<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
        }
    }

    pub fn push(&self, entry: IdleEntry<T>) -> Result<(), IdleEntry<T>> {
        self.queue.push(entry)
    }

    pub fn pop(&self) -> Option<IdleEntry<T>> {
        self.queue.pop()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}
