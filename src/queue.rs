//! Unbounded FIFO of pending load requests shared by all workers.
//!
//! Producers push without ever waiting. Workers call
//! [`WorkQueue::take_or_wait`], which suspends on a [`Notify`] while the queue
//! is empty instead of polling. Each request is handed to exactly one caller:
//! the pop happens inside the mutex, so two workers can never observe the same
//! head.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::types::LoadRequest;

#[derive(Default)]
struct QueueInner {
    items: VecDeque<LoadRequest>,
    closed: bool,
}

/// Thread-safe queue of pending [`LoadRequest`]s
#[derive(Default)]
pub struct WorkQueue {
    inner: Mutex<QueueInner>,
    available: Notify,
}

impl WorkQueue {
    /// Create an empty, open queue
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a request to the tail
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once the queue has been closed; the
    /// request is not stored.
    pub fn enqueue(&self, request: LoadRequest) -> Result<()> {
        {
            let mut inner = self.lock();
            if inner.closed {
                return Err(Error::ShuttingDown);
            }
            inner.items.push_back(request);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Remove the head if there is one, without waiting
    pub fn try_take(&self) -> Option<LoadRequest> {
        let mut inner = self.lock();
        if inner.closed {
            return None;
        }
        inner.items.pop_front()
    }

    /// Remove and return the head, waiting while the queue is empty
    ///
    /// Returns `None` once the queue is closed. Cancel-safe: dropping the
    /// future never loses a request.
    pub async fn take_or_wait(&self) -> Option<LoadRequest> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register before checking so a push between the check and the
            // await still wakes us.
            notified.as_mut().enable();

            {
                let mut inner = self.lock();
                if inner.closed {
                    return None;
                }
                if let Some(request) = inner.items.pop_front() {
                    return Some(request);
                }
            }

            notified.await;
        }
    }

    /// Close the queue, dropping every pending request
    ///
    /// Wakes all waiting workers so they observe the closed state. Returns the
    /// number of abandoned requests.
    pub fn close(&self) -> usize {
        let abandoned = {
            let mut inner = self.lock();
            inner.closed = true;
            let abandoned = inner.items.len();
            inner.items.clear();
            abandoned
        };
        self.available.notify_waiters();
        abandoned
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of requests waiting to be taken
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether no requests are waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
