//! Fixed-capacity FIFO shared between pipeline stages.
//!
//! A monitor: one mutex guarding a `VecDeque` plus two condition variables.
//! Writers wait on `not_full`, readers wait on `not_empty`, and every
//! mutation happens under the lock:
//!
//! ```text
//! insert:  lock -> wait until len < capacity -> push_back -> notify not_empty -> unlock
//! remove:  lock -> wait until len > 0        -> pop_front -> notify not_full  -> unlock
//! ```
//!
//! There is no close operation. A queue is finished when its writer has put
//! the end-of-stream marker on it; the queue itself cannot tell.
//!
//! # Thread Safety
//! `BoundedQueue<T>` is `Send + Sync` for `T: Send`. Share it by reference
//! (scoped threads) or behind an `Arc`.

use crate::doorbell::Doorbell;
use crate::queue_config::QueueConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, TryLockError};

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
}

/// Why a non-blocking remove came back empty-handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryRemoveError {
    #[error("queue is empty")]
    Empty,
    /// Another thread held the lock at the moment of the call. The queue may
    /// well hold items; try again later.
    #[error("queue is momentarily locked by another thread")]
    Contended,
}

/// Counters kept alongside the items, read with [`BoundedQueue::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub inserted: u64,
    pub removed: u64,
    /// Largest length ever observed. Never exceeds the capacity.
    pub high_water: usize,
}

struct State<T> {
    items: VecDeque<T>,
    stats: QueueStats,
}

pub struct BoundedQueue<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    /// Rung after every insert, if this queue belongs to a polled group.
    doorbell: Option<Arc<Doorbell>>,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` items.
    ///
    /// # Errors
    /// Returns [`QueueError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        Ok(Self::from_config(QueueConfig::new(capacity)?))
    }

    pub fn from_config(cfg: QueueConfig) -> Self {
        Self {
            capacity: cfg.capacity(),
            state: Mutex::new(State {
                items: VecDeque::with_capacity(cfg.capacity()),
                stats: QueueStats::default(),
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            doorbell: None,
        }
    }

    /// Like [`BoundedQueue::new`], but every insert also rings `doorbell`.
    pub fn with_doorbell(capacity: usize, doorbell: Arc<Doorbell>) -> Result<Self, QueueError> {
        let mut queue = Self::new(capacity)?;
        queue.doorbell = Some(doorbell);
        Ok(queue)
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> QueueStats {
        self.lock().stats
    }

    /// Appends `item`, blocking while the queue is full.
    ///
    /// Never drops or reorders. Wakes one blocked remover.
    pub fn insert(&self, item: T) {
        let guard = self.lock();
        let mut state = self
            .not_full
            .wait_while(guard, |s| s.items.len() >= self.capacity)
            .unwrap_or_else(PoisonError::into_inner);

        state.items.push_back(item);
        state.stats.inserted += 1;
        state.stats.high_water = state.stats.high_water.max(state.items.len());
        self.not_empty.notify_one();
        drop(state);

        if let Some(bell) = &self.doorbell {
            bell.ring();
        }
    }

    /// Pops the oldest item, blocking while the queue is empty.
    ///
    /// Wakes one blocked inserter.
    pub fn remove(&self) -> T {
        let guard = self.lock();
        let mut state = self
            .not_empty
            .wait_while(guard, |s| s.items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);

        self.pop_locked(&mut state)
    }

    /// Pops the oldest item without ever blocking.
    ///
    /// # Errors
    /// - [`TryRemoveError::Empty`] if there is nothing to take.
    /// - [`TryRemoveError::Contended`] if the lock was held by someone else.
    pub fn try_remove(&self) -> Result<T, TryRemoveError> {
        let mut state = match self.state.try_lock() {
            Ok(state) => state,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(TryRemoveError::Contended),
        };

        if state.items.is_empty() {
            return Err(TryRemoveError::Empty);
        }
        Ok(self.pop_locked(&mut state))
    }

    #[inline(always)]
    fn pop_locked(&self, state: &mut MutexGuard<'_, State<T>>) -> T {
        // callers checked non-empty under the same guard
        let Some(item) = state.items.pop_front() else {
            unreachable!("pop on empty queue")
        };
        state.stats.removed += 1;
        self.not_full.notify_one();
        item
    }

    // critical sections never panic, so a poisoned lock still guards
    // consistent state
    #[inline(always)]
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("has_doorbell", &self.doorbell.is_some())
            .finish()
    }
}
