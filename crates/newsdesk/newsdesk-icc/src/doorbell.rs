//! Wake-up signal shared by a group of queues.
//!
//! The dispatcher polls producer queues with `try_remove` in a fixed cyclic
//! order. When a full sweep finds nothing it would otherwise spin; instead it
//! parks on the doorbell that every producer queue rings after an insert.
//!
//! # Protocol
//!
//! ```text
//! poller:   t = bell.ticket()  ->  sweep all queues  ->  nothing? bell.wait_past(t)
//! writer:   insert item  ->  bell.ring()
//! ```
//!
//! The ticket is taken *before* the sweep, so an insert that lands after the
//! sweep has looked at its queue still moves the counter past the ticket and
//! the wait returns immediately. No wake-up can be lost.

use std::sync::{Condvar, Mutex, PoisonError};

/// Generation number observed by a poller before it sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct Doorbell {
    /// Number of rings so far. Only ever grows.
    generation: Mutex<u64>,
    rung: Condvar,
}

impl Doorbell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current generation.
    pub fn ticket(&self) -> Ticket {
        Ticket(*self.generation.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Advances the generation and wakes every parked poller.
    pub fn ring(&self) {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation = generation.wrapping_add(1);
        self.rung.notify_all();
    }

    /// Blocks until the doorbell has rung at least once since `ticket` was
    /// taken. Returns immediately if it already has.
    pub fn wait_past(&self, ticket: Ticket) {
        let generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        let _generation = self
            .rung
            .wait_while(generation, |g| *g == ticket.0)
            .unwrap_or_else(PoisonError::into_inner);
    }
}
