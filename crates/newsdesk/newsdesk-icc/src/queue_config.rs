//! Queue configuration and capacity validation.
//!
//! Every queue in the pipeline is created with a capacity that is known up
//! front and never changes afterwards. A capacity of zero cannot hold even the
//! end-of-stream marker, so it is rejected here rather than deadlocking later.

use crate::bounded::QueueError;

/// Configuration for a bounded queue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of items the queue holds at once. Always `>= 1`.
    capacity: usize,
}

impl QueueConfig {
    /// Creates a configuration with the specified capacity.
    ///
    /// # Errors
    /// Returns [`QueueError::ZeroCapacity`] if `capacity` is 0.
    ///
    /// # Example
    /// ```
    /// use newsdesk_icc::QueueConfig;
    /// let cfg = QueueConfig::new(5).unwrap();
    /// assert_eq!(cfg.capacity(), 5);
    /// assert!(QueueConfig::new(0).is_err());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        Ok(Self { capacity })
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
