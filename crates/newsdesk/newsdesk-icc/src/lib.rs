mod bounded;
mod doorbell;
mod queue_config;

pub use bounded::{BoundedQueue, QueueError, QueueStats, TryRemoveError};
pub use doorbell::{Doorbell, Ticket};
pub use queue_config::QueueConfig;
