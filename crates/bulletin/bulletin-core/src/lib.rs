//! Pipeline stages. Each stage is a plain struct borrowing the queues it
//! touches; `run(self)` drives it to completion on the calling thread and
//! returns what it did.
//!
//! ```text
//! Producer x N -> [producer queue] x N -> Dispatcher -> [category queue] x 3
//!     -> CoEditor x 3 -> [shared queue] -> ScreenManager -> Screen
//! ```

pub mod co_editor;
pub mod dispatcher;
pub mod producer;
pub mod screen;
pub mod screen_manager;

pub use co_editor::{CoEditor, CoEditorStats, DEFAULT_EDIT_DELAY};
pub use dispatcher::{Dispatcher, DispatcherStats};
pub use producer::{Producer, ProducerStats};
pub use screen::{COMPLETION_LINE, Screen, WriteScreen};
pub use screen_manager::{ScreenManager, ScreenStats};

use newsdesk_events::{Envelope, Message};
use newsdesk_icc::BoundedQueue;

/// Queue type used between every pair of stages.
pub type MessageQueue = BoundedQueue<Envelope<Message>>;
