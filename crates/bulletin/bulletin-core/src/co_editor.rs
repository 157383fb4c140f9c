use crate::MessageQueue;
use newsdesk_events::{Category, Envelope};
use std::time::Duration;
use tracing::{debug, info};

/// Default simulated editing latency per message.
pub const DEFAULT_EDIT_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoEditorStats {
    pub category: Category,
    pub edited: u64,
}

/// Drains one category queue into the shared screen queue.
///
/// Each message is held for `edit_delay` and forwarded unchanged, in the
/// order received. On `Done` the co-editor forwards a single `Done` of its
/// own and stops.
pub struct CoEditor<'a> {
    category: Category,
    input: &'a MessageQueue,
    output: &'a MessageQueue,
    edit_delay: Duration,
}

impl<'a> CoEditor<'a> {
    pub fn new(category: Category, input: &'a MessageQueue, output: &'a MessageQueue) -> Self {
        Self {
            category,
            input,
            output,
            edit_delay: DEFAULT_EDIT_DELAY,
        }
    }

    pub fn with_edit_delay(mut self, edit_delay: Duration) -> Self {
        self.edit_delay = edit_delay;
        self
    }

    pub fn run(self) -> CoEditorStats {
        let mut edited = 0u64;
        info!(
            category = %self.category,
            delay_ms = self.edit_delay.as_millis() as u64,
            "co-editor started"
        );

        while let Envelope::Item(message) = self.input.remove() {
            if !self.edit_delay.is_zero() {
                std::thread::sleep(self.edit_delay);
            }
            debug!(category = %self.category, %message, "edited");
            self.output.insert(Envelope::Item(message));
            edited += 1;
        }
        self.output.insert(Envelope::Done);

        info!(category = %self.category, edited, "co-editor done");
        CoEditorStats {
            category: self.category,
            edited,
        }
    }
}
