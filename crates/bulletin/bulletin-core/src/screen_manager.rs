use crate::MessageQueue;
use crate::screen::Screen;
use newsdesk_events::{Category, Envelope};
use std::io;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenStats {
    pub rendered: u64,
}

/// Final consumer of the shared queue.
///
/// Counts `Done` markers (one per co-editor) and renders everything else.
/// Stops after the last expected `Done`; since each co-editor forwards its
/// `Done` after its last message, nothing is left behind in the queue.
pub struct ScreenManager<'a> {
    input: &'a MessageQueue,
    // done markers still to come; owned here and nowhere else
    expected_done: usize,
}

impl<'a> ScreenManager<'a> {
    pub fn new(input: &'a MessageQueue) -> Self {
        Self {
            input,
            expected_done: Category::COUNT,
        }
    }

    /// Renders into `screen` until every co-editor has finished.
    ///
    /// # Errors
    /// Returns the first error raised by `screen`. Rendering stops at that
    /// point but the queue keeps being drained to the last `Done`, so no
    /// upstream stage is left blocked on a full shared queue.
    pub fn run<S: Screen>(self, mut screen: S) -> io::Result<ScreenStats> {
        let mut stats = ScreenStats::default();
        let mut done = 0usize;
        let mut failure: Option<io::Error> = None;

        info!(expected_done = self.expected_done, "screen manager started");

        while done < self.expected_done {
            match self.input.remove() {
                Envelope::Done => {
                    done += 1;
                    debug!(done, expected = self.expected_done, "co-editor finished");
                }
                Envelope::Item(message) => {
                    if failure.is_some() {
                        continue;
                    }
                    match screen.show(&message) {
                        Ok(()) => stats.rendered += 1,
                        Err(e) => {
                            warn!(error = %e, "render failed, draining without output");
                            failure = Some(e);
                        }
                    }
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }
        screen.finish()?;
        info!(rendered = stats.rendered, "screen manager done");
        Ok(stats)
    }
}
