use bulletin_core::{CoEditorStats, DispatcherStats, ProducerStats, ScreenStats};
use std::time::Duration;

/// What each stage did during one run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Seed the producers used; feed it back through the config to replay
    /// the same category sequence.
    pub seed: u64,
    /// In config order.
    pub producers: Vec<ProducerStats>,
    pub dispatcher: DispatcherStats,
    /// In [`newsdesk_events::Category::ALL`] order.
    pub co_editors: Vec<CoEditorStats>,
    pub screen: ScreenStats,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn produced(&self) -> u64 {
        self.producers.iter().map(ProducerStats::total).sum()
    }

    pub fn edited(&self) -> u64 {
        self.co_editors.iter().map(|c| c.edited).sum()
    }

    pub fn rendered(&self) -> u64 {
        self.screen.rendered
    }
}
