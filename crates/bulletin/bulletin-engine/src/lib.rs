mod report;
mod stage;

pub use report::PipelineReport;

use bulletin_config::{ConfigError, PipelineConfig, ProducerConfig};
use bulletin_core::{CoEditor, Dispatcher, MessageQueue, Producer, Screen, ScreenManager};
use newsdesk_events::Category;
use newsdesk_icc::{BoundedQueue, Doorbell, QueueError};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid pipeline config")]
    Config(#[from] ConfigError),

    #[error("failed to create {what} queue")]
    Queue {
        what: String,
        #[source]
        source: QueueError,
    },

    #[error("failed to render to screen")]
    Render(#[source] io::Error),
}

/// Every queue of one pipeline run, allocated up front.
///
/// Queues live exactly as long as the `Pipeline`; `run` consumes it, so a
/// pipeline cannot be started twice.
pub struct Pipeline {
    producers: Vec<ProducerConfig>,
    producer_queues: Vec<MessageQueue>,
    category_queues: [MessageQueue; Category::COUNT],
    shared_queue: MessageQueue,
    doorbell: Arc<Doorbell>,
    edit_delay: Duration,
    seed: u64,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let doorbell = Arc::new(Doorbell::new());
        let producer_queues = config
            .producers
            .iter()
            .map(|p| {
                BoundedQueue::with_doorbell(p.queue_size, Arc::clone(&doorbell)).map_err(|source| {
                    PipelineError::Queue {
                        what: format!("producer {}", p.id),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shared = |what: &str| {
            BoundedQueue::new(config.co_editor_queue_size).map_err(|source| PipelineError::Queue {
                what: what.to_string(),
                source,
            })
        };
        let category_queues = [
            shared(Category::Sports.as_str())?,
            shared(Category::News.as_str())?,
            shared(Category::Weather.as_str())?,
        ];
        let shared_queue = shared("screen")?;

        let seed = config.seed.unwrap_or_else(clock_seed);
        info!(
            producers = producer_queues.len(),
            co_editor_queue_size = config.co_editor_queue_size,
            edit_delay_ms = config.edit_delay_ms,
            seed,
            "pipeline configured"
        );

        Ok(Self {
            producers: config.producers.clone(),
            producer_queues,
            category_queues,
            shared_queue,
            doorbell,
            edit_delay: Duration::from_millis(config.edit_delay_ms),
            seed,
        })
    }

    /// Seed the producers will draw categories from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Starts one thread per stage and returns once all of them have
    /// finished. Threads are joined producers first, then the dispatcher,
    /// the co-editors and finally the screen manager.
    ///
    /// # Errors
    /// [`PipelineError::Render`] if `screen` failed. Every stage still runs
    /// to completion first.
    pub fn run<S: Screen + Send>(self, screen: S) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();
        let [sports, news, weather] = &self.category_queues;

        let (producers, dispatcher, co_editors, screen) = thread::scope(|s| {
            let producers: Vec<_> = self
                .producers
                .iter()
                .zip(&self.producer_queues)
                .map(|(cfg, queue)| {
                    let producer = Producer::new(cfg.id, cfg.count, self.seed, queue)
                        .with_categories(&cfg.categories);
                    stage::spawn(s, format!("producer-{}", cfg.id), move || producer.run())
                })
                .collect();

            let dispatcher = Dispatcher::new(&self.producer_queues, [sports, news, weather])
                .with_doorbell(&self.doorbell);
            let dispatcher = stage::spawn(s, "dispatcher".into(), move || dispatcher.run());

            let co_editors: Vec<_> = Category::ALL
                .into_iter()
                .map(|category| {
                    let editor = CoEditor::new(
                        category,
                        &self.category_queues[category.index()],
                        &self.shared_queue,
                    )
                    .with_edit_delay(self.edit_delay);
                    let name = format!("co-editor-{}", category.as_str().to_lowercase());
                    stage::spawn(s, name, move || editor.run())
                })
                .collect();

            let screen_manager = ScreenManager::new(&self.shared_queue);
            let screen =
                stage::spawn(s, "screen-manager".into(), move || screen_manager.run(screen));

            let producers: Vec<_> = producers.into_iter().map(stage::join).collect();
            info!("producers joined");
            let dispatcher = stage::join(dispatcher);
            info!("dispatcher joined");
            let co_editors: Vec<_> = co_editors.into_iter().map(stage::join).collect();
            info!("co-editors joined");
            let screen = stage::join(screen);
            info!("screen manager joined");

            (producers, dispatcher, co_editors, screen)
        });

        let screen = screen.map_err(PipelineError::Render)?;
        let report = PipelineReport {
            seed: self.seed,
            producers,
            dispatcher,
            co_editors,
            screen,
            elapsed: started.elapsed(),
        };
        info!(
            rendered = report.screen.rendered,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "pipeline finished"
        );
        Ok(report)
    }
}

/// Builds the pipeline described by `config` and runs it to completion.
pub fn run_pipeline<S: Screen + Send>(
    config: &PipelineConfig,
    screen: S,
) -> Result<PipelineReport, PipelineError> {
    Pipeline::new(config)?.run(screen)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}
