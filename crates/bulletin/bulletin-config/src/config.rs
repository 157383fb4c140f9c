use newsdesk_events::Category;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    /// Simulated editing latency applied by each co-editor, per message.
    #[serde(default = "defaults::edit_delay_ms")]
    pub edit_delay_ms: u64,
    /// Fixes the category sequence of every producer when set.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Capacity of the three category queues and of the shared screen queue.
    pub co_editor_queue_size: usize,
    pub producers: Vec<ProducerConfig>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ProducerConfig {
    pub id: u32,
    /// Number of messages to emit before the end-of-stream marker.
    pub count: u64,
    pub queue_size: usize,
    #[serde(default = "defaults::categories")]
    pub categories: Vec<Category>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("line {line}: {reason}")]
    Legacy { line: usize, reason: String },

    #[error("config declares no producers")]
    NoProducers,

    #[error("{what} queue size must be at least 1")]
    ZeroQueueSize { what: String },

    #[error("producer {0} is declared more than once")]
    DuplicateProducer(u32),

    #[error("producer {0} has an empty category list")]
    NoCategories(u32),
}

pub(crate) mod defaults {
    use newsdesk_events::Category;

    pub fn log_level() -> String {
        "info".into()
    }

    pub fn edit_delay_ms() -> u64 {
        100
    }

    pub fn categories() -> Vec<Category> {
        Category::ALL.to_vec()
    }
}

impl ProducerConfig {
    pub fn new(id: u32, count: u64, queue_size: usize) -> Self {
        Self {
            id,
            count,
            queue_size,
            categories: defaults::categories(),
        }
    }

    /// Restricts the producer to `categories`.
    pub fn with_categories(mut self, categories: &[Category]) -> Self {
        self.categories = categories.to_vec();
        self
    }
}

impl PipelineConfig {
    pub fn new(co_editor_queue_size: usize, producers: Vec<ProducerConfig>) -> Self {
        Self {
            log_level: defaults::log_level(),
            edit_delay_ms: defaults::edit_delay_ms(),
            seed: None,
            co_editor_queue_size,
            producers,
        }
    }

    pub fn with_edit_delay_ms(mut self, edit_delay_ms: u64) -> Self {
        self.edit_delay_ms = edit_delay_ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reads `path` as TOML when it ends in `.toml`, otherwise as the
    /// line-oriented `PRODUCER` format. The result is validated either way.
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let is_toml = path
            .as_ref()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&text)
        } else {
            Self::from_legacy_str(&text)
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_legacy_str(text: &str) -> Result<Self, ConfigError> {
        let config = crate::legacy::parse(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.producers.is_empty() {
            return Err(ConfigError::NoProducers);
        }
        if self.co_editor_queue_size == 0 {
            return Err(ConfigError::ZeroQueueSize {
                what: "co-editor".into(),
            });
        }

        let mut seen = HashSet::with_capacity(self.producers.len());
        for p in &self.producers {
            if !seen.insert(p.id) {
                return Err(ConfigError::DuplicateProducer(p.id));
            }
            if p.queue_size == 0 {
                return Err(ConfigError::ZeroQueueSize {
                    what: format!("producer {}", p.id),
                });
            }
            if p.categories.is_empty() {
                return Err(ConfigError::NoCategories(p.id));
            }
        }
        Ok(())
    }

    /// Messages the screen should end up rendering.
    pub fn total_messages(&self) -> u64 {
        self.producers.iter().map(|p| p.count).sum()
    }
}
