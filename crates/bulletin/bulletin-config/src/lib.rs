mod config;
mod legacy;

pub use config::{ConfigError, PipelineConfig, ProducerConfig};
