use anyhow::Context;
use bulletin_config::PipelineConfig;
use bulletin_core::WriteScreen;
use bulletin_engine::Pipeline;
use clap::Parser;
use std::io::{self, BufWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs the news pipeline described by a config file and prints every edited
/// message to stdout, followed by `DONE`.
#[derive(Parser, Debug)]
#[command(name = "bulletin", version, about)]
struct Cli {
    /// Pipeline config: `.toml`, or the line-based `PRODUCER` format
    config: String,

    /// Seed for producer category choices (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Per-message co-editor latency in milliseconds (overrides the config)
    #[arg(long)]
    edit_delay_ms: Option<u64>,

    /// Log filter used when RUST_LOG is unset (overrides the config)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PipelineConfig::load(cli.config.as_str())
        .with_context(|| format!("loading config '{}'", cli.config))?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(delay) = cli.edit_delay_ms {
        config.edit_delay_ms = delay;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config.log_level);

    let pipeline = Pipeline::new(&config).context("building pipeline")?;
    let screen = WriteScreen::new(BufWriter::new(io::stdout()));
    let report = pipeline.run(screen).context("running pipeline")?;

    info!(
        seed = report.seed,
        produced = report.produced(),
        dropped = report.dispatcher.dropped,
        rendered = report.rendered(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "bulletin finished"
    );
    Ok(())
}

// stdout carries the rendered messages; logs go to stderr
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_thread_names(true)
        .init();
}
