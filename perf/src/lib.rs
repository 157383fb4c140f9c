use bulletin_config::{PipelineConfig, ProducerConfig};
use bulletin_engine::PipelineReport;
use newsdesk_events::{Category, Envelope, Message};
use serde::Serialize;
use std::time::{Duration, Instant};

// ─── Queue latency ──────────────────────────────────────────────────────────

/// Per-operation latency of one queue measurement, in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Latency {
    pub min: u64,
    pub median: u64,
    pub p99: u64,
    pub max: u64,
    pub mean: f64,
    pub rounds: usize,
}

impl Latency {
    /// Nearest-rank summary of per-round averages. `samples` must not be empty.
    pub fn from_samples(mut samples: Vec<u64>) -> Self {
        assert!(!samples.is_empty(), "no samples to summarize");
        samples.sort_unstable();

        let rounds = samples.len();
        let rank = |pct: usize| samples[(pct * rounds).div_ceil(100).clamp(1, rounds) - 1];
        Self {
            min: samples[0],
            median: rank(50),
            p99: rank(99),
            max: samples[rounds - 1],
            mean: samples.iter().sum::<u64>() as f64 / rounds as f64,
            rounds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueResult {
    pub name: String,
    pub latency: Latency,
}

/// Runs `op` `ops_per_round` times per round and records the mean cost of one
/// call for each round. One untimed round goes first to warm the queue.
pub fn time_queue_op<F: FnMut()>(
    name: &str,
    rounds: usize,
    ops_per_round: usize,
    mut op: F,
) -> QueueResult {
    for _ in 0..ops_per_round {
        op();
    }

    let per_round = ops_per_round.max(1) as u128;
    let samples = (0..rounds)
        .map(|_| {
            let start = Instant::now();
            for _ in 0..ops_per_round {
                op();
            }
            (start.elapsed().as_nanos() / per_round).max(1) as u64
        })
        .collect();

    QueueResult {
        name: name.to_string(),
        latency: Latency::from_samples(samples),
    }
}

pub fn print_queue_header() {
    println!(
        "  {:<30} {:>8} {:>8} {:>8} {:>8} {:>10}",
        "Operation", "min", "median", "p99", "max", "ns/op mean"
    );
    println!("  {}", "─".repeat(78));
}

pub fn print_queue_row(r: &QueueResult) {
    let l = &r.latency;
    println!(
        "  {:<30} {:>8} {:>8} {:>8} {:>8} {:>10.1}",
        r.name, l.min, l.median, l.p99, l.max, l.mean
    );
}

// ─── Pipeline runs ──────────────────────────────────────────────────────────

/// One full pipeline run: shape, wall time and what every stage did.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub producers: usize,
    pub queue_size: usize,
    pub produced: u64,
    /// Dispatcher output, in [`Category::ALL`] order.
    pub routed: [u64; Category::COUNT],
    pub dropped: u64,
    pub edited: u64,
    pub rendered: u64,
    pub sweeps: u64,
    pub parks: u64,
    pub wall_ns: u64,
}

impl PipelineRun {
    pub fn new(config: &PipelineConfig, report: &PipelineReport, wall: Duration) -> Self {
        Self {
            producers: config.producers.len(),
            queue_size: config.co_editor_queue_size,
            produced: report.produced(),
            routed: report.dispatcher.routed,
            dropped: report.dispatcher.dropped,
            edited: report.edited(),
            rendered: report.rendered(),
            sweeps: report.dispatcher.sweeps,
            parks: report.dispatcher.parks,
            wall_ns: wall.as_nanos() as u64,
        }
    }

    pub fn messages_per_sec(&self) -> u64 {
        if self.wall_ns == 0 {
            return 0;
        }
        (self.rendered as f64 * 1e9 / self.wall_ns as f64) as u64
    }

    /// Fraction of dispatcher sweeps that ended parked on the doorbell.
    pub fn park_ratio(&self) -> f64 {
        if self.sweeps == 0 {
            return 0.0;
        }
        self.parks as f64 / self.sweeps as f64
    }
}

pub fn print_pipeline_header() {
    println!(
        "  {:<14} {:>8} {:>22} {:>10} {:>10} {:>7}",
        "Shape", "msgs", "routed S/N/W", "elapsed", "msg/s", "parked"
    );
    println!("  {}", "─".repeat(78));
}

pub fn print_pipeline_row(run: &PipelineRun) {
    let [sports, news, weather] = run.routed;
    println!(
        "  {:<14} {:>8} {:>22} {:>8.1}ms {:>10} {:>6.1}%",
        format!("{}p cap={}", run.producers, run.queue_size),
        human_count(run.rendered),
        format!("{sports}/{news}/{weather}"),
        run.wall_ns as f64 / 1e6,
        human_count(run.messages_per_sec()),
        run.park_ratio() * 100.0,
    );
}

// ─── Fixtures ───────────────────────────────────────────────────────────────

pub fn sample_item() -> Envelope<Message> {
    Envelope::Item(Message::new(1, Category::News, 42))
}

/// `producers` producers of `count` messages each, no editing delay.
pub fn pipeline_config(producers: u32, count: u64, queue_size: usize) -> PipelineConfig {
    PipelineConfig::new(
        queue_size,
        (1..=producers)
            .map(|id| ProducerConfig::new(id, count, queue_size))
            .collect(),
    )
    .with_edit_delay_ms(0)
    .with_seed(0xBEEF)
}

pub fn human_count(n: u64) -> String {
    match n {
        0..1_000 => n.to_string(),
        1_000..1_000_000 => format!("{:.1}K", n as f64 / 1e3),
        _ => format!("{:.2}M", n as f64 / 1e6),
    }
}

pub fn banner(title: &str) {
    let rule = "─".repeat(80);
    println!("\n{rule}\n  {title}\n{rule}\n");
}
