//! Line-oriented legacy config format:
//!
//! ```text
//! PRODUCER 1
//! 30
//! queue size = 5
//!
//! PRODUCER 2
//! 25
//! queue size = 3
//!
//! Co-Editor queue size = 17
//! ```
//!
//! Blank lines are ignored. Every `PRODUCER <id>` line is followed by the
//! message count and the queue size on the next two non-blank lines. A bare
//! `PRODUCER` line takes its position in the file (1, 2, ..) as its id.

use crate::config::{ConfigError, PipelineConfig, ProducerConfig};

const PRODUCER: &str = "PRODUCER";
const QUEUE_SIZE: &str = "queue size";
const CO_EDITOR_QUEUE_SIZE: &str = "Co-Editor queue size";

pub(crate) fn parse(text: &str) -> Result<PipelineConfig, ConfigError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let mut producers = Vec::new();
    let mut co_editor_queue_size = None;

    while let Some((n, line)) = lines.next() {
        if let Some(rest) = line.strip_prefix(PRODUCER) {
            let id = match rest.trim() {
                "" => producers.len() as u32 + 1,
                id => number(n, id, "producer id")?,
            };

            let (n, count_line) = lines.next().ok_or_else(|| eof(n, "message count"))?;
            let count = number(n, count_line, "message count")?;

            let (n, size_line) = lines.next().ok_or_else(|| eof(n, "queue size"))?;
            let queue_size = assignment(n, size_line, QUEUE_SIZE)?;

            producers.push(ProducerConfig::new(id, count, queue_size));
        } else if line.starts_with(CO_EDITOR_QUEUE_SIZE) {
            co_editor_queue_size = Some(assignment(n, line, CO_EDITOR_QUEUE_SIZE)?);
        } else {
            return Err(ConfigError::Legacy {
                line: n,
                reason: format!("unexpected line '{line}'"),
            });
        }
    }

    let co_editor_queue_size = co_editor_queue_size.ok_or(ConfigError::Legacy {
        line: text.lines().count(),
        reason: "missing 'Co-Editor queue size = <n>'".into(),
    })?;

    Ok(PipelineConfig::new(co_editor_queue_size, producers))
}

fn number<N: std::str::FromStr>(line: usize, text: &str, what: &str) -> Result<N, ConfigError> {
    text.parse().map_err(|_| ConfigError::Legacy {
        line,
        reason: format!("expected {what}, found '{text}'"),
    })
}

/// Parses `<key> = <n>`.
fn assignment(line: usize, text: &str, key: &str) -> Result<usize, ConfigError> {
    let value = text
        .strip_prefix(key)
        .and_then(|rest| rest.trim_start().strip_prefix('='))
        .ok_or_else(|| ConfigError::Legacy {
            line,
            reason: format!("expected '{key} = <n>', found '{text}'"),
        })?;
    number(line, value.trim(), key)
}

fn eof(line: usize, what: &str) -> ConfigError {
    ConfigError::Legacy {
        line,
        reason: format!("file ends before {what}"),
    }
}
