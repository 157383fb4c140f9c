use std::hint::black_box;
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bulletin_engine::run_pipeline;
use bulletin_perf::*;
use newsdesk_events::{Envelope, Message};
use newsdesk_icc::BoundedQueue;

/// Round trips per ping-pong round.
const PING_PONG_OPS: usize = 1_000;

/// `(producers, messages per producer, queue size)` of each pipeline run.
const PIPELINE_SHAPES: [(u32, u64, usize); 3] = [(1, 10_000, 1), (3, 10_000, 8), (5, 10_000, 64)];

fn main() {
    let mut queue_results = Vec::new();

    banner("Bounded queue, single thread");
    print_queue_header();
    queue_single_thread(&mut queue_results);

    banner("Bounded queue, cross-thread round trip");
    print_queue_header();
    queue_ping_pong(&mut queue_results);

    banner("Full pipeline (edit delay 0)");
    print_pipeline_header();
    let pipeline_runs: Vec<PipelineRun> = PIPELINE_SHAPES
        .into_iter()
        .map(|(producers, count, queue_size)| {
            let run = pipeline_run(producers, count, queue_size);
            print_pipeline_row(&run);
            run
        })
        .collect();

    save_results(&queue_results, &pipeline_runs);
}

fn queue_single_thread(results: &mut Vec<QueueResult>) {
    let queue = BoundedQueue::new(1024).expect("failed to create queue");
    let item = sample_item();

    for result in [
        time_queue_op("insert+remove", 200, 1_000, || {
            queue.insert(black_box(item.clone()));
            black_box(queue.remove());
        }),
        time_queue_op("try_remove (empty)", 200, 1_000, || {
            black_box(queue.try_remove().ok());
        }),
    ] {
        print_queue_row(&result);
        results.push(result);
    }
}

/// Main thread sends on `ping`, an echo thread answers on `pong`, both with
/// capacity 1.
fn queue_ping_pong(results: &mut Vec<QueueResult>) {
    let ping: BoundedQueue<Envelope<Message>> =
        BoundedQueue::new(1).expect("failed to create queue");
    let pong: BoundedQueue<Envelope<Message>> =
        BoundedQueue::new(1).expect("failed to create queue");

    let result = thread::scope(|s| {
        s.spawn(|| {
            while let Envelope::Item(m) = ping.remove() {
                pong.insert(Envelope::Item(m));
            }
        });

        let result = time_queue_op("round trip (cap=1)", 100, PING_PONG_OPS, || {
            ping.insert(sample_item());
            black_box(pong.remove());
        });
        ping.insert(Envelope::Done);
        result
    });
    print_queue_row(&result);
    results.push(result);
}

fn pipeline_run(producers: u32, count: u64, queue_size: usize) -> PipelineRun {
    let config = pipeline_config(producers, count, queue_size);
    let mut lines: Vec<String> = Vec::with_capacity(config.total_messages() as usize + 1);

    let start = Instant::now();
    let report = run_pipeline(&config, &mut lines).expect("pipeline run failed");
    PipelineRun::new(&config, &report, start.elapsed())
}

fn save_results(queue: &[QueueResult], pipelines: &[PipelineRun]) {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let results_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/results");
    let _ = std::fs::create_dir_all(results_dir);
    let json_path = format!("{results_dir}/{timestamp}_bulletin.json");

    let output = serde_json::json!({
        "timestamp": timestamp,
        "queue": queue,
        "pipelines": pipelines,
    });

    let written = serde_json::to_string_pretty(&output)
        .map_err(std::io::Error::other)
        .and_then(|json| std::fs::write(&json_path, json));
    match written {
        Ok(()) => println!("\n  Results saved to: {json_path}\n"),
        Err(e) => eprintln!("\n  [failed to save results: {e}]\n"),
    }
}
