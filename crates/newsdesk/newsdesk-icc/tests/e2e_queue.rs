//! Multi-threaded integration tests for the bounded queue.
//!
//! # Overview
//!
//! These tests hammer a single `BoundedQueue` from several OS threads at once
//! and check the three properties every pipeline stage relies on:
//!
//! - capacity is never exceeded, whatever the interleaving
//! - a single writer's items come out in the order they went in
//! - nothing is lost or duplicated
//!
//! ```text
//! [writer 0] --insert-->  +-------------+  --remove-->  [reader 0]
//! [writer 1] --insert-->  | BoundedQueue|  --remove-->  [reader 1]
//!    ...                  |  cap = C    |     ...
//! [writer W] --insert-->  +-------------+  --try_remove-> [poller]
//! ```
//!
//! # Running the Test
//!
//! ```bash
//! cargo test -p newsdesk-icc --test e2e_queue -- --nocapture
//! ```

use newsdesk_events::{Category, Envelope, Message};
use newsdesk_icc::{BoundedQueue, Doorbell, TryRemoveError};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Writes to stderr with immediate flush to bypass test output capture.
macro_rules! log {
    ($($arg:tt)*) => {{
        let _ = writeln!(std::io::stderr(), $($arg)*);
        let _ = std::io::stderr().flush();
    }};
}

/// Items each writer pushes in the stress tests.
const ITEMS_PER_WRITER: u64 = 2_000;

/// xorshift64, enough to shuffle thread counts and capacities per round.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next() % (hi - lo + 1)
    }
}

/// Item tagged with its writer so readers can check per-writer order.
#[derive(Debug, Clone, Copy)]
struct Tagged {
    writer: usize,
    seq: u64,
}

/// Randomized rounds of W writers and R readers over a queue of random
/// capacity. A watcher thread samples `len()` the whole time.
#[test]
fn concurrent_insert_remove_never_exceeds_capacity() {
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);

    for round in 0..12 {
        let capacity = rng.range(1, 20) as usize;
        let writers = rng.range(1, 4) as usize;
        let readers = rng.range(1, 3) as usize;
        log!("[round {round}] capacity={capacity} writers={writers} readers={readers}");

        let queue = BoundedQueue::<Envelope<Tagged>>::new(capacity).unwrap();
        let total = writers as u64 * ITEMS_PER_WRITER;
        let taken = AtomicUsize::new(0);
        let stop = AtomicBool::new(false);

        let per_reader: Vec<Vec<Tagged>> = thread::scope(|s| {
            let watcher = s.spawn(|| {
                let mut peak = 0;
                while !stop.load(Ordering::Acquire) {
                    peak = peak.max(queue.len());
                    thread::yield_now();
                }
                peak
            });

            for w in 0..writers {
                let queue = &queue;
                s.spawn(move || {
                    for seq in 0..ITEMS_PER_WRITER {
                        queue.insert(Envelope::Item(Tagged { writer: w, seq }));
                    }
                });
            }

            let handles: Vec<_> = (0..readers)
                .map(|_| {
                    let (queue, taken) = (&queue, &taken);
                    s.spawn(move || {
                        let mut seen = Vec::new();
                        loop {
                            match queue.remove() {
                                Envelope::Item(item) => {
                                    seen.push(item);
                                    taken.fetch_add(1, Ordering::AcqRel);
                                }
                                Envelope::Done => break,
                            }
                        }
                        seen
                    })
                })
                .collect();

            // wait until everything was consumed, then release each reader
            while (taken.load(Ordering::Acquire) as u64) < total {
                thread::sleep(Duration::from_millis(1));
            }
            for _ in 0..readers {
                queue.insert(Envelope::Done);
            }

            let seen = handles.into_iter().map(|h| h.join().unwrap()).collect();
            stop.store(true, Ordering::Release);
            let peak = watcher.join().unwrap();
            assert!(peak <= capacity, "observed len {peak} > capacity {capacity}");
            seen
        });

        let stats = queue.stats();
        assert!(stats.high_water <= capacity);
        assert_eq!(stats.inserted, total + readers as u64);
        assert_eq!(stats.removed, stats.inserted);

        // conservation: every (writer, seq) exactly once
        let mut all: Vec<(usize, u64)> = per_reader
            .iter()
            .flatten()
            .map(|t| (t.writer, t.seq))
            .collect();
        all.sort_unstable();
        let expected: Vec<(usize, u64)> = (0..writers)
            .flat_map(|w| (0..ITEMS_PER_WRITER).map(move |seq| (w, seq)))
            .collect();
        assert_eq!(all, expected);

        // with one reader, each writer's items arrive in order
        if readers == 1 {
            let mut next = vec![0u64; writers];
            for t in &per_reader[0] {
                assert_eq!(t.seq, next[t.writer], "writer {} out of order", t.writer);
                next[t.writer] += 1;
            }
        }
    }
}

/// One writer, one blocking reader, capacity 1: strict hand-off in order.
#[test]
fn single_writer_fifo_through_capacity_one() {
    let queue = BoundedQueue::new(1).unwrap();

    let received = thread::scope(|s| {
        s.spawn(|| {
            for seq in 0..500u64 {
                queue.insert(Envelope::Item(Message::new(1, Category::News, seq)));
            }
            queue.insert(Envelope::Done);
        });

        let mut received = Vec::new();
        while let Envelope::Item(msg) = queue.remove() {
            received.push(msg.headline().unwrap().sequence);
        }
        received
    });

    assert_eq!(received, (0..500).collect::<Vec<_>>());
    assert_eq!(queue.stats().high_water, 1);
}

/// Poller drains several doorbell queues with `try_remove`, parking when a
/// sweep is empty, and still sees every item from every writer.
#[test]
fn doorbell_poller_drains_all_writers_without_spinning() {
    let bell = Arc::new(Doorbell::new());
    let queues: Vec<BoundedQueue<Envelope<u64>>> = (1..=4)
        .map(|cap| BoundedQueue::with_doorbell(cap, Arc::clone(&bell)).unwrap())
        .collect();

    let (counts, parks) = thread::scope(|s| {
        for (i, queue) in queues.iter().enumerate() {
            s.spawn(move || {
                for n in 0..(i as u64 + 1) * 100 {
                    if n % 50 == 0 {
                        thread::sleep(Duration::from_millis(2));
                    }
                    queue.insert(Envelope::Item(n));
                }
                queue.insert(Envelope::Done);
            });
        }

        let mut counts = vec![0u64; queues.len()];
        let mut finished = vec![false; queues.len()];
        let mut parks = 0u32;
        while finished.iter().any(|f| !f) {
            let ticket = bell.ticket();
            let mut idle = true;
            for (i, queue) in queues.iter().enumerate() {
                match queue.try_remove() {
                    Ok(Envelope::Item(n)) => {
                        assert_eq!(n, counts[i]);
                        counts[i] += 1;
                        idle = false;
                    }
                    Ok(Envelope::Done) => {
                        finished[i] = true;
                        idle = false;
                    }
                    Err(TryRemoveError::Contended) => idle = false,
                    Err(TryRemoveError::Empty) => {}
                }
            }
            if idle {
                parks += 1;
                bell.wait_past(ticket);
            }
        }
        (counts, parks)
    });

    log!("poller parked {parks} times");
    assert_eq!(counts, vec![100, 200, 300, 400]);
}
