use crate::MessageQueue;
use newsdesk_events::{Category, Envelope, Message};
use tracing::{debug, info};

/// Messages emitted per category, indexed by [`Category::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    pub id: u32,
    pub per_category: [u64; Category::COUNT],
}

impl ProducerStats {
    pub fn total(&self) -> u64 {
        self.per_category.iter().sum()
    }
}

/// Emits `count` messages with random categories, then `Done`, into its own
/// queue. Sequence numbers are the emission index, starting at 0.
pub struct Producer<'a> {
    id: u32,
    count: u64,
    categories: Vec<Category>,
    rng: XorShift64,
    queue: &'a MessageQueue,
}

impl<'a> Producer<'a> {
    /// `seed` fixes the category sequence; two producers with the same seed
    /// but different ids still draw different sequences.
    pub fn new(id: u32, count: u64, seed: u64, queue: &'a MessageQueue) -> Self {
        Self {
            id,
            count,
            categories: Category::ALL.to_vec(),
            rng: XorShift64::seeded(seed ^ u64::from(id).rotate_left(32)),
            queue,
        }
    }

    /// Draws only from `categories`. An empty slice keeps all three.
    pub fn with_categories(mut self, categories: &[Category]) -> Self {
        if !categories.is_empty() {
            self.categories = categories.to_vec();
        }
        self
    }

    pub fn run(mut self) -> ProducerStats {
        let mut stats = ProducerStats {
            id: self.id,
            ..ProducerStats::default()
        };
        info!(producer = self.id, count = self.count, "producer started");

        for sequence in 0..self.count {
            let category = self.pick_category();
            let message = Message::new(self.id, category, sequence);
            debug!(producer = self.id, %message, "produced");
            self.queue.insert(Envelope::Item(message));
            stats.per_category[category.index()] += 1;
        }
        self.queue.insert(Envelope::Done);

        info!(producer = self.id, produced = stats.total(), "producer done");
        stats
    }

    fn pick_category(&mut self) -> Category {
        let n = self.categories.len() as u64;
        self.categories[(self.rng.next() % n) as usize]
    }
}

/// xorshift64. Never yields 0 once seeded with a non-zero state.
struct XorShift64(u64);

impl XorShift64 {
    fn seeded(seed: u64) -> Self {
        // splitmix64 finalizer spreads nearby seeds apart
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self(if z == 0 { 0x2545_F491_4F6C_DD1D } else { z })
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}
