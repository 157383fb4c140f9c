//! Fan-in from every producer queue, fan-out by category.
//!
//! The dispatcher never blocks on a producer queue. It visits them with
//! `try_remove` in a fixed cyclic order (0, 1, .., N-1, 0, ..), advancing
//! after every visit whether or not it found anything, so each producer gets
//! a turn once per sweep. Inserts into category queues do block: a slow
//! co-editor throttles dispatch instead of losing messages.
//!
//! When a whole sweep comes back empty the dispatcher parks on the producer
//! group's [`Doorbell`] until some producer inserts again. A sweep that hit a
//! contended lock does not count as empty.

use crate::MessageQueue;
use newsdesk_events::{Category, Envelope};
use newsdesk_icc::{Doorbell, Ticket, TryRemoveError};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Messages forwarded, indexed by [`Category::index`].
    pub routed: [u64; Category::COUNT],
    /// Messages without a recognizable category token.
    pub dropped: u64,
    /// Full passes over the producer queues.
    pub sweeps: u64,
    /// Times the dispatcher parked on the doorbell after an empty sweep.
    pub parks: u64,
}

impl DispatcherStats {
    pub fn total_routed(&self) -> u64 {
        self.routed.iter().sum()
    }
}

pub struct Dispatcher<'a> {
    inputs: &'a [MessageQueue],
    outputs: [&'a MessageQueue; Category::COUNT],
    doorbell: Option<&'a Doorbell>,
}

impl<'a> Dispatcher<'a> {
    /// `outputs` is indexed by [`Category::index`].
    pub fn new(inputs: &'a [MessageQueue], outputs: [&'a MessageQueue; Category::COUNT]) -> Self {
        Self {
            inputs,
            outputs,
            doorbell: None,
        }
    }

    /// Park on `doorbell` after an empty sweep instead of yielding. Every
    /// input queue must ring this doorbell on insert.
    pub fn with_doorbell(mut self, doorbell: &'a Doorbell) -> Self {
        self.doorbell = Some(doorbell);
        self
    }

    pub fn run(self) -> DispatcherStats {
        let producers = self.inputs.len();
        let mut stats = DispatcherStats::default();
        let mut finished = 0usize;
        let mut index = 0usize;
        let mut idle = true;
        let mut ticket = self.doorbell.map(Doorbell::ticket);

        info!(producers, "dispatcher started");

        while finished < producers {
            match self.inputs[index].try_remove() {
                Ok(Envelope::Item(message)) => {
                    idle = false;
                    match message.category() {
                        Some(category) => {
                            debug!(%message, %category, "dispatching");
                            self.outputs[category.index()].insert(Envelope::Item(message));
                            stats.routed[category.index()] += 1;
                        }
                        None => {
                            debug!(%message, "dropping message without a known category");
                            stats.dropped += 1;
                        }
                    }
                }
                Ok(Envelope::Done) => {
                    idle = false;
                    finished += 1;
                    debug!(queue = index, finished, producers, "producer finished");
                }
                Err(TryRemoveError::Contended) => idle = false,
                Err(TryRemoveError::Empty) => {}
            }

            index = (index + 1) % producers;
            if index == 0 {
                stats.sweeps += 1;
                if idle && finished < producers {
                    stats.parks += 1;
                    self.park(ticket);
                }
                ticket = self.doorbell.map(Doorbell::ticket);
                idle = true;
            }
        }

        for category in Category::ALL {
            self.outputs[category.index()].insert(Envelope::Done);
        }

        info!(
            routed = stats.total_routed(),
            dropped = stats.dropped,
            sweeps = stats.sweeps,
            parks = stats.parks,
            "dispatcher done"
        );
        stats
    }

    fn park(&self, ticket: Option<Ticket>) {
        match (self.doorbell, ticket) {
            (Some(bell), Some(ticket)) => bell.wait_past(ticket),
            _ => std::thread::yield_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_events::Message;
    use newsdesk_icc::BoundedQueue;
    use std::sync::Arc;

    fn queues(n: usize, capacity: usize) -> Vec<MessageQueue> {
        (0..n).map(|_| BoundedQueue::new(capacity).unwrap()).collect()
    }

    fn drain(queue: &MessageQueue) -> Vec<Envelope<Message>> {
        let mut out = Vec::new();
        while let Ok(item) = queue.try_remove() {
            out.push(item);
        }
        out
    }

    fn item(producer: u32, category: Category, seq: u64) -> Envelope<Message> {
        Envelope::Item(Message::new(producer, category, seq))
    }

    #[test]
    fn routes_by_category_and_closes_every_output() {
        let inputs = queues(1, 8);
        let outputs = queues(3, 8);
        inputs[0].insert(item(1, Category::News, 0));
        inputs[0].insert(item(1, Category::Weather, 1));
        inputs[0].insert(item(1, Category::Sports, 2));
        inputs[0].insert(item(1, Category::News, 3));
        inputs[0].insert(Envelope::Done);

        let stats = Dispatcher::new(&inputs, [&outputs[0], &outputs[1], &outputs[2]]).run();

        assert_eq!(stats.routed, [1, 2, 1]);
        assert_eq!(stats.dropped, 0);
        assert_eq!(
            drain(&outputs[Category::News.index()]),
            vec![item(1, Category::News, 0), item(1, Category::News, 3), Envelope::Done]
        );
        assert_eq!(
            drain(&outputs[Category::Sports.index()]),
            vec![item(1, Category::Sports, 2), Envelope::Done]
        );
        assert_eq!(
            drain(&outputs[Category::Weather.index()]),
            vec![item(1, Category::Weather, 1), Envelope::Done]
        );
    }

    #[test]
    fn round_robin_interleaves_producers() {
        let inputs = queues(3, 8);
        let outputs = queues(3, 16);
        for (p, queue) in inputs.iter().enumerate() {
            for seq in 0..2 {
                queue.insert(item(p as u32, Category::Sports, seq));
            }
            queue.insert(Envelope::Done);
        }

        Dispatcher::new(&inputs, [&outputs[0], &outputs[1], &outputs[2]]).run();

        let order: Vec<(u32, u64)> = drain(&outputs[0])
            .into_iter()
            .filter_map(Envelope::into_item)
            .map(|m| {
                let h = m.headline().unwrap();
                (h.producer_id, h.sequence)
            })
            .collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn malformed_category_is_dropped() {
        let inputs = queues(1, 4);
        let outputs = queues(3, 4);
        inputs[0].insert(Envelope::Item(Message::from_text("Producer 1 sports 0")));
        inputs[0].insert(Envelope::Item(Message::from_text("garbage")));
        inputs[0].insert(item(1, Category::Weather, 2));
        inputs[0].insert(Envelope::Done);

        let stats = Dispatcher::new(&inputs, [&outputs[0], &outputs[1], &outputs[2]]).run();

        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.routed, [0, 0, 1]);
        assert_eq!(drain(&outputs[0]), vec![Envelope::Done]);
    }

    #[test]
    fn done_is_not_forwarded_until_every_producer_finishes() {
        let bell = Arc::new(Doorbell::new());
        let inputs: Vec<MessageQueue> = (0..2)
            .map(|_| BoundedQueue::with_doorbell(2, Arc::clone(&bell)).unwrap())
            .collect();
        let outputs = queues(3, 8);

        std::thread::scope(|s| {
            let dispatcher = s.spawn(|| {
                Dispatcher::new(&inputs, [&outputs[0], &outputs[1], &outputs[2]])
                    .with_doorbell(&bell)
                    .run()
            });

            inputs[0].insert(Envelope::Done);
            std::thread::sleep(std::time::Duration::from_millis(50));
            assert!(!dispatcher.is_finished());
            assert!(outputs.iter().all(MessageQueue::is_empty));

            inputs[1].insert(item(2, Category::News, 0));
            inputs[1].insert(Envelope::Done);
            let stats = dispatcher.join().unwrap();
            assert_eq!(stats.routed, [0, 1, 0]);
            assert!(stats.parks > 0);
        });

        assert_eq!(drain(&outputs[1]), vec![item(2, Category::News, 0), Envelope::Done]);
    }

    #[test]
    fn stalls_on_full_category_queue_without_dropping() {
        let inputs = queues(1, 8);
        let outputs = queues(3, 1);
        for seq in 0..5 {
            inputs[0].insert(item(1, Category::Sports, seq));
        }
        inputs[0].insert(Envelope::Done);

        std::thread::scope(|s| {
            let dispatcher =
                s.spawn(|| Dispatcher::new(&inputs, [&outputs[0], &outputs[1], &outputs[2]]).run());

            std::thread::sleep(std::time::Duration::from_millis(50));
            assert!(!dispatcher.is_finished());
            assert_eq!(outputs[0].len(), 1);

            let mut seqs = Vec::new();
            while let Envelope::Item(m) = outputs[0].remove() {
                seqs.push(m.headline().unwrap().sequence);
            }
            assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
            assert_eq!(dispatcher.join().unwrap().dropped, 0);
        });
    }
}
