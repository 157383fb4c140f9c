pub mod category;
pub mod message;
pub use category::{Category, ParseCategoryError};
pub use message::{Headline, Message};

// every queue in the pipeline carries envelopes, never bare payloads:
// the end of a stream is a variant, not a reserved string that a payload
// could accidentally spell

/// Item flowing through a bounded queue. `Done` is the last value a writer
/// puts on a given stream; nothing from that writer follows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Envelope<T> {
    Item(T),
    Done,
}

impl<T> Envelope<T> {
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, Envelope::Done)
    }

    /// Returns the payload, or `None` for the end-of-stream marker.
    #[inline]
    pub fn into_item(self) -> Option<T> {
        match self {
            Envelope::Item(item) => Some(item),
            Envelope::Done => None,
        }
    }
}

impl<T> From<T> for Envelope<T> {
    fn from(item: T) -> Self {
        Envelope::Item(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_is_distinct_from_any_payload() {
        let done: Envelope<Message> = Envelope::Done;
        let looks_like_done = Envelope::Item(Message::from_text("DONE"));

        assert!(done.is_done());
        assert!(!looks_like_done.is_done());
        assert_eq!(looks_like_done.into_item().unwrap().as_str(), "DONE");
        assert_eq!(done.into_item(), None);
    }
}
