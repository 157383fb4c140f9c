use crate::category::Category;
use std::fmt;

/// Text payload produced by a producer, e.g. `Producer 2 NEWS 7`.
///
/// Immutable once built. Stages route on the category token inside the text,
/// so a message can be handed downstream without any side-channel metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    text: Box<str>,
}

/// Fields of a well-formed message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Headline {
    pub producer_id: u32,
    pub category: Category,
    pub sequence: u64,
}

impl Message {
    pub fn new(producer_id: u32, category: Category, sequence: u64) -> Self {
        Self {
            text: format!("Producer {producer_id} {category} {sequence}").into_boxed_str(),
        }
    }

    /// Wraps arbitrary text. Nothing is validated; routing decides later
    /// whether the text carries a known category.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into().into_boxed_str(),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Category token (third word) parsed exactly, `None` if absent or unknown.
    pub fn category(&self) -> Option<Category> {
        self.text.split_whitespace().nth(2)?.parse().ok()
    }

    pub fn headline(&self) -> Option<Headline> {
        let mut words = self.text.split_whitespace();
        if words.next()? != "Producer" {
            return None;
        }
        let producer_id = words.next()?.parse().ok()?;
        let category = words.next()?.parse().ok()?;
        let sequence = words.next()?.parse().ok()?;
        if words.next().is_some() {
            return None;
        }
        Some(Headline {
            producer_id,
            category,
            sequence,
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
