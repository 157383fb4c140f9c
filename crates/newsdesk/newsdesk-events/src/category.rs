use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Editorial desk a message belongs to. Each category owns one dispatch
/// queue and one co-editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Sports,
    News,
    Weather,
}

impl Category {
    pub const COUNT: usize = 3;

    /// Dispatch order. End-of-stream markers go out to the category queues in
    /// this order too.
    pub const ALL: [Category; Category::COUNT] =
        [Category::Sports, Category::News, Category::Weather];

    /// Wire token as it appears inside a message.
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Sports => "SPORTS",
            Category::News => "NEWS",
            Category::Weather => "WEATHER",
        }
    }

    /// Position in [`Category::ALL`], used to index per-category arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct ParseCategoryError(pub String);

// exact match only: "sports" or "SPORTS!" are not categories
impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}
