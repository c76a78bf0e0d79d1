//! Pass/fail transition classification.

use serde::Serialize;

/// Which report a (package, arch) pair lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// No transition across the pass/fail boundary.
    NoNews,
    /// Previously failing, now passing.
    GoodNews,
    /// Previously passing, now failing.
    BadNews,
}

impl Classification {
    pub const ALL: [Self; 3] = [Self::NoNews, Self::GoodNews, Self::BadNews];

    /// Report file prefix, e.g. `bad_news`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoNews => "no_news",
            Self::GoodNews => "good_news",
            Self::BadNews => "bad_news",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a before/after pair of exit codes. Only zero counts as a pass.
pub fn classify(before: i64, after: i64) -> Classification {
    match (before == 0, after == 0) {
        (true, false) => Classification::BadNews,
        (false, true) => Classification::GoodNews,
        _ => Classification::NoNews,
    }
}
