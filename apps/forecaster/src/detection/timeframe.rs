//! Future-timeframe filter: decides whether text plausibly refers to a future event.
//!
//! Two variants:
//! - `is_future` (loose): used for search-result snippets.
//! - `is_future_strict`: used for ingested posts.
//!
//! Known imprecision, kept on purpose: the loose keyword "in " matches any text
//! containing "in " anywhere, so almost every English sentence passes.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound of the year range treated as "future".
pub const MAX_FUTURE_YEAR: i32 = 2199;

/// Relative-time keywords for the loose variant. Matched as lower-case substrings.
pub const FUTURE_KEYWORDS: &[&str] = &[
    "next week",
    "next month",
    "upcoming",
    "scheduled",
    "in ",
    "later this year",
];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").expect("valid year regex"));

static SCHEDULE_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(upcoming|scheduled|\d{4})\b").expect("valid schedule regex")
});

static ORDINAL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bon \d{1,2}[a-z]{2} (january|february|march|april|may|june|july|august|september|october|november|december)\b",
    )
    .expect("valid ordinal date regex")
});

/// Which filter variant a source's documents go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStrictness {
    Loose,
    Strict,
}

/// Filter bound to the current year. Build one per run from the injected date.
#[derive(Debug, Clone, Copy)]
pub struct TimeframeFilter {
    current_year: i32,
}

impl TimeframeFilter {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            current_year: today.year(),
        }
    }

    pub fn accepts(&self, strictness: FilterStrictness, text: &str) -> bool {
        match strictness {
            FilterStrictness::Loose => self.is_future(text),
            FilterStrictness::Strict => self.is_future_strict(text),
        }
    }

    /// Loose variant: a year in `[current_year, 2199]` or any relative-time keyword.
    pub fn is_future(&self, text: &str) -> bool {
        if self.has_future_year(text) {
            return true;
        }
        let lower = text.to_lowercase();
        FUTURE_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }

    /// Strict variant: "upcoming", "scheduled" or the current year as whole words,
    /// or an ordinal date such as "on 3rd january".
    pub fn is_future_strict(&self, text: &str) -> bool {
        let lower = text.to_lowercase();

        let has_schedule_word = SCHEDULE_WORD_RE.captures_iter(&lower).any(|caps| {
            let word = &caps[1];
            match word.parse::<i32>() {
                Ok(year) => year == self.current_year,
                Err(_) => true,
            }
        });

        has_schedule_word || ORDINAL_DATE_RE.is_match(&lower)
    }

    /// Advisory check on a synthesized question: does it still read as future-oriented?
    /// Only used for logging; it never rejects a record.
    pub fn mentions_future(&self, question: &str) -> bool {
        let lower = question.to_lowercase();
        self.has_future_year(question) || lower.contains("next") || lower.contains("upcoming")
    }

    fn has_future_year(&self, text: &str) -> bool {
        YEAR_RE.captures_iter(text).any(|caps| {
            caps[1]
                .parse::<i32>()
                .map(|year| (self.current_year..=MAX_FUTURE_YEAR).contains(&year))
                .unwrap_or(false)
        })
    }
}
