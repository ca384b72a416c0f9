//! Free-text filtering of history records.

use lens_core::models::HistoryRecord;
use regex::{Regex, RegexBuilder};

/// Case-insensitive substring match over host, URL and title.
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    pattern: Option<Regex>,
}

impl HistoryFilter {
    /// A filter for `query`. Blank queries match every record.
    pub fn new(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            return Self { pattern: None };
        }
        // An escaped literal always compiles.
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .ok();
        Self { pattern }
    }

    pub fn matches(&self, record: &HistoryRecord) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        [record.host(), record.url.as_deref(), record.title.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| pattern.is_match(field))
    }

    /// Matching records in input order.
    pub fn filter<'a>(&self, records: &'a [HistoryRecord]) -> Vec<&'a HistoryRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// The first `limit` matches.
    pub fn preview<'a>(&self, records: &'a [HistoryRecord], limit: usize) -> Vec<&'a HistoryRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .take(limit)
            .collect()
    }
}
