//! History aggregation: frequency tables, session and day statistics, the
//! hour-of-day histogram and ranked lists.
//!
//! Count-based metrics are taken over the raw records; time-based metrics over
//! the sessionized events. The two halves are independent and can be computed
//! on different threads, then combined with [`HistoryAggregator::assemble`].

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use lens_core::formatting::share_percent;
use lens_core::models::{HistoryRecord, Session};
use lens_core::time_utils::LocalClock;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Default length of the host ranking.
pub const DEFAULT_TOP_N: usize = 10;

// ── FrequencyTable ────────────────────────────────────────────────────────────

/// Key → count table that remembers first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `key`.
    pub fn increment(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.order
            .iter()
            .map(move |k| (k.as_str(), self.counts.get(k).copied().unwrap_or(0)))
    }

    /// Entries sorted descending by count; ties keep first-encounter order.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, count) in self.iter() {
            map.serialize_entry(key, &count)?;
        }
        map.end()
    }
}

// ── Summary types ─────────────────────────────────────────────────────────────

/// One row of a ranked list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCount {
    pub key: String,
    pub count: u64,
    /// `round(count / total_records * 100)`.
    pub share_percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayStats {
    pub active_days: usize,
    pub avg_per_day: u64,
    pub busiest_day: Option<DayCount>,
    pub quietest_day: Option<DayCount>,
    /// Every active day in first-encounter order.
    pub per_day: Vec<DayCount>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub session_count: usize,
    pub avg_session_size: u64,
    pub max_session_size: usize,
}

/// One hour-of-day bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourBucket {
    pub hour: u32,
    pub count: u64,
    /// Percentage of the tallest bucket (0–100).
    pub height: f64,
}

/// Count-based half of the summary.
#[derive(Debug, Clone, Default)]
pub struct CountTables {
    pub total_records: usize,
    pub host_counts: FrequencyTable,
    pub topic_counts: FrequencyTable,
}

/// Time-based half of the summary.
#[derive(Debug, Clone, Default)]
pub struct TimeStats {
    pub timed_events: usize,
    pub time_range: Option<TimeRange>,
    pub session_stats: SessionStats,
    pub day_stats: DayStats,
    pub hourly: Vec<HourBucket>,
}

/// Everything the overview screen displays.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySummary {
    pub total_records: usize,
    pub timed_events: usize,
    pub unique_hosts: usize,
    pub unique_topics: usize,
    pub host_counts: FrequencyTable,
    pub topic_counts: FrequencyTable,
    pub time_range: Option<TimeRange>,
    pub session_stats: SessionStats,
    pub day_stats: DayStats,
    pub hourly: Vec<HourBucket>,
    pub top_hosts: Vec<RankedCount>,
    pub top_topics: Vec<RankedCount>,
}

// ── HistoryAggregator ─────────────────────────────────────────────────────────

/// Computes a [`HistorySummary`] from records and sessions.
#[derive(Debug, Clone, Copy)]
pub struct HistoryAggregator {
    clock: LocalClock,
    top_n: usize,
}

impl Default for HistoryAggregator {
    fn default() -> Self {
        Self::new(LocalClock::default(), DEFAULT_TOP_N)
    }
}

impl HistoryAggregator {
    pub fn new(clock: LocalClock, top_n: usize) -> Self {
        Self { clock, top_n }
    }

    /// Full summary in one call.
    pub fn summarize(&self, records: &[HistoryRecord], sessions: &[Session]) -> HistorySummary {
        self.assemble(Self::count_tables(records), self.time_stats(sessions))
    }

    /// Host and topic tallies over every record, timed or not.
    ///
    /// Records without a host do not enter the host table; every record
    /// enters the topic table (missing topics count as `"other"`).
    pub fn count_tables(records: &[HistoryRecord]) -> CountTables {
        let mut host_counts = FrequencyTable::new();
        let mut topic_counts = FrequencyTable::new();

        for record in records {
            if let Some(host) = record.host() {
                host_counts.increment(host);
            }
            topic_counts.increment(record.topic());
        }

        CountTables {
            total_records: records.len(),
            host_counts,
            topic_counts,
        }
    }

    /// Time range, session, day and hour statistics over the sessions.
    pub fn time_stats(&self, sessions: &[Session]) -> TimeStats {
        TimeStats {
            timed_events: sessions.iter().map(Session::len).sum(),
            time_range: Self::time_range(sessions),
            session_stats: Self::session_stats(sessions),
            day_stats: self.day_stats(sessions),
            hourly: self.hourly_histogram(sessions),
        }
    }

    /// Combine the two halves and derive the ranked lists.
    pub fn assemble(&self, counts: CountTables, time: TimeStats) -> HistorySummary {
        let total = counts.total_records as u64;
        let top_hosts = rank(&counts.host_counts, total, Some(self.top_n));
        let top_topics = rank(&counts.topic_counts, total, None);

        HistorySummary {
            total_records: counts.total_records,
            timed_events: time.timed_events,
            unique_hosts: counts.host_counts.len(),
            unique_topics: counts.topic_counts.len(),
            host_counts: counts.host_counts,
            topic_counts: counts.topic_counts,
            time_range: time.time_range,
            session_stats: time.session_stats,
            day_stats: time.day_stats,
            hourly: time.hourly,
            top_hosts,
            top_topics,
        }
    }

    // ── Time-based metrics ───────────────────────────────────────────────────

    pub fn time_range(sessions: &[Session]) -> Option<TimeRange> {
        let start = sessions.first().and_then(Session::start)?;
        let end = sessions.last().and_then(Session::end)?;
        Some(TimeRange { start, end })
    }

    pub fn session_stats(sessions: &[Session]) -> SessionStats {
        if sessions.is_empty() {
            return SessionStats::default();
        }
        let total: usize = sessions.iter().map(Session::len).sum();
        SessionStats {
            session_count: sessions.len(),
            avg_session_size: (total as f64 / sessions.len() as f64).round() as u64,
            max_session_size: sessions.iter().map(Session::len).max().unwrap_or(0),
        }
    }

    /// Per-day counts keyed by local calendar date.
    pub fn day_stats(&self, sessions: &[Session]) -> DayStats {
        let mut per_day: Vec<DayCount> = Vec::new();
        let mut index: HashMap<NaiveDate, usize> = HashMap::new();

        for event in sessions.iter().flat_map(|s| s.events.iter()) {
            let date = self.clock.local_date(event.timestamp);
            match index.get(&date) {
                Some(&i) => per_day[i].count += 1,
                None => {
                    index.insert(date, per_day.len());
                    per_day.push(DayCount { date, count: 1 });
                }
            }
        }

        if per_day.is_empty() {
            return DayStats::default();
        }

        let total: u64 = per_day.iter().map(|d| d.count).sum();
        let active_days = per_day.len();

        // Strict comparisons: the first day reaching the extreme wins.
        let mut busiest = per_day[0];
        let mut quietest = per_day[0];
        for day in &per_day[1..] {
            if day.count > busiest.count {
                busiest = *day;
            }
            if day.count < quietest.count {
                quietest = *day;
            }
        }

        DayStats {
            active_days,
            avg_per_day: (total as f64 / active_days as f64).round() as u64,
            busiest_day: Some(busiest),
            quietest_day: Some(quietest),
            per_day,
        }
    }

    /// 24 buckets of local hour-of-day, heights relative to the tallest.
    pub fn hourly_histogram(&self, sessions: &[Session]) -> Vec<HourBucket> {
        let mut counts = [0u64; 24];
        for event in sessions.iter().flat_map(|s| s.events.iter()) {
            let hour = self.clock.local_hour(event.timestamp) as usize;
            if let Some(slot) = counts.get_mut(hour) {
                *slot += 1;
            }
        }

        let max = counts.iter().copied().max().unwrap_or(0);
        counts
            .iter()
            .enumerate()
            .map(|(hour, &count)| HourBucket {
                hour: hour as u32,
                count,
                height: if max == 0 {
                    0.0
                } else {
                    count as f64 / max as f64 * 100.0
                },
            })
            .collect()
    }
}

/// Ranked rows of `table`, optionally truncated to `limit`.
fn rank(table: &FrequencyTable, total: u64, limit: Option<usize>) -> Vec<RankedCount> {
    let ranked = table.ranked();
    let take = limit.unwrap_or(ranked.len());
    ranked
        .into_iter()
        .take(take)
        .map(|(key, count)| RankedCount {
            key: key.to_string(),
            count,
            share_percent: share_percent(count, total),
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
