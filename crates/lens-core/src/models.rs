use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::data_processors::{lenient_f64, non_empty_string, TimestampProcessor};

// ── Shared constants ──────────────────────────────────────────────────────────

/// Maximum inactivity between two consecutive events of the same session.
///
/// Shared by the session statistics and the co-visitation edges so the two
/// can never disagree about where a session ends.
pub const SESSION_GAP_MS: i64 = 30 * 60 * 1000;

/// 1990-01-01T00:00:00Z in milliseconds. Anything earlier is a bad clock.
pub const MIN_PLAUSIBLE_TIMESTAMP_MS: i64 = 631_152_000_000;

/// Topic used when a record carries no prediction.
pub const OTHER_TOPIC: &str = "other";

/// Prefix of topic hub node ids (`"topic:news"`).
pub const HUB_ID_PREFIX: &str = "topic:";

/// The session gap as a [`TimeDelta`].
pub fn session_gap() -> TimeDelta {
    TimeDelta::milliseconds(SESSION_GAP_MS)
}

/// Node id of the hub for `topic`.
pub fn hub_id(topic: &str) -> String {
    format!("{}{}", HUB_ID_PREFIX, topic)
}

// ── HistoryRecord ─────────────────────────────────────────────────────────────

/// One browsing-history row as delivered by the ingestion layer.
///
/// Every field is optional and decoded leniently: a malformed value is
/// treated as missing instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Host name of the visited page, e.g. `"news.ycombinator.com"`.
    #[serde(
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub host: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    /// Visit time in microseconds since the Unix epoch.
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_usec: Option<f64>,
    /// Visit time in milliseconds since the Unix epoch.
    #[serde(
        default,
        rename = "time",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_ms: Option<f64>,
    /// Topic assigned by the classifier.
    #[serde(
        default,
        rename = "pred_topic",
        alias = "predicted_topic",
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub predicted_topic: Option<String>,
    /// Classifier confidence for `predicted_topic`, in `[0, 1]`.
    #[serde(
        default,
        rename = "pred_prob",
        alias = "predicted_probability",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub predicted_probability: Option<f64>,
}

impl HistoryRecord {
    /// A record for `host` with every other field absent.
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            host: (!host.is_empty()).then_some(host),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>, probability: f64) -> Self {
        self.predicted_topic = Some(topic.into());
        self.predicted_probability = Some(probability);
        self
    }

    pub fn with_time_usec(mut self, micros: i64) -> Self {
        self.time_usec = Some(micros as f64);
        self
    }

    pub fn with_time_ms(mut self, millis: i64) -> Self {
        self.time_ms = Some(millis as f64);
        self
    }

    /// The host, if present and non-empty.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref().filter(|h| !h.is_empty())
    }

    /// The predicted topic, defaulting to [`OTHER_TOPIC`].
    pub fn topic(&self) -> &str {
        self.predicted_topic
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(OTHER_TOPIC)
    }

    /// The prediction confidence, defaulting to `0`.
    pub fn probability(&self) -> f64 {
        self.predicted_probability.unwrap_or(0.0)
    }

    /// The plausible visit time, or `None` when absent or before 1990.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        TimestampProcessor::resolve(self.time_usec, self.time_ms)
    }

    /// Title for listings: title, then URL, then a placeholder.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or("(no title)")
    }
}

// ── NormalizedEvent ───────────────────────────────────────────────────────────

/// A record that carries both a host and a plausible timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub host: String,
    pub timestamp: DateTime<Utc>,
    pub topic: String,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Index of the source record in the input collection.
    pub position: usize,
}

impl NormalizedEvent {
    /// Milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// A maximal run of events with no internal gap above [`SESSION_GAP_MS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// 1-based position within one segmentation pass.
    pub index: usize,
    pub events: Vec<NormalizedEvent>,
}

impl Session {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(|e| e.timestamp)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Distinct hosts of the session, sorted for a canonical pair order.
    pub fn distinct_hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.events.iter().map(|e| e.host.as_str()).collect();
        hosts.sort_unstable();
        hosts.dedup();
        hosts
    }

    /// Largest gap between two consecutive events (zero for < 2 events).
    pub fn max_internal_gap(&self) -> TimeDelta {
        self.events
            .windows(2)
            .map(|w| w[1].timestamp - w[0].timestamp)
            .max()
            .unwrap_or_else(TimeDelta::zero)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
