//! Event normalizer.
//!
//! Turns raw [`HistoryRecord`]s into time-sorted [`NormalizedEvent`]s. Records
//! without a host or without a plausible timestamp are left out of the event
//! list but stay available, untouched, for plain counting.

use lens_core::models::{HistoryRecord, NormalizedEvent};
use tracing::debug;

/// Output of [`normalize`]: the untouched records plus the sorted events.
#[derive(Debug, Clone)]
pub struct NormalizedHistory<'a> {
    /// Every input record, in input order.
    pub records: &'a [HistoryRecord],
    /// Records with a host and a plausible timestamp, ascending by time.
    pub events: Vec<NormalizedEvent>,
}

impl NormalizedHistory<'_> {
    /// Records that did not make it into the event list.
    pub fn dropped(&self) -> usize {
        self.records.len() - self.events.len()
    }
}

/// Normalize `records`.
///
/// Ordering is ascending by timestamp; equal timestamps keep input order.
pub fn normalize(records: &[HistoryRecord]) -> NormalizedHistory<'_> {
    let mut events: Vec<NormalizedEvent> = records
        .iter()
        .enumerate()
        .filter_map(|(position, record)| to_event(position, record))
        .collect();

    // Vec::sort_by_key is stable, so ties keep their input order.
    events.sort_by_key(|e| e.timestamp);

    let history = NormalizedHistory { records, events };
    debug!(
        "normalize: {} records -> {} timed events ({} dropped)",
        records.len(),
        history.events.len(),
        history.dropped()
    );
    history
}

fn to_event(position: usize, record: &HistoryRecord) -> Option<NormalizedEvent> {
    let host = record.host()?;
    let timestamp = record.timestamp()?;
    Some(NormalizedEvent {
        host: host.to_string(),
        timestamp,
        topic: record.topic().to_string(),
        probability: record.probability(),
        url: record.url.clone(),
        position,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
