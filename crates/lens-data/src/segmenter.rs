//! Session segmenter.
//!
//! Splits the ascending event list into sessions: a new session starts when
//! the gap to the previous event exceeds the configured inactivity threshold.

use chrono::TimeDelta;
use lens_core::models::{session_gap, NormalizedEvent, Session};
use tracing::debug;

// ── SessionSegmenter ──────────────────────────────────────────────────────────

/// Gap-based session segmentation.
#[derive(Debug, Clone, Copy)]
pub struct SessionSegmenter {
    /// Largest gap still considered part of the same session.
    gap: TimeDelta,
}

impl Default for SessionSegmenter {
    fn default() -> Self {
        Self::new(session_gap())
    }
}

impl SessionSegmenter {
    pub fn new(gap: TimeDelta) -> Self {
        Self { gap }
    }

    /// Partition `events` (ascending by time) into 1-indexed sessions.
    pub fn segment(&self, events: &[NormalizedEvent]) -> Vec<Session> {
        let mut sessions: Vec<Session> = Vec::new();
        let mut current: Option<Session> = None;

        for event in events {
            let need_new = match &current {
                None => true,
                Some(session) => self.should_start_session(session, event),
            };

            if need_new {
                if let Some(done) = current.take() {
                    sessions.push(done);
                }
                current = Some(Session {
                    index: sessions.len() + 1,
                    events: Vec::new(),
                });
            }

            if let Some(ref mut session) = current {
                session.events.push(event.clone());
            }
        }

        if let Some(done) = current {
            sessions.push(done);
        }

        debug!(
            "SessionSegmenter: {} sessions from {} events",
            sessions.len(),
            events.len()
        );
        sessions
    }

    fn should_start_session(&self, session: &Session, event: &NormalizedEvent) -> bool {
        match session.events.last() {
            Some(last) => (event.timestamp - last.timestamp) > self.gap,
            None => false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
