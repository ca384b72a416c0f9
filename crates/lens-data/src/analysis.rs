//! Sequential analysis pipeline.
//!
//! Runs normalize → segment → {aggregate, build graph} on one thread and
//! returns an [`AnalysisResult`] ready for the report layer.

use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use lens_core::error::Result;
use lens_core::graph::HistoryGraph;
use lens_core::models::{session_gap, HistoryRecord, Session};
use lens_core::palette::TopicPalette;
use lens_core::settings::Settings;
use lens_core::time_utils::LocalClock;
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{HistoryAggregator, HistorySummary};
use crate::graph_builder::{GraphBuilder, GraphConfig};
use crate::normalizer::normalize;
use crate::segmenter::SessionSegmenter;

// ── Public types ──────────────────────────────────────────────────────────────

/// Inputs of one analysis run besides the records themselves.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Timezone for day grouping and hour-of-day.
    pub clock: LocalClock,
    /// Length of the host ranking.
    pub top_n: usize,
    pub session_gap: TimeDelta,
    pub graph: GraphConfig,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            clock: LocalClock::default(),
            top_n: crate::aggregator::DEFAULT_TOP_N,
            session_gap: session_gap(),
            graph: GraphConfig::default(),
        }
    }
}

impl AnalysisOptions {
    /// Options from the command line. Fails only when `--palette` cannot be
    /// loaded.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let palette = match &settings.palette {
            Some(path) => TopicPalette::from_json_file(path)?,
            None => TopicPalette::default(),
        };

        let graph = GraphConfig {
            max_edge_weight: settings.max_edge_weight,
            hub_edge_weight: settings.hub_edge_weight,
            ring_edge_weight: settings.ring_edge_weight,
            max_hosts_per_session: settings.max_hosts_per_session.map(|n| n as usize),
            ..GraphConfig::default()
        }
        .with_keep_percent(settings.keep_percent)
        .with_palette(palette);

        Ok(Self {
            clock: LocalClock::new(&settings.timezone),
            top_n: settings.top_n as usize,
            session_gap: session_gap(),
            graph,
        })
    }

    pub fn aggregator(&self) -> HistoryAggregator {
        HistoryAggregator::new(self.clock, self.top_n)
    }

    pub fn segmenter(&self) -> SessionSegmenter {
        SessionSegmenter::new(self.session_gap)
    }

    pub fn graph_builder(&self) -> GraphBuilder {
        GraphBuilder::new(self.graph.clone())
    }
}

/// Counts and timings of one run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    pub generated_at: DateTime<Utc>,
    pub records_processed: usize,
    /// Records that entered the time-based structures.
    pub events_timed: usize,
    pub sessions_created: usize,
    pub nodes_created: usize,
    pub edges_created: usize,
    pub normalize_time_seconds: f64,
    pub segment_time_seconds: f64,
    pub aggregate_time_seconds: f64,
    pub graph_time_seconds: f64,
}

/// The complete output of [`analyze_history`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub summary: HistorySummary,
    pub graph: HistoryGraph,
    #[serde(skip)]
    pub sessions: Vec<Session>,
    pub metadata: AnalysisMetadata,
}

/// Wall-clock seconds of each stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub normalize: f64,
    pub segment: f64,
    pub aggregate: f64,
    pub graph: f64,
}

impl AnalysisResult {
    /// Assemble a result and its metadata from finished stage outputs.
    pub fn from_parts(
        records: usize,
        summary: HistorySummary,
        graph: HistoryGraph,
        sessions: Vec<Session>,
        timings: StageTimings,
    ) -> Self {
        let metadata = AnalysisMetadata {
            generated_at: Utc::now(),
            records_processed: records,
            events_timed: sessions.iter().map(Session::len).sum(),
            sessions_created: sessions.len(),
            nodes_created: graph.nodes.len(),
            edges_created: graph.edges.len(),
            normalize_time_seconds: timings.normalize,
            segment_time_seconds: timings.segment,
            aggregate_time_seconds: timings.aggregate,
            graph_time_seconds: timings.graph,
        };
        Self {
            summary,
            graph,
            sessions,
            metadata,
        }
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline on the calling thread.
///
/// 1. Normalize records into time-sorted events.
/// 2. Split the events into sessions.
/// 3. Aggregate counts and time statistics.
/// 4. Build the relationship graph.
pub fn analyze_history(records: &[HistoryRecord], options: &AnalysisOptions) -> AnalysisResult {
    let mut timings = StageTimings::default();

    // ── Step 1: Normalize ─────────────────────────────────────────────────────
    let start = Instant::now();
    let history = normalize(records);
    timings.normalize = start.elapsed().as_secs_f64();

    // ── Step 2: Segment ───────────────────────────────────────────────────────
    let start = Instant::now();
    let sessions = options.segmenter().segment(&history.events);
    timings.segment = start.elapsed().as_secs_f64();

    // ── Step 3: Aggregate ─────────────────────────────────────────────────────
    let start = Instant::now();
    let summary = options.aggregator().summarize(records, &sessions);
    timings.aggregate = start.elapsed().as_secs_f64();

    // ── Step 4: Graph ─────────────────────────────────────────────────────────
    let start = Instant::now();
    let graph = options.graph_builder().build(records, &sessions);
    timings.graph = start.elapsed().as_secs_f64();

    debug!(
        "analyze_history: {} records, {} sessions, {} nodes, {} edges",
        records.len(),
        sessions.len(),
        graph.nodes.len(),
        graph.edges.len()
    );

    AnalysisResult::from_parts(records.len(), summary, graph, sessions, timings)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
