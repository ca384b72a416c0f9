//! Concurrent analysis orchestrator.
//!
//! Normalizes and segments on the caller, then runs the independent branches
//! (count tables, time statistics, graph) as blocking tasks on the tokio
//! runtime and joins them into the same [`AnalysisResult`] the sequential
//! pipeline produces.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use lens_core::error::{LensError, Result};
use lens_core::models::{HistoryRecord, Session};
use lens_data::aggregator::HistoryAggregator;
use lens_data::analysis::{AnalysisOptions, AnalysisResult, StageTimings};
use lens_data::normalizer::normalize;
use lens_data::reader::load_records;
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

// ── AnalysisOrchestrator ──────────────────────────────────────────────────────

/// Runs the analysis pipeline with its independent branches in parallel.
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    options: Arc<AnalysisOptions>,
}

impl AnalysisOrchestrator {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    /// Read history from `path` on the blocking pool.
    pub async fn load(&self, path: PathBuf) -> Result<Vec<HistoryRecord>> {
        tokio::task::spawn_blocking(move || load_records(&path))
            .await
            .map_err(task_error)?
    }

    /// Analyze `records`.
    ///
    /// Fails only when a branch task panics or is cancelled.
    pub async fn run(&self, records: Vec<HistoryRecord>) -> Result<AnalysisResult> {
        let mut timings = StageTimings::default();

        let start = Instant::now();
        let history = normalize(&records);
        timings.normalize = start.elapsed().as_secs_f64();

        let start = Instant::now();
        let sessions = self.options.segmenter().segment(&history.events);
        timings.segment = start.elapsed().as_secs_f64();
        drop(history);

        let records = Arc::new(records);
        let sessions = Arc::new(sessions);

        let counts_branch = {
            let records = Arc::clone(&records);
            timed(move || HistoryAggregator::count_tables(&records))
        };
        let time_branch = {
            let sessions = Arc::clone(&sessions);
            let aggregator = self.options.aggregator();
            timed(move || aggregator.time_stats(&sessions))
        };
        let graph_branch = {
            let records = Arc::clone(&records);
            let sessions = Arc::clone(&sessions);
            let builder = self.options.graph_builder();
            timed(move || builder.build(&records, &sessions))
        };

        let ((counts, counts_secs), (time_stats, time_secs), (graph, graph_secs)) = tokio::try_join!(
            join(counts_branch),
            join(time_branch),
            join(graph_branch)
        )?;

        timings.aggregate = counts_secs.max(time_secs);
        timings.graph = graph_secs;
        let summary = self.options.aggregator().assemble(counts, time_stats);

        debug!(
            "AnalysisOrchestrator: {} records, {} sessions, {} nodes, {} edges",
            records.len(),
            sessions.len(),
            graph.nodes.len(),
            graph.edges.len()
        );

        let sessions: Vec<Session> =
            Arc::try_unwrap(sessions).unwrap_or_else(|shared| shared.as_ref().clone());
        Ok(AnalysisResult::from_parts(
            records.len(),
            summary,
            graph,
            sessions,
            timings,
        ))
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Spawn `f` on the blocking pool, measuring its wall-clock time.
fn timed<T, F>(f: F) -> JoinHandle<(T, f64)>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        let out = f();
        (out, start.elapsed().as_secs_f64())
    })
}

async fn join<T>(handle: JoinHandle<T>) -> Result<T> {
    handle.await.map_err(task_error)
}

fn task_error(err: JoinError) -> LensError {
    if err.is_panic() {
        LensError::Task("analysis branch panicked".to_string())
    } else {
        LensError::Task(err.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
