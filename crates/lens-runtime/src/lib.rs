//! Runtime layer for history-lens.
//!
//! Runs the independent analysis branches concurrently on a tokio runtime.

pub mod orchestrator;

pub use lens_core as core;
pub use lens_data as data;
pub use orchestrator::AnalysisOrchestrator;
