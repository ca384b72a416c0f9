//! Data layer for history-lens.
//!
//! Loads history exports, turns records into sessions, aggregates statistics,
//! builds the host relationship graph and runs the sequential analysis
//! pipeline.

pub mod aggregator;
pub mod analysis;
pub mod graph_builder;
pub mod normalizer;
pub mod reader;
pub mod search;
pub mod segmenter;

pub use analysis::{analyze_history, AnalysisOptions, AnalysisResult};
pub use lens_core as core;
