//! Shared types for history-lens.
//!
//! Record, event and session models, the graph data model, the topic palette,
//! configuration, timezone helpers and the error type used by every other
//! crate in the workspace.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod graph;
pub mod models;
pub mod palette;
pub mod settings;
pub mod time_utils;

pub use error::{LensError, Result};
