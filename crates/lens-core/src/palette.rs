//! Topic → color palette used to paint graph nodes and edges.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};
use crate::models::OTHER_TOPIC;

/// Built-in palette, one entry per topic the classifier can emit.
pub const DEFAULT_TOPIC_COLORS: &[(&str, &str)] = &[
    ("news", "#ef4444"),
    ("shopping", "#f97316"),
    ("social", "#ec4899"),
    ("video", "#10b981"),
    ("education", "#06b6d4"),
    ("work", "#6366f1"),
    ("finance", "#22c55e"),
    ("travel", "#14b8a6"),
    ("gaming", "#a855f7"),
    ("entertainment", "#d946ef"),
    ("tech", "#3b82f6"),
    ("services", "#8b5cf6"),
    ("health", "#84cc16"),
    ("government", "#eab308"),
    ("other", "#94a3b8"),
];

/// Color used for `"other"` when a custom palette does not define it.
pub const FALLBACK_COLOR: &str = "#94a3b8";

/// Immutable topic → color mapping with an `"other"` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPalette {
    colors: BTreeMap<String, String>,
}

impl Default for TopicPalette {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_TOPIC_COLORS.iter().copied())
    }
}

impl TopicPalette {
    /// Build a palette from `(topic, color)` pairs. Later pairs win.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            colors: pairs
                .into_iter()
                .map(|(t, c)| (t.to_string(), c.to_string()))
                .collect(),
        }
    }

    /// Load a palette from a JSON object file (`{"news": "#ff0000", ...}`).
    ///
    /// The file replaces the built-in palette entirely.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LensError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let object = value.as_object().ok_or_else(|| {
            LensError::Config(format!(
                "palette {} must be a JSON object of topic -> color",
                path.display()
            ))
        })?;

        let mut colors = BTreeMap::new();
        for (topic, color) in object {
            let color = color.as_str().ok_or_else(|| {
                LensError::Config(format!("palette color for \"{}\" must be a string", topic))
            })?;
            colors.insert(topic.clone(), color.to_string());
        }
        Ok(Self { colors })
    }

    /// Color for `topic`; unknown topics use the `"other"` entry.
    pub fn color_for(&self, topic: &str) -> &str {
        self.colors
            .get(topic)
            .or_else(|| self.colors.get(OTHER_TOPIC))
            .map(String::as_str)
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Number of explicitly mapped topics.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
