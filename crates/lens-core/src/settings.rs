use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Browsing-history analytics and host relationship graph
#[derive(Parser, Debug, Clone)]
#[command(
    name = "history-lens",
    about = "Browsing-history analytics and host relationship graph",
    version
)]
pub struct Settings {
    /// History file (.json or .jsonl) or a directory containing them
    pub input: Option<PathBuf>,

    /// View mode
    #[arg(long, default_value = "summary", value_parser = ["summary", "graph", "history", "json"])]
    pub view: String,

    /// Timezone for day and hour grouping (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Hour label format
    #[arg(long, default_value = "auto", value_parser = ["12h", "24h", "auto"])]
    pub time_format: String,

    /// Number of hosts listed in the ranking
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub top_n: u32,

    /// Only list records whose host, URL or title contains this text (history view)
    #[arg(long)]
    pub filter: Option<String>,

    /// Maximum number of rows printed by the history and graph views
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Node id whose neighborhood the graph view prints (e.g. "github.com", "topic:tech")
    #[arg(long)]
    pub node: Option<String>,

    /// JSON file mapping topic -> color, replacing the built-in palette
    #[arg(long)]
    pub palette: Option<PathBuf>,

    /// Percentage of co-visitation edges kept after pruning (1-100)
    #[arg(long, default_value = "80", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub keep_percent: u32,

    /// Weight of hub-membership edges
    #[arg(long, default_value = "4")]
    pub hub_edge_weight: u32,

    /// Weight of hub-ring edges
    #[arg(long, default_value = "1")]
    pub ring_edge_weight: u32,

    /// Cap applied to co-visitation edge weights
    #[arg(long, default_value = "12", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_edge_weight: u32,

    /// Only pair up this many hosts (most visited first) in a session; unlimited when unset
    #[arg(long, value_parser = clap::value_parser!(u64).range(2..))]
    pub max_hosts_per_session: Option<u64>,

    /// Run the pipeline on the current thread instead of parallel branches
    #[arg(long)]
    pub sequential: bool,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.history-lens/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
}

impl LastUsedParams {
    /// Default path of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".history-lens").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with an explicit argument
    /// list and config path so tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        // clap stores the arg id under the field name, not the flag spelling.
        if !is_arg_explicitly_set(&matches, "time_format") {
            if let Some(v) = last.time_format {
                settings.time_format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top_n") {
            if let Some(v) = last.top_n {
                settings.top_n = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Whether hour labels use the 12-hour clock. Valid after `"auto"` resolution.
    pub fn twelve_hour(&self) -> bool {
        crate::time_utils::detect_time_format(Some(&self.timezone), Some(&self.time_format))
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.time_format == "auto" {
            let is_12h = crate::time_utils::detect_time_format(Some(&settings.timezone), None);
            settings.time_format = if is_12h {
                "12h".to_string()
            } else {
                "24h".to_string()
            };
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            timezone: Some(s.timezone.clone()),
            time_format: Some(s.time_format.clone()),
            top_n: Some(s.top_n),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    // ── LastUsedParams ───────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            view: Some("graph".to_string()),
            timezone: Some("Europe/Berlin".to_string()),
            time_format: Some("24h".to_string()),
            top_n: Some(25),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.view, Some("graph".to_string()));
        assert_eq!(loaded.timezone, Some("Europe/Berlin".to_string()));
        assert_eq!(loaded.time_format, Some("24h".to_string()));
        assert_eq!(loaded.top_n, Some(25));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            view: Some("json".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).view.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        assert!(LastUsedParams::load_from(&path).timezone.is_none());
    }

    // ── CLI parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["history-lens"]);
        assert!(settings.input.is_none());
        assert_eq!(settings.view, "summary");
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.time_format, "auto");
        assert_eq!(settings.top_n, 10);
        assert_eq!(settings.limit, 20);
        assert_eq!(settings.keep_percent, 80);
        assert_eq!(settings.hub_edge_weight, 4);
        assert_eq!(settings.ring_edge_weight, 1);
        assert_eq!(settings.max_edge_weight, 12);
        assert!(settings.max_hosts_per_session.is_none());
        assert!(!settings.sequential);
        assert_eq!(settings.log_level, "WARNING");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_input_and_view() {
        let settings =
            Settings::parse_from(["history-lens", "history.jsonl", "--view", "graph", "--node", "topic:tech"]);
        assert_eq!(settings.input, Some(PathBuf::from("history.jsonl")));
        assert_eq!(settings.view, "graph");
        assert_eq!(settings.node.as_deref(), Some("topic:tech"));
    }

    #[test]
    fn test_settings_rejects_bad_keep_percent() {
        let result = Settings::try_parse_from(["history-lens", "--keep-percent", "0"]);
        assert!(result.is_err());
    }

    // ── load_with_last_used ──────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            view: Some("graph".to_string()),
            timezone: Some("UTC".to_string()),
            time_format: Some("24h".to_string()),
            top_n: Some(3),
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["history-lens".into()], &config_path);
        assert_eq!(settings.view, "graph");
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.top_n, 3);
        assert!(!settings.twelve_hour());
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            view: Some("graph".to_string()),
            timezone: Some("UTC".to_string()),
            time_format: Some("24h".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["history-lens".into(), "--view".into(), "json".into()],
            &config_path,
        );
        assert_eq!(settings.view, "json");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            view: Some("history".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["history-lens".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        let settings = Settings::load_with_last_used_impl(
            vec!["history-lens".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::load_with_last_used_impl(
            vec![
                "history-lens".into(),
                "--timezone".into(),
                "Asia/Tokyo".into(),
                "--top-n".into(),
                "7".into(),
            ],
            &config_path,
        );

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.timezone, Some("Asia/Tokyo".to_string()));
        assert_eq!(loaded.top_n, Some(7));
        // "auto" time format is resolved before persisting.
        assert_eq!(loaded.time_format, Some("24h".to_string()));
    }
}
