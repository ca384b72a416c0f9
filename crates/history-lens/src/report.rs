//! Plain-text rendering of analysis results.

use chrono::{DateTime, Utc};
use lens_core::formatting::{format_bar, format_count, truncate_label};
use lens_core::graph::{EdgeKind, GraphNode, HistoryGraph};
use lens_core::models::HistoryRecord;
use lens_core::time_utils::{format_hour_label, LocalClock};
use lens_data::aggregator::{HistorySummary, RankedCount};
use lens_data::analysis::AnalysisResult;
use lens_data::search::HistoryFilter;

const BAR_WIDTH: usize = 30;
const KEY_WIDTH: usize = 32;

fn local_time(clock: &LocalClock, dt: DateTime<Utc>) -> String {
    dt.with_timezone(&clock.tz())
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

// ── Summary view ───────────────────────────────────────────────────────────────

pub fn render_summary(summary: &HistorySummary, clock: &LocalClock, twelve_hour: bool) -> String {
    let mut out = Vec::new();

    out.push("History overview".to_string());
    out.push(format!("  Records        {:>10}", format_count(summary.total_records as u64)));
    out.push(format!("  Timed events   {:>10}", format_count(summary.timed_events as u64)));
    out.push(format!("  Unique hosts   {:>10}", format_count(summary.unique_hosts as u64)));
    out.push(format!("  Unique topics  {:>10}", format_count(summary.unique_topics as u64)));
    match &summary.time_range {
        Some(range) => out.push(format!(
            "  Time range     {} → {} ({})",
            local_time(clock, range.start),
            local_time(clock, range.end),
            clock.tz()
        )),
        None => out.push("  Time range     n/a".to_string()),
    }

    let sessions = &summary.session_stats;
    out.push(String::new());
    out.push("Sessions".to_string());
    out.push(format!(
        "  Count {}   Avg size {}   Largest {}",
        format_count(sessions.session_count as u64),
        format_count(sessions.avg_session_size),
        format_count(sessions.max_session_size as u64)
    ));

    let days = &summary.day_stats;
    out.push(String::new());
    out.push("Days".to_string());
    out.push(format!(
        "  Active {}   Avg per day {}",
        days.active_days,
        format_count(days.avg_per_day)
    ));
    if let (Some(busiest), Some(quietest)) = (&days.busiest_day, &days.quietest_day) {
        out.push(format!(
            "  Busiest {} ({})   Quietest {} ({})",
            busiest.date,
            format_count(busiest.count),
            quietest.date,
            format_count(quietest.count)
        ));
    }

    out.push(String::new());
    out.push("Top hosts".to_string());
    out.extend(ranked_lines(&summary.top_hosts));

    out.push(String::new());
    out.push("Topics".to_string());
    out.extend(ranked_lines(&summary.top_topics));

    out.push(String::new());
    out.push("Activity by hour".to_string());
    for bucket in &summary.hourly {
        out.push(format!(
            "  {:>5}  {}  {}",
            format_hour_label(bucket.hour, twelve_hour),
            format_bar(bucket.height, BAR_WIDTH),
            format_count(bucket.count)
        ));
    }

    out.join("\n")
}

fn ranked_lines(rows: &[RankedCount]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["  (none)".to_string()];
    }
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            format!(
                "  {:>2}. {:<width$} {:>8} {:>4}%  {}",
                i + 1,
                truncate_label(&row.key, KEY_WIDTH, KEY_WIDTH - 3),
                format_count(row.count),
                row.share_percent,
                format_bar(row.share_percent as f64, BAR_WIDTH / 2),
                width = KEY_WIDTH
            )
        })
        .collect()
}

// ── Graph view ─────────────────────────────────────────────────────────────────

pub fn render_graph(graph: &HistoryGraph, focus: Option<&str>, limit: usize) -> String {
    let mut out = Vec::new();

    let hosts = graph.host_nodes().count();
    let hubs = graph.hub_nodes().count();
    out.push("Graph".to_string());
    out.push(format!(
        "  Nodes {} (hosts {}, hubs {})",
        format_count(graph.nodes.len() as u64),
        format_count(hosts as u64),
        hubs
    ));
    out.push(format!(
        "  Edges {} (session {}, hub {}, ring {})",
        format_count(graph.edges.len() as u64),
        graph.edges_of_kind(EdgeKind::Session).count(),
        graph.edges_of_kind(EdgeKind::Hub).count(),
        graph.edges_of_kind(EdgeKind::Ring).count()
    ));

    out.push(String::new());
    out.push("Topic hubs".to_string());
    if hubs == 0 {
        out.push("  (none)".to_string());
    }
    for hub in graph.hub_nodes() {
        out.push(format!(
            "  {:<16} hosts {:>5}  visits {:>8}  {}",
            hub.label,
            format_count(hub.host_count),
            format_count(hub.request_count),
            hub.color
        ));
    }

    out.push(String::new());
    out.push("Strongest co-visits".to_string());
    let mut session_edges: Vec<_> = graph.edges_of_kind(EdgeKind::Session).collect();
    if session_edges.is_empty() {
        out.push("  (none)".to_string());
    }
    session_edges.sort_by(|a, b| b.weight.cmp(&a.weight));
    for edge in session_edges.into_iter().take(limit) {
        out.push(format!("  {} ↔ {}  weight {}", edge.source, edge.target, edge.weight));
    }

    if let Some(id) = focus {
        out.push(String::new());
        out.extend(neighborhood_lines(graph, id));
    }

    out.join("\n")
}

fn neighborhood_lines(graph: &HistoryGraph, id: &str) -> Vec<String> {
    let Some(node) = graph.node(id) else {
        return vec![format!("No node named \"{}\"", id)];
    };

    let mut out = vec![format!(
        "Neighborhood of {} (degree {})",
        node.label(),
        graph.adjacency.degree(id)
    )];
    for neighbor in graph.adjacency.neighborhood(id).iter().filter(|n| *n != id) {
        let desc = match graph.node(neighbor) {
            Some(GraphNode::Host(h)) => format!("host, {}, {} visits", h.topic, h.visit_count),
            Some(GraphNode::Hub(h)) => format!("hub, {} hosts", h.host_count),
            None => "unknown".to_string(),
        };
        out.push(format!("  - {} ({})", neighbor, desc));
    }
    let highlighted = graph
        .edges
        .iter()
        .filter(|e| graph.is_edge_highlighted(e, id))
        .count();
    out.push(format!("  Highlighted edges: {}", highlighted));
    out
}

// ── History view ───────────────────────────────────────────────────────────────

pub fn render_history(
    records: &[HistoryRecord],
    query: Option<&str>,
    limit: usize,
    clock: &LocalClock,
) -> String {
    let filter = HistoryFilter::new(query.unwrap_or(""));
    let total_matched = filter.filter(records).len();

    let mut out = vec![match query {
        Some(q) if !q.trim().is_empty() => format!(
            "History: {} of {} records match \"{}\"",
            format_count(total_matched as u64),
            format_count(records.len() as u64),
            q.trim()
        ),
        _ => format!("History: {} records", format_count(records.len() as u64)),
    }];

    for record in filter.preview(records, limit) {
        let when = record
            .timestamp()
            .map(|t| local_time(clock, t))
            .unwrap_or_else(|| "----------------".to_string());
        out.push(format!(
            "  {}  {:<28} {}",
            when,
            truncate_label(record.host().unwrap_or("-"), 28, 25),
            truncate_label(record.display_title(), 60, 57)
        ));
    }
    if total_matched > limit {
        out.push(format!("  … {} more", total_matched - limit));
    }

    out.join("\n")
}

// ── JSON view ──────────────────────────────────────────────────────────────────

pub fn render_json(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lens_data::analysis::{analyze_history, AnalysisOptions};

    fn records() -> Vec<HistoryRecord> {
        let at = |m: i64| {
            Utc.with_ymd_and_hms(2024, 2, 1, 13, 0, 0)
                .unwrap()
                .timestamp_micros()
                + m * 60_000_000
        };
        vec![
            HistoryRecord::new("docs.rs").with_topic("tech", 0.9).with_time_usec(at(0)).with_title("Rust docs"),
            HistoryRecord::new("github.com").with_topic("tech", 0.8).with_time_usec(at(5)),
            HistoryRecord::new("bbc.co.uk").with_topic("news", 0.7).with_time_usec(at(120)),
        ]
    }

    fn analysis() -> AnalysisResult {
        analyze_history(&records(), &AnalysisOptions::default())
    }

    #[test]
    fn test_render_summary_sections() {
        let text = render_summary(&analysis().summary, &LocalClock::default(), false);
        assert!(text.contains("History overview"));
        assert!(text.contains("Top hosts"));
        assert!(text.contains("docs.rs"));
        assert!(text.contains("2024-02-01 13:00"));
        // One row per hour, 24h labels.
        let hour_rows = text
            .lines()
            .filter(|l| l.trim_start().starts_with("23:00"))
            .count();
        assert_eq!(hour_rows, 1);
    }

    #[test]
    fn test_render_summary_twelve_hour_labels() {
        let text = render_summary(&analysis().summary, &LocalClock::default(), true);
        assert!(text.contains("12 AM"));
        assert!(text.contains("1 PM"));
    }

    #[test]
    fn test_render_summary_empty() {
        let empty = analyze_history(&[], &AnalysisOptions::default());
        let text = render_summary(&empty.summary, &LocalClock::default(), false);
        assert!(text.contains("n/a"));
        assert!(text.contains("(none)"));
    }

    #[test]
    fn test_render_graph_counts_and_focus() {
        let result = analysis();
        let text = render_graph(&result.graph, Some("docs.rs"), 5);
        assert!(text.contains("hubs 2"));
        assert!(text.contains("docs.rs ↔ github.com"));
        assert!(text.contains("Neighborhood of docs.rs"));
        assert!(text.contains("topic:tech"));

        let missing = render_graph(&result.graph, Some("nope"), 5);
        assert!(missing.contains("No node named \"nope\""));
    }

    #[test]
    fn test_render_history_filter() {
        let records = records();
        let text = render_history(&records, Some("RUST"), 10, &LocalClock::default());
        assert!(text.contains("1 of 3 records match"));
        assert!(text.contains("Rust docs"));
        assert!(!text.contains("bbc.co.uk"));
    }

    #[test]
    fn test_render_history_limit() {
        let records = records();
        let text = render_history(&records, None, 1, &LocalClock::default());
        assert!(text.contains("History: 3 records"));
        assert!(text.contains("… 2 more"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_render_json_is_valid() {
        let json = render_json(&analysis()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["graph"]["nodes"].is_array());
        assert_eq!(value["summary"]["total_records"], 3);
    }
}
