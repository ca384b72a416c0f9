//! Relationship-graph construction.
//!
//! Host nodes come from every record with a host; co-visitation edges come
//! from the sessions. Hubs group hosts by dominant topic and are chained in a
//! ring so the layout keeps topic clusters apart.

use std::collections::HashMap;

use lens_core::formatting::truncate_label;
use lens_core::graph::{
    AdjacencyIndex, EdgeKind, GraphEdge, GraphNode, HistoryGraph, HostNode, HubNode,
};
use lens_core::models::{hub_id, HistoryRecord, Session, OTHER_TOPIC};
use lens_core::palette::TopicPalette;
use tracing::{debug, warn};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Inclusive output range of a radius mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusRange {
    pub min: f64,
    pub max: f64,
}

impl RadiusRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Linear map of `value` from `[lo, hi]` into this range.
    ///
    /// A degenerate input range maps to the midpoint.
    pub fn scale(&self, value: u64, lo: u64, hi: u64) -> f64 {
        if hi <= lo {
            return self.midpoint();
        }
        let t = (value.saturating_sub(lo)) as f64 / (hi - lo) as f64;
        (self.min + t * (self.max - self.min)).clamp(self.min, self.max)
    }
}

pub const DEFAULT_HOST_RADIUS: RadiusRange = RadiusRange::new(12.0, 60.0);
pub const DEFAULT_HUB_RADIUS: RadiusRange = RadiusRange::new(30.0, 80.0);
pub const NEUTRAL_EDGE_COLOR: &str = "#64748b";
pub const RING_EDGE_COLOR: &str = "#334155";

/// Knobs of one graph build.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    pub host_radius: RadiusRange,
    pub hub_radius: RadiusRange,
    /// Host labels longer than this are shortened.
    pub label_max_chars: usize,
    /// Characters kept before the `"..."` of a shortened label.
    pub label_keep_chars: usize,
    /// Upper bound of a session edge's reported weight.
    pub max_edge_weight: u32,
    /// Share of session edges kept after pruning, in percent.
    pub keep_percent: u32,
    pub hub_edge_weight: u32,
    pub ring_edge_weight: u32,
    pub neutral_edge_color: String,
    pub ring_edge_color: String,
    /// When set, sessions with more distinct hosts only pair up this many,
    /// most visited first.
    pub max_hosts_per_session: Option<usize>,
    pub palette: TopicPalette,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            host_radius: DEFAULT_HOST_RADIUS,
            hub_radius: DEFAULT_HUB_RADIUS,
            label_max_chars: 40,
            label_keep_chars: 37,
            max_edge_weight: 12,
            keep_percent: 80,
            hub_edge_weight: 4,
            ring_edge_weight: 1,
            neutral_edge_color: NEUTRAL_EDGE_COLOR.to_string(),
            ring_edge_color: RING_EDGE_COLOR.to_string(),
            max_hosts_per_session: None,
            palette: TopicPalette::default(),
        }
    }
}

impl GraphConfig {
    pub fn with_palette(mut self, palette: TopicPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_keep_percent(mut self, keep_percent: u32) -> Self {
        self.keep_percent = keep_percent.clamp(1, 100);
        self
    }

    /// Number of session edges surviving pruning out of `count`.
    pub fn retained_edge_count(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let pct = self.keep_percent.clamp(1, 100) as usize;
        ((count * pct + 99) / 100).max(1)
    }
}

// ── Aggregates ────────────────────────────────────────────────────────────────

/// Everything known about one host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostAggregate {
    pub host: String,
    pub visit_count: u64,
    pub dominant_topic: String,
    pub max_probability: f64,
    /// Distinct URLs, first-seen order.
    pub urls: Vec<String>,
}

impl HostAggregate {
    fn new(host: &str, topic: &str, probability: f64) -> Self {
        Self {
            host: host.to_string(),
            visit_count: 0,
            dominant_topic: topic.to_string(),
            max_probability: probability,
            urls: Vec::new(),
        }
    }

    fn absorb(&mut self, record: &HistoryRecord) {
        self.visit_count += 1;
        let probability = record.probability();
        // Strictly greater: the first topic reaching the maximum keeps it.
        if probability > self.max_probability {
            self.max_probability = probability;
            self.dominant_topic = record.topic().to_string();
        }
        if let Some(url) = record.url.as_deref() {
            if !self.urls.iter().any(|u| u == url) {
                self.urls.push(url.to_string());
            }
        }
    }
}

/// Hosts grouped under one dominant topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAggregate {
    pub topic: String,
    pub host_count: u64,
    pub request_count: u64,
    /// Member hosts in host first-seen order.
    pub hosts: Vec<String>,
}

/// Fold records into per-host aggregates, first-seen order.
pub fn aggregate_hosts(records: &[HistoryRecord]) -> Vec<HostAggregate> {
    let mut hosts: Vec<HostAggregate> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(host) = record.host() else {
            continue;
        };
        let i = *index.entry(host).or_insert_with(|| {
            hosts.push(HostAggregate::new(
                host,
                record.topic(),
                record.probability(),
            ));
            hosts.len() - 1
        });
        hosts[i].absorb(record);
    }
    hosts
}

/// Group host aggregates by dominant topic, sorted by topic name.
pub fn aggregate_topics(hosts: &[HostAggregate]) -> Vec<TopicAggregate> {
    let mut topics: Vec<TopicAggregate> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for host in hosts {
        let i = *index.entry(host.dominant_topic.as_str()).or_insert_with(|| {
            topics.push(TopicAggregate {
                topic: host.dominant_topic.clone(),
                host_count: 0,
                request_count: 0,
                hosts: Vec::new(),
            });
            topics.len() - 1
        });
        let topic = &mut topics[i];
        topic.host_count += 1;
        topic.request_count += host.visit_count;
        topic.hosts.push(host.host.clone());
    }

    topics.sort_by(|a, b| a.topic.cmp(&b.topic));
    topics
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Builds a [`HistoryGraph`] from records and their sessions.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: GraphConfig,
}

/// A co-visitation pair with its raw accumulated weight.
#[derive(Debug, Clone)]
struct PairWeight {
    a: String,
    b: String,
    weight: u32,
}

impl GraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, records: &[HistoryRecord], sessions: &[Session]) -> HistoryGraph {
        let hosts = aggregate_hosts(records);
        if hosts.is_empty() {
            debug!("GraphBuilder: no hosts, returning empty graph");
            return HistoryGraph::default();
        }
        let topics = aggregate_topics(&hosts);
        let dominant: HashMap<&str, &str> = hosts
            .iter()
            .map(|h| (h.host.as_str(), h.dominant_topic.as_str()))
            .collect();

        let mut nodes = self.hub_nodes(&topics);
        nodes.extend(self.host_nodes(&hosts));

        let mut adjacency = AdjacencyIndex::new();
        let mut edges = self.session_edges(sessions, &dominant);
        edges.extend(self.hub_edges(&topics));
        edges.extend(self.ring_edges(&topics));
        for edge in &edges {
            adjacency.connect(&edge.source, &edge.target);
        }

        debug!(
            "GraphBuilder: {} nodes ({} hosts, {} hubs), {} edges",
            nodes.len(),
            hosts.len(),
            nodes.len() - hosts.len(),
            edges.len()
        );

        HistoryGraph {
            nodes,
            edges,
            adjacency,
        }
    }

    // ── Nodes ────────────────────────────────────────────────────────────────

    fn host_nodes(&self, hosts: &[HostAggregate]) -> Vec<GraphNode> {
        let lo = hosts.iter().map(|h| h.visit_count).min().unwrap_or(0);
        let hi = hosts.iter().map(|h| h.visit_count).max().unwrap_or(0);

        hosts
            .iter()
            .map(|h| {
                GraphNode::Host(HostNode {
                    id: h.host.clone(),
                    label: truncate_label(
                        &h.host,
                        self.config.label_max_chars,
                        self.config.label_keep_chars,
                    ),
                    topic: h.dominant_topic.clone(),
                    visit_count: h.visit_count,
                    max_probability: h.max_probability,
                    radius: self.config.host_radius.scale(h.visit_count, lo, hi),
                    color: self.config.palette.color_for(&h.dominant_topic).to_string(),
                    urls: h.urls.clone(),
                })
            })
            .collect()
    }

    /// One hub per topic except `"other"`, sorted by topic.
    ///
    /// The radius range is taken over every topic, `"other"` included.
    fn hub_nodes(&self, topics: &[TopicAggregate]) -> Vec<GraphNode> {
        let lo = topics.iter().map(|t| t.request_count).min().unwrap_or(0);
        let hi = topics.iter().map(|t| t.request_count).max().unwrap_or(0);

        topics
            .iter()
            .filter(|t| t.topic != OTHER_TOPIC)
            .map(|t| {
                GraphNode::Hub(HubNode {
                    id: hub_id(&t.topic),
                    label: t.topic.clone(),
                    topic: t.topic.clone(),
                    host_count: t.host_count,
                    request_count: t.request_count,
                    radius: self.config.hub_radius.scale(t.request_count, lo, hi),
                    color: self.config.palette.color_for(&t.topic).to_string(),
                })
            })
            .collect()
    }

    // ── Edges ────────────────────────────────────────────────────────────────

    /// Co-visitation edges, strongest first, after pruning.
    fn session_edges(&self, sessions: &[Session], dominant: &HashMap<&str, &str>) -> Vec<GraphEdge> {
        let mut pairs = self.accumulate_pairs(sessions);
        let total = pairs.len();

        // Stable: equal weights keep first-encounter order.
        pairs.sort_by(|x, y| y.weight.cmp(&x.weight));
        pairs.truncate(self.config.retained_edge_count(total));

        debug!(
            "GraphBuilder: kept {} of {} session edges",
            pairs.len(),
            total
        );

        pairs
            .into_iter()
            .map(|pair| {
                let color = self.session_edge_color(&pair, dominant);
                GraphEdge {
                    source: pair.a,
                    target: pair.b,
                    kind: EdgeKind::Session,
                    weight: pair.weight.min(self.config.max_edge_weight),
                    color,
                }
            })
            .collect()
    }

    fn accumulate_pairs(&self, sessions: &[Session]) -> Vec<PairWeight> {
        let mut pairs: Vec<PairWeight> = Vec::new();
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();

        for session in sessions {
            let hosts = self.paired_hosts(session);
            if hosts.len() < 2 {
                continue;
            }

            // `hosts` is sorted, so (a, b) with a < b is the canonical key.
            for (i, &a) in hosts.iter().enumerate() {
                for &b in &hosts[i + 1..] {
                    match index.get(&(a, b)) {
                        Some(&slot) => pairs[slot].weight += 1,
                        None => {
                            index.insert((a, b), pairs.len());
                            pairs.push(PairWeight {
                                a: a.to_string(),
                                b: b.to_string(),
                                weight: 1,
                            });
                        }
                    }
                }
            }
        }
        pairs
    }

    /// Sorted distinct hosts of `session` that take part in pairing.
    fn paired_hosts<'a>(&self, session: &'a Session) -> Vec<&'a str> {
        let mut hosts = session.distinct_hosts();
        let cap = match self.config.max_hosts_per_session {
            Some(cap) if hosts.len() > cap.max(2) => cap.max(2),
            _ => return hosts,
        };

        let mut visits: HashMap<&str, usize> = HashMap::new();
        for event in &session.events {
            *visits.entry(event.host.as_str()).or_insert(0) += 1;
        }
        // Stable sort: equal counts keep alphabetical order.
        hosts.sort_by(|a, b| visits[b].cmp(&visits[a]));
        warn!(
            "Session {} has {} distinct hosts, pairing only the {} most visited",
            session.index,
            hosts.len(),
            cap
        );
        hosts.truncate(cap);
        hosts.sort_unstable();
        hosts
    }

    fn session_edge_color(&self, pair: &PairWeight, dominant: &HashMap<&str, &str>) -> String {
        match (dominant.get(pair.a.as_str()), dominant.get(pair.b.as_str())) {
            (Some(ta), Some(tb)) if ta == tb && *ta != OTHER_TOPIC => {
                self.config.palette.color_for(ta).to_string()
            }
            _ => self.config.neutral_edge_color.clone(),
        }
    }

    fn hub_edges(&self, topics: &[TopicAggregate]) -> Vec<GraphEdge> {
        topics
            .iter()
            .filter(|t| t.topic != OTHER_TOPIC)
            .flat_map(|t| {
                let hub = hub_id(&t.topic);
                let color = self.config.palette.color_for(&t.topic).to_string();
                t.hosts.iter().map(move |host| GraphEdge {
                    source: hub.clone(),
                    target: host.clone(),
                    kind: EdgeKind::Hub,
                    weight: self.config.hub_edge_weight,
                    color: color.clone(),
                })
            })
            .collect()
    }

    /// Closed cycle over the hubs in topic order; needs two or more hubs.
    fn ring_edges(&self, topics: &[TopicAggregate]) -> Vec<GraphEdge> {
        let hubs: Vec<String> = topics
            .iter()
            .filter(|t| t.topic != OTHER_TOPIC)
            .map(|t| hub_id(&t.topic))
            .collect();
        if hubs.len() < 2 {
            return Vec::new();
        }

        (0..hubs.len())
            .map(|i| GraphEdge {
                source: hubs[i].clone(),
                target: hubs[(i + 1) % hubs.len()].clone(),
                kind: EdgeKind::Ring,
                weight: self.config.ring_edge_weight,
                color: self.config.ring_edge_color.clone(),
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use crate::segmenter::SessionSegmenter;
    use chrono::{TimeZone, Utc};

    fn minute(m: i64) -> i64 {
        Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0)
            .unwrap()
            .timestamp_micros()
            + m * 60_000_000
    }

    fn visit(host: &str, topic: &str, m: i64) -> HistoryRecord {
        HistoryRecord::new(host)
            .with_topic(topic, 0.9)
            .with_time_usec(minute(m))
    }

    fn build_with(config: GraphConfig, records: &[HistoryRecord]) -> HistoryGraph {
        let history = normalize(records);
        let sessions = SessionSegmenter::default().segment(&history.events);
        GraphBuilder::new(config).build(records, &sessions)
    }

    fn build(records: &[HistoryRecord]) -> HistoryGraph {
        build_with(GraphConfig::default(), records)
    }

    // ── degenerate input ─────────────────────────────────────────────────────

    #[test]
    fn test_empty_input() {
        let graph = build(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.adjacency.is_empty());
    }

    #[test]
    fn test_all_hostless_input() {
        let records = vec![HistoryRecord::default().with_time_usec(minute(0))];
        assert!(build(&records).is_empty());
    }

    // ── scenarios ────────────────────────────────────────────────────────────

    #[test]
    fn test_single_host_repeated() {
        let records = vec![
            visit("a.com", "news", 0),
            visit("a.com", "news", 5),
            visit("a.com", "news", 10),
        ];
        let graph = build(&records);

        let hosts: Vec<&HostNode> = graph.host_nodes().collect();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].visit_count, 3);
        assert_eq!(hosts[0].radius, 36.0);

        let hubs: Vec<&HubNode> = graph.hub_nodes().collect();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].id, "topic:news");
        assert_eq!(hubs[0].radius, 55.0);

        assert_eq!(graph.edges_of_kind(EdgeKind::Hub).count(), 1);
        assert_eq!(graph.edges_of_kind(EdgeKind::Session).count(), 0);
        assert_eq!(graph.edges_of_kind(EdgeKind::Ring).count(), 0);
    }

    #[test]
    fn test_two_hosts_same_session() {
        let records = vec![visit("a.com", "tech", 0), visit("b.com", "tech", 10)];
        let graph = build(&records);

        let session: Vec<&GraphEdge> = graph.edges_of_kind(EdgeKind::Session).collect();
        assert_eq!(session.len(), 1);
        assert_eq!(session[0].source, "a.com");
        assert_eq!(session[0].target, "b.com");
        assert_eq!(session[0].weight, 1);
        // Shared non-"other" topic paints the edge in the topic color.
        assert_eq!(session[0].color, "#3b82f6");

        assert_eq!(graph.host_nodes().count(), 2);
        assert_eq!(graph.hub_nodes().count(), 1);
        assert_eq!(graph.edges_of_kind(EdgeKind::Hub).count(), 2);
        assert!(graph.adjacency.are_connected("a.com", "b.com"));
        assert!(graph.adjacency.are_connected("topic:tech", "a.com"));
    }

    #[test]
    fn test_same_host_split_sessions() {
        let records = vec![visit("a.com", "tech", 0), visit("a.com", "tech", 40)];
        let graph = build(&records);
        assert_eq!(graph.edges_of_kind(EdgeKind::Session).count(), 0);
    }

    // ── session edges ────────────────────────────────────────────────────────

    #[test]
    fn test_pair_counted_once_per_session() {
        // a and b alternate inside one session, then meet again in a second.
        let records = vec![
            visit("b.com", "tech", 0),
            visit("a.com", "tech", 1),
            visit("b.com", "tech", 2),
            visit("a.com", "tech", 3),
            visit("a.com", "tech", 100),
            visit("b.com", "tech", 101),
        ];
        let graph = build(&records);
        let edges: Vec<&GraphEdge> = graph.edges_of_kind(EdgeKind::Session).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].weight, 2);
    }

    #[test]
    fn test_mixed_topics_use_neutral_color() {
        let records = vec![visit("a.com", "tech", 0), visit("b.com", "news", 1)];
        let graph = build(&records);
        let edge = graph.edges_of_kind(EdgeKind::Session).next().unwrap();
        assert_eq!(edge.color, NEUTRAL_EDGE_COLOR);
    }

    #[test]
    fn test_shared_other_topic_uses_neutral_color() {
        let records = vec![
            HistoryRecord::new("a.com").with_time_usec(minute(0)),
            HistoryRecord::new("b.com").with_time_usec(minute(1)),
        ];
        let graph = build(&records);
        let edge = graph.edges_of_kind(EdgeKind::Session).next().unwrap();
        assert_eq!(edge.color, NEUTRAL_EDGE_COLOR);
    }

    #[test]
    fn test_weight_cap() {
        // 15 separate sessions, each pairing a and b.
        let mut records = Vec::new();
        for s in 0..15 {
            records.push(visit("a.com", "tech", s * 60));
            records.push(visit("b.com", "tech", s * 60 + 1));
        }
        let graph = build(&records);
        let edge = graph.edges_of_kind(EdgeKind::Session).next().unwrap();
        assert_eq!(edge.weight, 12);
    }

    #[test]
    fn test_pruning_bound() {
        // Five hosts in one session → 10 pairs → 8 kept.
        let records: Vec<HistoryRecord> = ["a", "b", "c", "d", "e"]
            .iter()
            .enumerate()
            .map(|(i, h)| visit(&format!("{}.com", h), "tech", i as i64))
            .collect();
        let graph = build(&records);
        assert_eq!(graph.edges_of_kind(EdgeKind::Session).count(), 8);
    }

    #[test]
    fn test_pruning_drops_weakest() {
        // a-b meet in two sessions; a-c and b-c only in the first.
        let records = vec![
            visit("a.com", "tech", 0),
            visit("b.com", "tech", 1),
            visit("c.com", "tech", 2),
            visit("a.com", "tech", 100),
            visit("b.com", "tech", 101),
        ];
        let config = GraphConfig::default().with_keep_percent(34);
        let graph = build_with(config, &records);
        let edges: Vec<&GraphEdge> = graph.edges_of_kind(EdgeKind::Session).collect();
        // ceil(3 * 0.34) = 2: the strong a-b edge, then the first weak pair.
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].source.as_str(), edges[0].target.as_str()), ("a.com", "b.com"));
        assert_eq!(edges[0].weight, 2);
        assert_eq!((edges[1].source.as_str(), edges[1].target.as_str()), ("a.com", "c.com"));
    }

    #[test]
    fn test_retained_edge_count() {
        let config = GraphConfig::default();
        assert_eq!(config.retained_edge_count(0), 0);
        assert_eq!(config.retained_edge_count(1), 1);
        assert_eq!(config.retained_edge_count(2), 2);
        assert_eq!(config.retained_edge_count(5), 4);
        assert_eq!(config.retained_edge_count(10), 8);
        assert_eq!(config.retained_edge_count(11), 9);
    }

    #[test]
    fn test_host_cap_limits_pairs() {
        let records: Vec<HistoryRecord> = (0..6)
            .map(|i| visit(&format!("h{}.com", i), "tech", i))
            .collect();
        let config = GraphConfig {
            max_hosts_per_session: Some(3),
            keep_percent: 100,
            ..GraphConfig::default()
        };
        let graph = build_with(config, &records);
        // Equal visit counts fall back to name order: only h0, h1, h2 pair up.
        assert_eq!(graph.edges_of_kind(EdgeKind::Session).count(), 3);
        assert_eq!(graph.host_nodes().count(), 6);
        // Hub edge only.
        assert_eq!(graph.adjacency.degree("h5.com"), 1);
    }

    #[test]
    fn test_host_cap_keeps_most_visited() {
        let mut records: Vec<HistoryRecord> = (0..5)
            .map(|i| visit(&format!("h{}.com", i), "tech", i))
            .collect();
        records.push(visit("h4.com", "tech", 5));
        records.push(visit("h3.com", "tech", 6));
        let config = GraphConfig {
            max_hosts_per_session: Some(3),
            keep_percent: 100,
            ..GraphConfig::default()
        };
        let graph = build_with(config, &records);

        assert_eq!(graph.edges_of_kind(EdgeKind::Session).count(), 3);
        assert!(graph.adjacency.are_connected("h3.com", "h4.com"));
        assert!(graph.adjacency.are_connected("h0.com", "h4.com"));
        assert_eq!(graph.adjacency.degree("h1.com"), 1);
        assert_eq!(graph.adjacency.degree("h2.com"), 1);
    }

    #[test]
    fn test_large_session_pairs_every_host_by_default() {
        let base = minute(0);
        let records: Vec<HistoryRecord> = (0..501)
            .map(|i: i64| {
                HistoryRecord::new(format!("h{:03}.com", i))
                    .with_topic("tech", 0.9)
                    .with_time_usec(base + i * 10_000_000)
            })
            .collect();
        let config = GraphConfig {
            keep_percent: 100,
            ..GraphConfig::default()
        };
        let graph = build_with(config, &records);

        assert_eq!(graph.edges_of_kind(EdgeKind::Session).count(), 501 * 500 / 2);
        // 500 co-visited hosts plus the topic hub.
        for host in graph.host_nodes() {
            assert_eq!(graph.adjacency.degree(&host.id), 501, "{}", host.id);
        }
    }

    // ── hubs ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_other_topic_has_no_hub() {
        let records = vec![
            HistoryRecord::new("a.com").with_time_usec(minute(0)),
            visit("b.com", "news", 120),
        ];
        let graph = build(&records);
        let hub_ids: Vec<&str> = graph.hub_nodes().map(|h| h.id.as_str()).collect();
        assert_eq!(hub_ids, vec!["topic:news"]);

        let a = graph.node("a.com").unwrap();
        assert_eq!(a.topic(), "other");
        assert_eq!(a.color(), "#94a3b8");
        assert_eq!(graph.edges_touching("a.com").count(), 0);
    }

    #[test]
    fn test_ring_edges_follow_sorted_topics() {
        let records = vec![
            visit("a.com", "tech", 0),
            visit("b.com", "news", 100),
            visit("c.com", "finance", 200),
        ];
        let graph = build(&records);

        let hub_ids: Vec<&str> = graph.hub_nodes().map(|h| h.id.as_str()).collect();
        assert_eq!(hub_ids, vec!["topic:finance", "topic:news", "topic:tech"]);

        let ring: Vec<(&str, &str)> = graph
            .edges_of_kind(EdgeKind::Ring)
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(
            ring,
            vec![
                ("topic:finance", "topic:news"),
                ("topic:news", "topic:tech"),
                ("topic:tech", "topic:finance"),
            ]
        );
        assert!(graph
            .edges_of_kind(EdgeKind::Ring)
            .all(|e| e.weight == 1 && e.color == RING_EDGE_COLOR));
    }

    #[test]
    fn test_hub_edge_weight_and_color() {
        let graph = build(&[visit("a.com", "news", 0)]);
        let edge = graph.edges_of_kind(EdgeKind::Hub).next().unwrap();
        assert_eq!(edge.source, "topic:news");
        assert_eq!(edge.target, "a.com");
        assert_eq!(edge.weight, 4);
        assert_eq!(edge.color, "#ef4444");
    }

    #[test]
    fn test_hub_counts() {
        let records = vec![
            visit("a.com", "news", 0),
            visit("a.com", "news", 1),
            visit("b.com", "news", 2),
        ];
        let graph = build(&records);
        let hub = graph.hub_nodes().next().unwrap();
        assert_eq!(hub.host_count, 2);
        assert_eq!(hub.request_count, 3);
    }

    // ── host aggregation ─────────────────────────────────────────────────────

    #[test]
    fn test_dominant_topic_first_seen_wins_tie() {
        let records = vec![
            HistoryRecord::new("a.com").with_topic("news", 0.5),
            HistoryRecord::new("a.com").with_topic("tech", 0.5),
            HistoryRecord::new("a.com").with_topic("video", 0.4),
        ];
        let hosts = aggregate_hosts(&records);
        assert_eq!(hosts[0].dominant_topic, "news");
        assert_eq!(hosts[0].max_probability, 0.5);
    }

    #[test]
    fn test_dominant_topic_follows_max_probability() {
        let records = vec![
            HistoryRecord::new("a.com").with_topic("news", 0.2),
            HistoryRecord::new("a.com").with_topic("tech", 0.7),
        ];
        assert_eq!(aggregate_hosts(&records)[0].dominant_topic, "tech");
    }

    #[test]
    fn test_untimed_records_still_make_host_nodes() {
        let records = vec![
            HistoryRecord::new("a.com").with_url("https://a.com/1"),
            HistoryRecord::new("a.com").with_url("https://a.com/2"),
            HistoryRecord::new("a.com").with_url("https://a.com/1"),
        ];
        let graph = build(&records);
        let host = graph.host_nodes().next().unwrap();
        assert_eq!(host.visit_count, 3);
        assert_eq!(host.urls, vec!["https://a.com/1", "https://a.com/2"]);
    }

    #[test]
    fn test_long_label_truncated() {
        let long = format!("{}.example.com", "x".repeat(40));
        let graph = build(&[HistoryRecord::new(long.as_str())]);
        let host = graph.host_nodes().next().unwrap();
        assert_eq!(host.id, long);
        assert_eq!(host.label.chars().count(), 40);
        assert!(host.label.ends_with("..."));
    }

    // ── radius bounds ────────────────────────────────────────────────────────

    #[test]
    fn test_radius_bounds() {
        let mut records = Vec::new();
        for (host, topic, n) in [("a.com", "news", 1), ("b.com", "tech", 5), ("c.com", "tech", 9)] {
            for i in 0..n {
                records.push(visit(host, topic, i));
            }
        }
        let graph = build(&records);
        for host in graph.host_nodes() {
            assert!((12.0..=60.0).contains(&host.radius));
        }
        for hub in graph.hub_nodes() {
            assert!((30.0..=80.0).contains(&hub.radius));
        }
        assert_eq!(graph.node("a.com").unwrap().radius(), 12.0);
        assert_eq!(graph.node("c.com").unwrap().radius(), 60.0);
        assert_eq!(graph.node("topic:news").unwrap().radius(), 30.0);
        assert_eq!(graph.node("topic:tech").unwrap().radius(), 80.0);
    }

    #[test]
    fn test_radius_scale() {
        let range = RadiusRange::new(10.0, 20.0);
        assert_eq!(range.scale(5, 0, 10), 15.0);
        assert_eq!(range.scale(7, 7, 7), 15.0);
    }

    // ── palette ──────────────────────────────────────────────────────────────

    #[test]
    fn test_custom_palette() {
        let palette = TopicPalette::from_pairs([("news", "#000000"), ("other", "#ffffff")]);
        let config = GraphConfig::default().with_palette(palette);
        let graph = build_with(
            config,
            &[visit("a.com", "news", 0), visit("b.com", "sports", 100)],
        );
        assert_eq!(graph.node("a.com").unwrap().color(), "#000000");
        assert_eq!(graph.node("topic:news").unwrap().color(), "#000000");
        // Unknown topic falls back to the palette's "other" entry.
        assert_eq!(graph.node("topic:sports").unwrap().color(), "#ffffff");
    }

    // ── adjacency & determinism ──────────────────────────────────────────────

    #[test]
    fn test_adjacency_covers_every_edge() {
        let records = vec![
            visit("a.com", "tech", 0),
            visit("b.com", "news", 1),
            visit("c.com", "tech", 2),
        ];
        let graph = build(&records);
        for edge in &graph.edges {
            assert!(graph.adjacency.are_connected(&edge.source, &edge.target));
            assert!(graph.adjacency.are_connected(&edge.target, &edge.source));
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let records: Vec<HistoryRecord> = (0..30)
            .map(|i| {
                let topic = ["tech", "news", "video"][i % 3];
                visit(&format!("h{}.com", i % 7), topic, (i * 7) as i64)
            })
            .collect();
        let first = serde_json::to_string(&build(&records)).unwrap();
        let second = serde_json::to_string(&build(&records)).unwrap();
        assert_eq!(first, second);
    }
}
