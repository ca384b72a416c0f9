//! Node/edge data model handed to the layout and rendering layer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ── Nodes ─────────────────────────────────────────────────────────────────────

/// A node for one visited host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostNode {
    /// The host name itself.
    pub id: String,
    /// Host name, shortened for display.
    pub label: String,
    /// Dominant topic of the host.
    pub topic: String,
    pub visit_count: u64,
    /// Highest classifier probability seen for the host.
    pub max_probability: f64,
    pub radius: f64,
    pub color: String,
    /// Distinct URLs in first-seen order.
    pub urls: Vec<String>,
}

/// A node standing for a topic cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubNode {
    /// `"topic:" + topic`.
    pub id: String,
    pub label: String,
    pub topic: String,
    /// Hosts whose dominant topic is this topic.
    pub host_count: u64,
    /// Sum of the visit counts of those hosts.
    pub request_count: u64,
    pub radius: f64,
    pub color: String,
}

/// Graph node, discriminated by `kind` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GraphNode {
    Host(HostNode),
    Hub(HubNode),
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            GraphNode::Host(n) => &n.id,
            GraphNode::Hub(n) => &n.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GraphNode::Host(n) => &n.label,
            GraphNode::Hub(n) => &n.label,
        }
    }

    pub fn topic(&self) -> &str {
        match self {
            GraphNode::Host(n) => &n.topic,
            GraphNode::Hub(n) => &n.topic,
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            GraphNode::Host(n) => n.radius,
            GraphNode::Hub(n) => n.radius,
        }
    }

    pub fn color(&self) -> &str {
        match self {
            GraphNode::Host(n) => &n.color,
            GraphNode::Hub(n) => &n.color,
        }
    }

    pub fn as_host(&self) -> Option<&HostNode> {
        match self {
            GraphNode::Host(n) => Some(n),
            GraphNode::Hub(_) => None,
        }
    }

    pub fn as_hub(&self) -> Option<&HubNode> {
        match self {
            GraphNode::Hub(n) => Some(n),
            GraphNode::Host(_) => None,
        }
    }
}

// ── Edges ─────────────────────────────────────────────────────────────────────

/// Why two nodes are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Two hosts visited in the same session.
    Session,
    /// A hub and a host whose dominant topic is the hub's topic.
    Hub,
    /// Two cyclically adjacent hubs; a layout aid only.
    Ring,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EdgeKind::Session => "session",
            EdgeKind::Hub => "hub",
            EdgeKind::Ring => "ring",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub weight: u32,
    pub color: String,
}

impl GraphEdge {
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

// ── AdjacencyIndex ────────────────────────────────────────────────────────────

/// Undirected node id → neighbor ids index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyIndex {
    neighbors: BTreeMap<String, BTreeSet<String>>,
}

impl AdjacencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `a` and `b` as neighbors of each other.
    pub fn connect(&mut self, a: &str, b: &str) {
        self.neighbors
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.neighbors
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    /// Direct neighbors of `id`.
    pub fn neighbors(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.neighbors.get(id)
    }

    /// `id` plus its direct neighbors; empty when `id` has no edges.
    pub fn neighborhood(&self, id: &str) -> BTreeSet<String> {
        match self.neighbors.get(id) {
            Some(set) => {
                let mut out = set.clone();
                out.insert(id.to_string());
                out
            }
            None => BTreeSet::new(),
        }
    }

    pub fn degree(&self, id: &str) -> usize {
        self.neighbors.get(id).map_or(0, BTreeSet::len)
    }

    pub fn are_connected(&self, a: &str, b: &str) -> bool {
        self.neighbors.get(a).is_some_and(|set| set.contains(b))
    }

    /// Number of nodes with at least one neighbor.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.neighbors.iter()
    }
}

// ── HistoryGraph ──────────────────────────────────────────────────────────────

/// Complete output of one graph build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub adjacency: AdjacencyIndex,
}

impl HistoryGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn host_nodes(&self) -> impl Iterator<Item = &HostNode> {
        self.nodes.iter().filter_map(GraphNode::as_host)
    }

    pub fn hub_nodes(&self) -> impl Iterator<Item = &HubNode> {
        self.nodes.iter().filter_map(GraphNode::as_hub)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn edges_touching<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Whether `edge` stays highlighted while `focus` is hovered: both of its
    /// endpoints lie in the focus node's neighborhood.
    pub fn is_edge_highlighted(&self, edge: &GraphEdge, focus: &str) -> bool {
        let Some(neighbors) = self.adjacency.neighbors(focus) else {
            return false;
        };
        let in_hood = |id: &str| id == focus || neighbors.contains(id);
        in_hood(edge.source.as_str()) && in_hood(edge.target.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
