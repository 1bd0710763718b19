//! Topology statistics over an operator network.
//!
//! All path metrics count hops; interconnection distances are ignored here.
//! Metrics that are only meaningful on a connected graph (diameter, average
//! shortest path, betweenness) come back as `None` when the network has more
//! than one component. A network with at most one operator counts as
//! connected.

use std::collections::VecDeque;

use jgrid_core::{Network, NodeIndex, OperatorId};
use petgraph::algo::connected_components;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Per-operator metric values, in network insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMetrics(Vec<(OperatorId, f64)>);

impl NodeMetrics {
    pub fn get(&self, id: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(op, _)| op.as_str() == id)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OperatorId, f64)> {
        self.0.iter().map(|(op, value)| (op, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().map(|(_, value)| value).sum()
    }

    /// Entries sorted by value, highest first; ties keep insertion order.
    pub fn ranked(&self) -> Vec<(&OperatorId, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
    }

    /// Highest-scoring operator; the first one wins ties.
    pub fn max(&self) -> Option<(&OperatorId, f64)> {
        self.iter()
            .fold(None, |best: Option<(&OperatorId, f64)>, (op, value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((op, value)),
            })
    }
}

impl Serialize for NodeMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (op, value) in &self.0 {
            map.serialize_entry(op.as_str(), value)?;
        }
        map.end()
    }
}

/// Min/average/max operator degree
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DegreeSummary {
    pub min: usize,
    pub avg: f64,
    pub max: usize,
}

impl std::fmt::Display for DegreeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:.2}/{}", self.min, self.avg, self.max)
    }
}

/// Derived topology snapshot of a network.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub is_connected: bool,
    pub component_count: usize,
    pub diameter: Option<usize>,
    pub average_clustering: f64,
    pub average_shortest_path: Option<f64>,
    pub degree: DegreeSummary,
    pub total_capacity_gw: f64,
    pub degree_centrality: NodeMetrics,
    pub betweenness_centrality: Option<NodeMetrics>,
}

/// Compute every statistic for `network`.
pub fn compute_statistics(network: &Network) -> NetworkStatistics {
    let adjacency = adjacency(network);
    let hops = all_pairs_hops(&adjacency);
    let connected = is_connected(network);

    NetworkStatistics {
        node_count: network.node_count(),
        edge_count: network.edge_count(),
        density: density(network),
        is_connected: connected,
        component_count: component_count(network),
        diameter: connected.then(|| diameter_from(&hops)),
        average_clustering: average_clustering(network),
        average_shortest_path: connected.then(|| mean_hops_from(&hops)),
        degree: degree_summary(network),
        total_capacity_gw: network.total_capacity().value(),
        degree_centrality: degree_centrality(network),
        betweenness_centrality: connected.then(|| brandes(network, &adjacency)),
    }
}

/// `2E / (N(N-1))`, or 0 below two operators.
pub fn density(network: &Network) -> f64 {
    let n = network.node_count();
    if n < 2 {
        return 0.0;
    }
    2.0 * network.edge_count() as f64 / (n as f64 * (n as f64 - 1.0))
}

pub fn is_connected(network: &Network) -> bool {
    let n = network.node_count();
    if n <= 1 {
        return true;
    }
    let adjacency = adjacency(network);
    bfs_hops(&adjacency, 0).iter().all(Option::is_some)
}

/// Number of connected components (0 for an empty network).
pub fn component_count(network: &Network) -> usize {
    connected_components(&network.graph)
}

/// Longest shortest hop path; `None` when disconnected.
pub fn diameter(network: &Network) -> Option<usize> {
    if !is_connected(network) {
        return None;
    }
    Some(diameter_from(&all_pairs_hops(&adjacency(network))))
}

/// Mean hop count over unordered operator pairs; `None` when disconnected.
pub fn average_shortest_path_length(network: &Network) -> Option<f64> {
    if !is_connected(network) {
        return None;
    }
    Some(mean_hops_from(&all_pairs_hops(&adjacency(network))))
}

/// Fraction of neighbor pairs of `id` that are themselves connected.
pub fn local_clustering(network: &Network, id: &str) -> f64 {
    network
        .index_of(id)
        .map(|idx| clustering_at(network, idx))
        .unwrap_or(0.0)
}

/// Mean local clustering over all operators; degree < 2 contributes 0.
pub fn average_clustering(network: &Network) -> f64 {
    let n = network.node_count();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = network
        .graph
        .node_indices()
        .map(|idx| clustering_at(network, idx))
        .sum();
    total / n as f64
}

/// `degree / (N - 1)` per operator, or 0 below two operators.
pub fn degree_centrality(network: &Network) -> NodeMetrics {
    let n = network.node_count();
    let scale = if n > 1 { 1.0 / (n as f64 - 1.0) } else { 0.0 };
    NodeMetrics(
        network
            .graph
            .node_indices()
            .map(|idx| {
                let degree = network.graph.neighbors(idx).count();
                (network.graph[idx].id.clone(), degree as f64 * scale)
            })
            .collect(),
    )
}

/// Normalized shortest-path betweenness; `None` when disconnected.
pub fn betweenness_centrality(network: &Network) -> Option<NodeMetrics> {
    if !is_connected(network) {
        return None;
    }
    Some(brandes(network, &adjacency(network)))
}

pub fn degree_summary(network: &Network) -> DegreeSummary {
    let degrees: Vec<usize> = network
        .graph
        .node_indices()
        .map(|idx| network.graph.neighbors(idx).count())
        .collect();
    if degrees.is_empty() {
        return DegreeSummary::default();
    }
    DegreeSummary {
        min: degrees.iter().copied().min().unwrap_or(0),
        avg: degrees.iter().sum::<usize>() as f64 / degrees.len() as f64,
        max: degrees.iter().copied().max().unwrap_or(0),
    }
}

// =============================================================================
// Internals
// =============================================================================

/// Neighbor lists by node position.
fn adjacency(network: &Network) -> Vec<Vec<usize>> {
    network
        .graph
        .node_indices()
        .map(|idx| {
            let mut neighbors: Vec<usize> =
                network.graph.neighbors(idx).map(|n| n.index()).collect();
            neighbors.sort_unstable();
            neighbors
        })
        .collect()
}

fn bfs_hops(adjacency: &[Vec<usize>], source: usize) -> Vec<Option<usize>> {
    let mut hops = vec![None; adjacency.len()];
    hops[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        let next = hops[v].map(|h| h + 1);
        for &w in &adjacency[v] {
            if hops[w].is_none() {
                hops[w] = next;
                queue.push_back(w);
            }
        }
    }
    hops
}

fn all_pairs_hops(adjacency: &[Vec<usize>]) -> Vec<Vec<Option<usize>>> {
    (0..adjacency.len())
        .map(|source| bfs_hops(adjacency, source))
        .collect()
}

fn diameter_from(hops: &[Vec<Option<usize>>]) -> usize {
    hops.iter()
        .flat_map(|row| row.iter().flatten())
        .copied()
        .max()
        .unwrap_or(0)
}

fn mean_hops_from(hops: &[Vec<Option<usize>>]) -> f64 {
    let n = hops.len();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0usize;
    for (i, row) in hops.iter().enumerate() {
        total += row.iter().skip(i + 1).flatten().sum::<usize>();
    }
    let pairs = n * (n - 1) / 2;
    total as f64 / pairs as f64
}

fn clustering_at(network: &Network, idx: NodeIndex) -> f64 {
    let neighbors: Vec<NodeIndex> = network.graph.neighbors(idx).collect();
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }
    let mut links = 0usize;
    for (pos, &u) in neighbors.iter().enumerate() {
        for &w in &neighbors[pos + 1..] {
            if network.graph.find_edge(u, w).is_some() {
                links += 1;
            }
        }
    }
    2.0 * links as f64 / (k as f64 * (k as f64 - 1.0))
}

/// Brandes accumulation over unweighted shortest paths.
///
/// Every source is processed, so each unordered pair is counted twice; the
/// undirected normalization `2 / ((N-1)(N-2))` therefore collapses to
/// `1 / ((N-1)(N-2))` applied to the raw sums.
fn brandes(network: &Network, adjacency: &[Vec<usize>]) -> NodeMetrics {
    let n = adjacency.len();
    let mut centrality = vec![0.0f64; n];

    for s in 0..n {
        let mut order = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[s] = 1.0;
        dist[s] = Some(0);

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in &adjacency[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = order.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    let scale = if n > 2 {
        1.0 / ((n as f64 - 1.0) * (n as f64 - 2.0))
    } else {
        0.0
    };
    NodeMetrics(
        network
            .graph
            .node_indices()
            .map(|idx| (network.graph[idx].id.clone(), centrality[idx.index()] * scale))
            .collect(),
    )
}
