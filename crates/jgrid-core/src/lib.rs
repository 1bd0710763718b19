//! # jgrid-core: Transmission Network Model
//!
//! Data structures for a small regional transmission network: operators
//! (nodes) placed at a geographic position with a generation capacity, and
//! interconnections (edges) weighted by the distance between their endpoints.
//!
//! ## Design
//!
//! The network is an **undirected simple graph** stored in a petgraph
//! `UnGraph<Operator, Interconnection>`:
//! - **Nodes**: [`Operator`] with an [`OperatorId`], [`GeoPoint`] and capacity
//! - **Edges**: [`Interconnection`] carrying the Euclidean distance between
//!   the endpoint positions, measured in degree space
//!
//! Node indices follow insertion order, which is the order of the
//! [`OperatorSite`] list the network is built from. Every ordering-sensitive
//! computation downstream (impedance synthesis, reports) relies on that.
//!
//! ## Quick Start
//!
//! ```
//! use std::collections::HashMap;
//! use jgrid_core::*;
//!
//! let sites = vec![
//!     OperatorSite::new("Tokyo", 35.7, 139.7),
//!     OperatorSite::new("Chubu", 35.2, 137.0),
//! ];
//! let mut capacity = CapacityMap::new();
//! capacity.insert(OperatorId::from("Tokyo"), Gigawatts(52.8));
//! capacity.insert(OperatorId::from("Chubu"), Gigawatts(32.1));
//! let connections = vec![(OperatorId::from("Tokyo"), OperatorId::from("Chubu"))];
//!
//! let network = Network::build(&sites, &capacity, &connections);
//! assert!(network.has_edge("Tokyo", "Chubu"));
//! assert_eq!(network.degree("Tokyo"), 1);
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - Issue collection for recovered input defects
//! - [`graph_utils`] - Island detection and Graphviz export
//! - [`units`] - Gigawatts / degrees / per-unit newtypes

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};

use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{GridError, GridResult};
pub use graph_utils::*;
pub use petgraph::graph::NodeIndex;
pub use units::{Degrees, Gigawatts, ImpedancePu};

/// Capacity assumed for an operator that has no capacity record.
pub const DEFAULT_CAPACITY_GW: f64 = 10.0;

/// Capacity per operator, as produced by the validator.
pub type CapacityMap = HashMap<OperatorId, Gigawatts>;

/// Unordered operator pair describing one interconnection.
pub type ConnectionPair = (OperatorId, OperatorId);

/// Identifier of a regional operator (e.g. `"Tokyo"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(String);

impl OperatorId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        OperatorId(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperatorId {
    fn from(value: &str) -> Self {
        OperatorId(value.to_string())
    }
}

impl From<String> for OperatorId {
    fn from(value: String) -> Self {
        OperatorId(value)
    }
}

impl Borrow<str> for OperatorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for OperatorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: Degrees,
    pub longitude: Degrees,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Degrees(latitude),
            longitude: Degrees(longitude),
        }
    }

    /// Planar Euclidean distance in degree space.
    ///
    /// This is a layout distance, not a great-circle distance; the impedance
    /// model only needs something monotone in separation.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let dlat = self.latitude.value() - other.latitude.value();
        let dlon = self.longitude.value() - other.longitude.value();
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

/// A known operator location, before capacity has been attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSite {
    pub id: OperatorId,
    pub position: GeoPoint,
}

impl OperatorSite {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: OperatorId::new(id),
            position: GeoPoint::new(latitude, longitude),
        }
    }
}

/// Network node: a regional operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub id: OperatorId,
    pub position: GeoPoint,
    pub capacity: Gigawatts,
}

impl Operator {
    pub fn label(&self) -> &str {
        self.id.as_str()
    }
}

/// Network edge: an interconnection between two operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interconnection {
    pub from: OperatorId,
    pub to: OperatorId,
    /// Euclidean distance between endpoint positions (degrees)
    pub distance: f64,
}

impl Interconnection {
    pub fn label(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

/// The transmission network graph
#[derive(Debug, Clone)]
pub struct Network {
    pub graph: UnGraph<Operator, Interconnection>,
    index: HashMap<OperatorId, NodeIndex>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            index: HashMap::new(),
        }
    }

    /// Build a network from known sites, a capacity table and connection pairs.
    ///
    /// Operators are inserted in `sites` order. A site without a capacity entry
    /// gets [`DEFAULT_CAPACITY_GW`]. Connections naming an unknown operator,
    /// self-loops and repeated pairs are skipped; run the input through the
    /// validator first to get those reported.
    pub fn build(
        sites: &[OperatorSite],
        capacity: &CapacityMap,
        connections: &[ConnectionPair],
    ) -> Self {
        let mut network = Network::new();
        for site in sites {
            let capacity = capacity
                .get(&site.id)
                .copied()
                .unwrap_or(Gigawatts(DEFAULT_CAPACITY_GW));
            // duplicate sites keep the first entry
            let _ = network.add_operator(Operator {
                id: site.id.clone(),
                position: site.position,
                capacity,
            });
        }
        for (from, to) in connections {
            let _ = network.add_interconnection(from.as_str(), to.as_str());
        }
        network
    }

    /// Insert an operator. Fails if the identifier is already present.
    pub fn add_operator(&mut self, operator: Operator) -> GridResult<NodeIndex> {
        if self.index.contains_key(&operator.id) {
            return Err(GridError::Network(format!(
                "operator '{}' already exists",
                operator.id
            )));
        }
        let id = operator.id.clone();
        let idx = self.graph.add_node(operator);
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Connect two operators, weighting the edge by their distance.
    ///
    /// Returns `Ok(false)` when the pair is already connected.
    pub fn add_interconnection(&mut self, a: &str, b: &str) -> GridResult<bool> {
        if a == b {
            return Err(GridError::Network(format!("self-loop on '{a}'")));
        }
        let ia = self
            .index_of(a)
            .ok_or_else(|| GridError::Network(format!("unknown operator '{a}'")))?;
        let ib = self
            .index_of(b)
            .ok_or_else(|| GridError::Network(format!("unknown operator '{b}'")))?;
        if self.graph.find_edge(ia, ib).is_some() {
            return Ok(false);
        }
        let distance = self.graph[ia].position.distance_to(&self.graph[ib].position);
        let edge = Interconnection {
            from: self.graph[ia].id.clone(),
            to: self.graph[ib].id.clone(),
            distance,
        };
        self.graph.add_edge(ia, ib, edge);
        Ok(true)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn operator(&self, id: &str) -> Option<&Operator> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    /// Operators in insertion order.
    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Operator identifiers in insertion order.
    pub fn ids(&self) -> Vec<OperatorId> {
        self.operators().map(|op| op.id.clone()).collect()
    }

    pub fn interconnections(&self) -> impl Iterator<Item = &Interconnection> {
        self.graph.edge_references().map(|edge| edge.weight())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(ia), Some(ib)) => self.graph.find_edge(ia, ib).is_some(),
            _ => false,
        }
    }

    /// Number of interconnections at `id`; 0 for unknown operators.
    pub fn degree(&self, id: &str) -> usize {
        self.index_of(id)
            .map(|idx| self.graph.neighbors(idx).count())
            .unwrap_or(0)
    }

    pub fn neighbors(&self, id: &str) -> BTreeSet<OperatorId> {
        match self.index_of(id) {
            Some(idx) => self
                .graph
                .neighbors(idx)
                .map(|n| self.graph[n].id.clone())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Edge weight between two operators, if they are directly connected.
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        self.graph
            .find_edge(ia, ib)
            .map(|edge| self.graph[edge].distance)
    }

    pub fn capacities(&self) -> CapacityMap {
        self.operators()
            .map(|op| (op.id.clone(), op.capacity))
            .collect()
    }

    pub fn total_capacity(&self) -> Gigawatts {
        self.operators().map(|op| op.capacity).sum()
    }

    /// Operators by capacity, largest first, with their percentage share of
    /// the total. Shares are 0 when the total is 0.
    pub fn capacity_ranking(&self) -> Vec<(&Operator, f64)> {
        let total = self.total_capacity().value();
        let mut ranking: Vec<(&Operator, f64)> = self
            .operators()
            .map(|op| {
                let share = if total > 0.0 {
                    op.capacity.value() / total * 100.0
                } else {
                    0.0
                };
                (op, share)
            })
            .collect();
        ranking.sort_by(|a, b| b.0.capacity.value().total_cmp(&a.0.capacity.value()));
        ranking
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            num_operators: self.node_count(),
            num_interconnections: self.edge_count(),
            total_capacity_gw: self.total_capacity().value(),
        }
    }
}

/// Free-function form of [`Network::build`], argument order following the
/// loader's output (capacity, connections, known sites).
pub fn build_network(
    capacity: &CapacityMap,
    connections: &[ConnectionPair],
    known_nodes: &[OperatorSite],
) -> Network {
    Network::build(known_nodes, capacity, connections)
}

/// Size and capacity summary of a network
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkStats {
    pub num_operators: usize,
    pub num_interconnections: usize,
    pub total_capacity_gw: f64,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} operators, {} interconnections, {:.1} GW total capacity",
            self.num_operators, self.num_interconnections, self.total_capacity_gw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_sites() -> Vec<OperatorSite> {
        vec![
            OperatorSite::new("A", 0.0, 0.0),
            OperatorSite::new("B", 3.0, 4.0),
            OperatorSite::new("C", 0.0, 8.0),
        ]
    }

    fn pair(a: &str, b: &str) -> ConnectionPair {
        (OperatorId::from(a), OperatorId::from(b))
    }

    #[test]
    fn test_build_assigns_distance_weights() {
        let network = Network::build(
            &triangle_sites(),
            &CapacityMap::new(),
            &[pair("A", "B"), pair("B", "C")],
        );

        assert_eq!(network.node_count(), 3);
        assert_eq!(network.edge_count(), 2);
        assert!((network.distance("A", "B").unwrap() - 5.0).abs() < 1e-12);
        assert!((network.distance("C", "B").unwrap() - 5.0).abs() < 1e-12);
        assert_eq!(network.distance("A", "C"), None);
    }

    #[test]
    fn test_build_skips_duplicates_self_loops_and_unknowns() {
        let network = Network::build(
            &triangle_sites(),
            &CapacityMap::new(),
            &[
                pair("A", "B"),
                pair("B", "A"),
                pair("C", "C"),
                pair("A", "Z"),
            ],
        );

        assert_eq!(network.edge_count(), 1);
        assert!(network.has_edge("B", "A"));
        assert!(!network.has_edge("A", "Z"));
    }

    #[test]
    fn test_missing_capacity_uses_default() {
        let mut capacity = CapacityMap::new();
        capacity.insert(OperatorId::from("A"), Gigawatts(52.8));
        let network = Network::build(&triangle_sites(), &capacity, &[]);

        assert_eq!(network.operator("A").unwrap().capacity, Gigawatts(52.8));
        assert_eq!(
            network.operator("B").unwrap().capacity,
            Gigawatts(DEFAULT_CAPACITY_GW)
        );
        assert!((network.total_capacity().value() - 72.8).abs() < 1e-10);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let network = Network::build(&triangle_sites(), &CapacityMap::new(), &[]);
        let ids: Vec<String> = network.ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(network.index_of("C").unwrap().index(), 2);
    }

    #[test]
    fn test_degree_and_neighbors() {
        let network = Network::build(
            &triangle_sites(),
            &CapacityMap::new(),
            &[pair("A", "B"), pair("B", "C")],
        );

        assert_eq!(network.degree("B"), 2);
        assert_eq!(network.degree("A"), 1);
        assert_eq!(network.degree("missing"), 0);

        let neighbors: Vec<String> = network
            .neighbors("B")
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(neighbors, vec!["A", "C"]);
        assert!(network.neighbors("missing").is_empty());
    }

    #[test]
    fn test_add_operator_rejects_duplicate() {
        let mut network = Network::new();
        let op = Operator {
            id: OperatorId::from("Tokyo"),
            position: GeoPoint::new(35.7, 139.7),
            capacity: Gigawatts(52.8),
        };
        assert!(network.add_operator(op.clone()).is_ok());
        assert!(matches!(
            network.add_operator(op),
            Err(GridError::Network(_))
        ));
    }

    #[test]
    fn test_add_interconnection_results() {
        let mut network = Network::build(&triangle_sites(), &CapacityMap::new(), &[]);
        assert!(network.add_interconnection("A", "B").unwrap());
        assert!(!network.add_interconnection("B", "A").unwrap());
        assert!(network.add_interconnection("A", "A").is_err());
        assert!(network.add_interconnection("A", "Q").is_err());
    }

    #[test]
    fn test_empty_network() {
        let network = Network::build(&[], &CapacityMap::new(), &[pair("A", "B")]);
        assert_eq!(network.node_count(), 0);
        assert_eq!(network.edge_count(), 0);
        assert_eq!(network.total_capacity(), Gigawatts::ZERO);
    }

    #[test]
    fn test_capacity_ranking_shares() {
        let mut capacity = CapacityMap::new();
        capacity.insert(OperatorId::from("A"), Gigawatts(10.0));
        capacity.insert(OperatorId::from("B"), Gigawatts(30.0));
        capacity.insert(OperatorId::from("C"), Gigawatts(60.0));
        let network = Network::build(&triangle_sites(), &capacity, &[]);

        let ranking = network.capacity_ranking();
        let order: Vec<&str> = ranking.iter().map(|(op, _)| op.label()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
        assert!((ranking[0].1 - 60.0).abs() < 1e-9);
        assert!((ranking.iter().map(|(_, share)| share).sum::<f64>() - 100.0).abs() < 1e-9);

        let mut zero = CapacityMap::new();
        for id in ["A", "B", "C"] {
            zero.insert(OperatorId::from(id), Gigawatts(0.0));
        }
        let empty = Network::build(&triangle_sites(), &zero, &[]);
        assert!(empty.capacity_ranking().iter().all(|(_, share)| *share == 0.0));
    }

    #[test]
    fn test_network_stats_display() {
        let network = Network::build(
            &triangle_sites(),
            &CapacityMap::new(),
            &[pair("A", "B")],
        );
        let stats = network.stats();
        assert_eq!(stats.num_operators, 3);
        assert_eq!(stats.num_interconnections, 1);
        assert_eq!(
            stats.to_string(),
            "3 operators, 1 interconnections, 30.0 GW total capacity"
        );
    }

    #[test]
    fn test_build_network_argument_order() {
        let network = build_network(&CapacityMap::new(), &[pair("A", "C")], &triangle_sites());
        assert!(network.has_edge("A", "C"));
    }
}
