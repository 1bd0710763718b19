//! One-shot analysis of a built network.
//!
//! [`analyze`] runs the impedance synthesizer and topology statistics over the
//! same network and bundles the results into an [`AnalyticsSnapshot`], the
//! read-only value handed to report and export code.

use jgrid_core::{CapacityMap, Diagnostics, Interconnection, Network, Operator};
use serde::Serialize;
use tracing::info;

use crate::impedance::{
    ImpedanceMatrix, ImpedanceModel, ImpedanceSynthesizer, CAPACITY_FLOOR_GW, DEFAULT_SEED,
};
use crate::topology::{compute_statistics, NetworkStatistics};

/// Knobs for a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub seed: u64,
    pub model: ImpedanceModel,
    pub capacity_floor_gw: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            model: ImpedanceModel::default(),
            capacity_floor_gw: CAPACITY_FLOOR_GW,
        }
    }
}

impl AnalysisOptions {
    pub fn synthesizer(&self) -> ImpedanceSynthesizer {
        ImpedanceSynthesizer::new(self.seed)
            .with_model(self.model)
            .with_capacity_floor(self.capacity_floor_gw)
    }
}

/// Immutable bundle of everything derived from one network.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub operators: Vec<Operator>,
    pub interconnections: Vec<Interconnection>,
    pub impedance: ImpedanceMatrix,
    pub statistics: NetworkStatistics,
    pub diagnostics: Diagnostics,
}

impl AnalyticsSnapshot {
    /// Attach the diagnostics produced while loading the input.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Analyze `network` using the capacities stored on its operators.
pub fn analyze(network: &Network, options: &AnalysisOptions) -> AnalyticsSnapshot {
    analyze_with_capacity(network, &network.capacities(), options)
}

pub fn analyze_with_capacity(
    network: &Network,
    capacity: &CapacityMap,
    options: &AnalysisOptions,
) -> AnalyticsSnapshot {
    let impedance = options.synthesizer().synthesize(network, capacity);
    let statistics = compute_statistics(network);
    info!(
        operators = statistics.node_count,
        interconnections = statistics.edge_count,
        connected = statistics.is_connected,
        "network analysis complete"
    );

    AnalyticsSnapshot {
        operators: network.operators().cloned().collect(),
        interconnections: network.interconnections().cloned().collect(),
        impedance,
        statistics,
        diagnostics: Diagnostics::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jgrid_core::{OperatorId, OperatorSite};

    fn sample() -> Network {
        let sites = vec![
            OperatorSite::new("A", 0.0, 0.0),
            OperatorSite::new("B", 1.0, 0.0),
        ];
        let connections = vec![(OperatorId::from("A"), OperatorId::from("B"))];
        Network::build(&sites, &CapacityMap::new(), &connections)
    }

    #[test]
    fn test_snapshot_contents() {
        let mut diag = Diagnostics::new();
        diag.add_warning("capacity", "defaulted");

        let snapshot = analyze(&sample(), &AnalysisOptions::default()).with_diagnostics(diag);
        assert_eq!(snapshot.operators.len(), 2);
        assert_eq!(snapshot.interconnections.len(), 1);
        assert_eq!(snapshot.impedance.size(), 2);
        assert_eq!(snapshot.impedance.seed, DEFAULT_SEED);
        assert_eq!(snapshot.statistics.edge_count, 1);
        assert_eq!(snapshot.diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_options_feed_synthesizer() {
        let options = AnalysisOptions {
            seed: 99,
            model: ImpedanceModel::Uniform,
            ..AnalysisOptions::default()
        };
        let snapshot = analyze(&sample(), &options);
        assert_eq!(snapshot.impedance.seed, 99);
        assert_eq!(snapshot.impedance.model, ImpedanceModel::Uniform);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = analyze(&sample(), &AnalysisOptions::default());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["impedance"]["labels"], serde_json::json!(["A", "B"]));
        assert_eq!(json["statistics"]["is_connected"], serde_json::json!(true));
        assert!(json["operators"][0]["position"]["latitude"].is_number());
    }
}
