//! # jgrid-algo: Network Analytics
//!
//! Algorithms that run over a built [`jgrid_core::Network`]:
//!
//! | Module | Output |
//! |--------|--------|
//! | [`impedance`] | seeded, symmetric [`ImpedanceMatrix`] |
//! | [`topology`] | density, connectivity, diameter, clustering, centralities |
//! | [`analysis`] | [`AnalyticsSnapshot`] combining both |
//!
//! Everything here is synchronous and side-effect free apart from tracing
//! events; rerunning with the same network and options reproduces the same
//! snapshot.
//!
//! ```
//! use jgrid_algo::{analyze, AnalysisOptions};
//! use jgrid_core::{CapacityMap, Network, OperatorId, OperatorSite};
//!
//! let sites = vec![
//!     OperatorSite::new("Kansai", 34.7, 135.5),
//!     OperatorSite::new("Shikoku", 33.8, 133.5),
//! ];
//! let links = vec![(OperatorId::from("Kansai"), OperatorId::from("Shikoku"))];
//! let network = Network::build(&sites, &CapacityMap::new(), &links);
//!
//! let snapshot = analyze(&network, &AnalysisOptions::default());
//! assert!(snapshot.impedance.is_symmetric());
//! assert_eq!(snapshot.statistics.diameter, Some(1));
//! ```

pub mod analysis;
pub mod impedance;
pub mod topology;

pub use analysis::{analyze, analyze_with_capacity, AnalysisOptions, AnalyticsSnapshot};
pub use impedance::{
    synthesize_impedance, ImpedanceMatrix, ImpedanceModel, ImpedanceSynthesizer,
    CAPACITY_FLOOR_GW, DEFAULT_SEED,
};
pub use topology::{compute_statistics, DegreeSummary, NetworkStatistics, NodeMetrics};
