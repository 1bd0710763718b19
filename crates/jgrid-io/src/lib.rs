//! # jgrid-io: Input, Configuration and Export
//!
//! Everything that touches the filesystem lives here:
//!
//! - [`loaders`] - capacity / connection CSV tables with reference fallback
//! - [`validate`] - normalization and repair of raw records
//! - [`reference`] - built-in nine-operator tables
//! - [`config`] - JSON configuration with deep-merged defaults
//! - [`export`] - JSON and CSV snapshot writers
//!
//! [`prepare`] runs the usual pipeline: load both tables, validate them
//! against the reference sites and build the network.
//!
//! ```
//! use jgrid_io::{prepare, RawInputs, ValidationPolicy};
//!
//! let input = prepare(RawInputs::reference(), &ValidationPolicy::default());
//! assert_eq!(input.network.node_count(), 9);
//! assert_eq!(input.network.edge_count(), 9);
//! assert!(input.diagnostics.is_empty());
//! ```

use jgrid_core::{Diagnostics, Network, OperatorSite};
use tracing::debug;

pub mod config;
pub mod export;
pub mod loaders;
pub mod reference;
pub mod validate;

pub use config::{deep_merge, AnalysisConfig, DataConfig, GridConfig, OutputConfig};
pub use export::{
    export_snapshot, write_impedance_csv, write_node_metrics_csv, write_snapshot_json, ExportFormat,
};
pub use loaders::{
    load_capacity, load_connections, load_inputs, read_capacity_csv, read_connections_csv,
    LoadedTable, RawInputs, TableSource,
};
pub use reference::{
    canonical_operator_id, reference_sites, ReferenceOperator, REFERENCE_CONNECTIONS,
    REFERENCE_OPERATORS,
};
pub use validate::{
    CapacityRecord, CapacityValue, ConnectionRecord, DataValidator, ValidatedInput,
    ValidationPolicy, ValidationStats,
};

/// Validated input and the network built from it.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub sites: Vec<OperatorSite>,
    pub validated: ValidatedInput,
    pub network: Network,
    /// Load and validation issues, in that order
    pub diagnostics: Diagnostics,
}

/// Validate `raw` against the reference sites and build the network.
pub fn prepare(raw: RawInputs, policy: &ValidationPolicy) -> PreparedInput {
    let sites = reference_sites();
    let validated = DataValidator::from_sites(&sites)
        .with_policy(policy.clone())
        .validate(&raw.capacity.records, &raw.connections.records);
    let network = validated.build_network(&sites);

    let mut diagnostics = raw.diagnostics();
    diagnostics.merge(validated.diagnostics.clone());
    debug!(
        operators = network.node_count(),
        interconnections = network.edge_count(),
        issues = diagnostics.issues.len(),
        "input prepared"
    );

    PreparedInput {
        sites,
        validated,
        network,
        diagnostics,
    }
}
