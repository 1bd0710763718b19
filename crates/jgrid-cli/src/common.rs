//! Input loading shared by the analysis commands.

use std::path::Path;

use jgrid_cli::cli::InputArgs;
use jgrid_core::{Diagnostics, Severity};
use jgrid_io::{load_inputs, prepare, GridConfig, PreparedInput};
use tracing::{error, info, warn};

pub fn load_config(path: Option<&Path>) -> GridConfig {
    GridConfig::load_or_default(path)
}

/// Load both tables (flags first, then config), validate and build the network.
pub fn prepare_input(input: &InputArgs, config: &GridConfig) -> PreparedInput {
    let capacity_csv = input
        .capacity_csv
        .as_deref()
        .unwrap_or(&config.data.capacity_csv);
    let connections_csv = input
        .connections_csv
        .as_deref()
        .unwrap_or(&config.data.connections_csv);

    let raw = load_inputs(Some(capacity_csv), Some(connections_csv));
    info!(
        "Capacity from {}, connections from {}",
        raw.capacity.source, raw.connections.source
    );

    let prepared = prepare(raw, &config.validation_policy());
    report_diagnostics(&prepared.diagnostics);
    prepared
}

/// Replay diagnostics to the log.
pub fn report_diagnostics(diagnostics: &Diagnostics) {
    for issue in &diagnostics.issues {
        match issue.severity {
            Severity::Warning => warn!("{issue}"),
            Severity::Error => error!("{issue}"),
        }
    }
}

pub fn format_fixed(value: f64, decimal_places: usize) -> String {
    format!("{value:.decimal_places$}")
}
