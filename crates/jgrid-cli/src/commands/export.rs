use std::path::Path;

use anyhow::{Context, Result};
use jgrid_algo::analyze_with_capacity;
use jgrid_cli::cli::InputArgs;
use jgrid_io::{export_snapshot, ExportFormat, GridConfig};
use tracing::info;

use crate::common::prepare_input;

pub fn handle(
    input: &InputArgs,
    config: &GridConfig,
    format: ExportFormat,
    out: &Path,
) -> Result<()> {
    let prepared = prepare_input(input, config);
    let snapshot = analyze_with_capacity(
        &prepared.network,
        &prepared.validated.capacity_map(),
        &config.analysis_options(),
    )
    .with_diagnostics(prepared.diagnostics);

    info!("Exporting {format} snapshot to {}", out.display());
    let written = export_snapshot(&snapshot, format, out)
        .with_context(|| format!("exporting snapshot to {}", out.display()))?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
