use std::io::{self, Write};

use anyhow::Result;
use jgrid_algo::{ImpedanceMatrix, ImpedanceModel, ImpedanceSynthesizer};
use jgrid_cli::cli::InputArgs;
use jgrid_io::{GridConfig, OutputConfig};
use tabwriter::TabWriter;
use tracing::info;

use crate::common::{format_fixed, prepare_input};

pub fn handle(
    input: &InputArgs,
    config: &GridConfig,
    seed: Option<u64>,
    model: Option<ImpedanceModel>,
) -> Result<()> {
    let prepared = prepare_input(input, config);
    let seed = seed.unwrap_or(config.analysis.seed);
    let model = model.unwrap_or(config.analysis.impedance_model);
    info!("Synthesizing impedance matrix (model {model}, seed {seed})");

    let matrix = ImpedanceSynthesizer::new(seed)
        .with_model(model)
        .synthesize(&prepared.network, &prepared.validated.capacity_map());

    println!("Impedance matrix [p.u.] (model {model}, seed {seed})");
    print_matrix(&matrix, &config.output)?;
    println!("{} = no direct interconnection", config.output.infinity_symbol);
    Ok(())
}

/// Off-diagonal zeros are shown as the configured infinity symbol.
fn print_matrix(matrix: &ImpedanceMatrix, output: &OutputConfig) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    let header: Vec<&str> = matrix.labels.iter().map(|id| id.as_str()).collect();
    writeln!(writer, "\t{}", header.join("\t"))?;

    for (i, (id, row)) in matrix.rows().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(j, value)| {
                if i != j && *value == 0.0 {
                    output.infinity_symbol.clone()
                } else {
                    format_fixed(*value, output.decimal_places)
                }
            })
            .collect();
        writeln!(writer, "{}\t{}", id, cells.join("\t"))?;
    }
    writer.flush()?;
    Ok(())
}
