use std::collections::BTreeMap;
use std::io::{self, Write};

use anyhow::Result;
use jgrid_cli::cli::InputArgs;
use jgrid_io::{GridConfig, REFERENCE_OPERATORS};
use tabwriter::TabWriter;

use crate::common::{format_fixed, prepare_input};

pub fn handle(input: &InputArgs, config: &GridConfig) -> Result<()> {
    let prepared = prepare_input(input, config);
    let network = &prepared.network;
    let decimals = config.output.decimal_places;

    println!("Network: {}", network.stats());
    println!();

    // largest operators first
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "OPERATOR\tNAME\tLAT\tLON\tCAPACITY_GW\tSHARE\tDEGREE")?;
    for (operator, share) in network.capacity_ranking() {
        let native = REFERENCE_OPERATORS
            .iter()
            .find(|op| op.id == operator.label())
            .map(|op| op.native_name)
            .unwrap_or("-");
        writeln!(
            writer,
            "{}\t{}\t{:.1}\t{:.1}\t{:.1}\t{:.1}%\t{}",
            operator.id,
            native,
            operator.position.latitude.value(),
            operator.position.longitude.value(),
            operator.capacity.value(),
            share,
            network.degree(operator.label())
        )?;
    }
    writer.flush()?;
    println!();

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "FROM\tTO\tDISTANCE")?;
    for line in network.interconnections() {
        writeln!(
            writer,
            "{}\t{}\t{}",
            line.from,
            line.to,
            format_fixed(line.distance, decimals)
        )?;
    }
    writer.flush()?;
    println!();

    let mut distribution: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for operator in network.operators() {
        distribution
            .entry(network.degree(operator.label()))
            .or_default()
            .push(operator.label());
    }
    println!("Degree distribution:");
    for (degree, operators) in &distribution {
        println!("  {degree}: {}", operators.join(", "));
    }

    println!();
    println!("Input diagnostics: {}", prepared.diagnostics.summary());
    Ok(())
}
