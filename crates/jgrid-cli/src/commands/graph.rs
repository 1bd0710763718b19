use std::fs;
use std::path::Path;

use anyhow::Result;
use jgrid_cli::cli::{GraphCommands, InputArgs};
use jgrid_core::graph_utils;
use jgrid_io::GridConfig;

use crate::common::prepare_input;

pub fn handle(command: &GraphCommands, config: &GridConfig) -> Result<()> {
    match command {
        GraphCommands::Islands { input, emit } => {
            let prepared = prepare_input(input, config);
            let analysis = graph_utils::find_islands(&prepared.network);
            for summary in &analysis.islands {
                println!(
                    "Island {}: {} operator(s): {}",
                    summary.island_id,
                    summary.operators.len(),
                    summary.operators.join(", ")
                );
            }
            if *emit {
                println!("\nOperator → Island assignments:");
                for assignment in &analysis.assignments {
                    println!(
                        "  idx {:>3}: {:<12} -> island {}",
                        assignment.node_index, assignment.label, assignment.island_id
                    );
                }
            }
            Ok(())
        }
        GraphCommands::Dot { input, out } => export(input, config, "dot", out.as_deref()),
        GraphCommands::Graphml { input, out } => export(input, config, "graphml", out.as_deref()),
    }
}

fn export(input: &InputArgs, config: &GridConfig, format: &str, out: Option<&Path>) -> Result<()> {
    let prepared = prepare_input(input, config);
    let text = graph_utils::export_graph(&prepared.network, format)?;
    if let Some(path) = out {
        fs::write(path, &text)?;
        println!("Graph exported to {}", path.display());
    } else {
        println!("{text}");
    }
    Ok(())
}
