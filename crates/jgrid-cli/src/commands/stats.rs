use std::io::{self, Write};

use anyhow::Result;
use jgrid_algo::compute_statistics;
use jgrid_cli::cli::{InputArgs, OutputFormat};
use jgrid_io::GridConfig;
use tabwriter::TabWriter;

use crate::common::{format_fixed, prepare_input};

pub fn handle(input: &InputArgs, config: &GridConfig, format: OutputFormat) -> Result<()> {
    let prepared = prepare_input(input, config);
    let stats = compute_statistics(&prepared.network);

    if format == OutputFormat::Json {
        serde_json::to_writer_pretty(io::stdout(), &stats)?;
        println!();
        return Ok(());
    }

    let d = config.output.decimal_places;
    let or_na = |value: Option<String>| value.unwrap_or_else(|| "n/a (disconnected)".to_string());

    println!("Network statistics:");
    println!("  Operators        : {}", stats.node_count);
    println!("  Interconnections : {}", stats.edge_count);
    println!("  Density          : {}", format_fixed(stats.density, d));
    println!(
        "  Connected        : {}",
        if stats.is_connected { "yes" } else { "no" }
    );
    println!("  Components       : {}", stats.component_count);
    println!(
        "  Diameter         : {}",
        or_na(stats.diameter.map(|hops| hops.to_string()))
    );
    println!(
        "  Avg shortest path: {}",
        or_na(stats.average_shortest_path.map(|v| format_fixed(v, d)))
    );
    println!(
        "  Avg clustering   : {}",
        format_fixed(stats.average_clustering, d)
    );
    println!("  Degree [min/avg/max]: {}", stats.degree);
    println!("  Total capacity   : {:.1} GW", stats.total_capacity_gw);
    println!();

    // most central first
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "OPERATOR\tDEGREE_CENTRALITY\tBETWEENNESS")?;
    for (id, degree_centrality) in stats.degree_centrality.ranked() {
        let betweenness = stats
            .betweenness_centrality
            .as_ref()
            .and_then(|metrics| metrics.get(id.as_str()))
            .map(|value| format_fixed(value, d))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            writer,
            "{}\t{}\t{}",
            id,
            format_fixed(degree_centrality, d),
            betweenness
        )?;
    }
    writer.flush()?;
    Ok(())
}
