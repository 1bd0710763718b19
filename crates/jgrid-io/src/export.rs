//! Snapshot exporters.
//!
//! - JSON: the whole [`AnalyticsSnapshot`], pretty-printed.
//! - CSV: two files next to each other, `<stem>_impedance.csv` (square matrix
//!   with a header row of operator ids) and `<stem>_nodes.csv` (one row of
//!   metrics per operator).

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::WriterBuilder;
use jgrid_algo::{AnalyticsSnapshot, ImpedanceMatrix};
use jgrid_core::{GridError, GridResult};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(GridError::Parse(format!(
                "unknown export format '{other}' (expected json or csv)"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        })
    }
}

pub fn write_snapshot_json<W: Write>(
    snapshot: &AnalyticsSnapshot,
    mut writer: W,
) -> GridResult<()> {
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_impedance_csv<W: Write>(matrix: &ImpedanceMatrix, writer: W) -> GridResult<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = vec![String::from("operator")];
    header.extend(matrix.labels.iter().map(|id| id.to_string()));
    wtr.write_record(&header).map_err(csv_error)?;

    for (id, row) in matrix.rows() {
        let mut record = vec![id.to_string()];
        record.extend(row.iter().map(|value| value.to_string()));
        wtr.write_record(&record).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per operator: id, capacity, degree and centralities.
///
/// Betweenness is left empty when the network is disconnected.
pub fn write_node_metrics_csv<W: Write>(
    snapshot: &AnalyticsSnapshot,
    writer: W,
) -> GridResult<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "operator",
        "capacity_gw",
        "degree",
        "degree_centrality",
        "betweenness_centrality",
    ])
    .map_err(csv_error)?;

    let stats = &snapshot.statistics;
    for operator in &snapshot.operators {
        let id = operator.id.as_str();
        let degree = snapshot
            .interconnections
            .iter()
            .filter(|line| line.from.as_str() == id || line.to.as_str() == id)
            .count();
        let degree_centrality = stats.degree_centrality.get(id).unwrap_or(0.0);
        let betweenness = stats
            .betweenness_centrality
            .as_ref()
            .and_then(|metrics| metrics.get(id))
            .map(|value| value.to_string())
            .unwrap_or_default();

        wtr.write_record([
            id.to_string(),
            operator.capacity.value().to_string(),
            degree.to_string(),
            degree_centrality.to_string(),
            betweenness,
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `snapshot` to `out` and return the files created.
///
/// For CSV, `out` names the stem: `report.csv` produces `report_impedance.csv`
/// and `report_nodes.csv` in the same directory.
pub fn export_snapshot(
    snapshot: &AnalyticsSnapshot,
    format: ExportFormat,
    out: &Path,
) -> GridResult<Vec<PathBuf>> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let written = match format {
        ExportFormat::Json => {
            let file = std::fs::File::create(out)?;
            write_snapshot_json(snapshot, std::io::BufWriter::new(file))?;
            vec![out.to_path_buf()]
        }
        ExportFormat::Csv => {
            let impedance_path = sibling(out, "impedance");
            let nodes_path = sibling(out, "nodes");
            write_impedance_csv(&snapshot.impedance, std::fs::File::create(&impedance_path)?)?;
            write_node_metrics_csv(snapshot, std::fs::File::create(&nodes_path)?)?;
            vec![impedance_path, nodes_path]
        }
    };

    info!(format = %format, files = written.len(), "snapshot exported");
    Ok(written)
}

fn sibling(out: &Path, suffix: &str) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "jgrid".to_string());
    out.with_file_name(format!("{stem}_{suffix}.csv"))
}

fn csv_error(e: csv::Error) -> GridError {
    GridError::Parse(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jgrid_algo::{analyze, AnalysisOptions};
    use jgrid_core::{Gigawatts, Network, OperatorId, OperatorSite};

    fn snapshot() -> AnalyticsSnapshot {
        let sites = vec![
            OperatorSite::new("A", 0.0, 0.0),
            OperatorSite::new("B", 0.0, 1.0),
            OperatorSite::new("C", 0.0, 2.0),
        ];
        let capacity = [("A", 1.0), ("B", 2.0), ("C", 3.0)]
            .into_iter()
            .map(|(id, gw)| (OperatorId::from(id), Gigawatts(gw)))
            .collect();
        let links = vec![
            (OperatorId::from("A"), OperatorId::from("B")),
            (OperatorId::from("B"), OperatorId::from("C")),
        ];
        analyze(
            &Network::build(&sites, &capacity, &links),
            &AnalysisOptions::default(),
        )
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_impedance_csv_layout() {
        let snapshot = snapshot();
        let mut buf = Vec::new();
        write_impedance_csv(&snapshot.impedance, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "operator,A,B,C");
        assert!(lines[1].starts_with("A,"));
        // A and C are not directly connected
        assert!(lines[1].ends_with(",0"));
    }

    #[test]
    fn test_node_metrics_csv() {
        let snapshot = snapshot();
        let mut buf = Vec::new();
        write_node_metrics_csv(&snapshot, &mut buf).unwrap();

        let mut rdr = csv::Reader::from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][0], "B");
        assert_eq!(&rows[1][2], "2");
        assert_eq!(rows[1][3].parse::<f64>().unwrap(), 1.0);
        assert_eq!(rows[1][4].parse::<f64>().unwrap(), 1.0);
    }

    #[test]
    fn test_export_csv_writes_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out/report.csv");
        let files = export_snapshot(&snapshot(), ExportFormat::Csv, &out).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("report_impedance.csv"));
        assert!(files.iter().all(|f| f.exists()));
    }

    #[test]
    fn test_export_json_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        export_snapshot(&snapshot(), ExportFormat::Json, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["statistics"]["diameter"], serde_json::json!(2));
        assert_eq!(value["operators"].as_array().unwrap().len(), 3);
    }
}
