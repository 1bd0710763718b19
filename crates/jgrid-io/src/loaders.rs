//! CSV loaders for capacity and connection tables.
//!
//! Both tables are read with headers. Columns are matched by name, and the
//! native-script headers of the historical data files are accepted as
//! aliases:
//!
//! | table | columns |
//! |-------|---------|
//! | capacity | `operator` / `電力会社`, `capacity_gw` / `発電能力_GW` |
//! | connections | `from` / `電力会社1`, `to` / `電力会社2` |
//!
//! Strict readers ([`read_capacity_csv`], [`read_connections_csv`]) return
//! `Err` when the file cannot be opened or a required column is missing.
//! Malformed rows never fail the read; they become diagnostics. The lenient
//! loaders ([`load_capacity`], [`load_connections`], [`load_inputs`]) turn a
//! strict failure into a fallback to the reference tables.

use std::fmt;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use jgrid_core::{Diagnostics, GridError, GridResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::reference::{reference_capacity_records, reference_connection_records};
use crate::validate::{CapacityRecord, ConnectionRecord};

const CAPACITY_COLUMNS: [(&str, &str); 2] =
    [("operator", "電力会社"), ("capacity_gw", "発電能力_GW")];
const CONNECTION_COLUMNS: [(&str, &str); 2] = [("from", "電力会社1"), ("to", "電力会社2")];

#[derive(Debug, Deserialize)]
struct CapacityRow {
    #[serde(alias = "電力会社")]
    operator: String,
    // Kept as text so the validator can report unparsable values.
    #[serde(alias = "発電能力_GW")]
    capacity_gw: String,
}

#[derive(Debug, Deserialize)]
struct ConnectionRow {
    #[serde(alias = "電力会社1")]
    from: String,
    #[serde(alias = "電力会社2")]
    to: String,
}

/// Where a table's records came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    File(PathBuf),
    Reference,
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::File(path) => write!(f, "{}", path.display()),
            TableSource::Reference => write!(f, "built-in reference table"),
        }
    }
}

/// Records read from one table, plus the issues found while reading it.
#[derive(Debug, Clone)]
pub struct LoadedTable<T> {
    pub records: Vec<T>,
    pub source: TableSource,
    pub diagnostics: Diagnostics,
}

/// Raw, unvalidated input for both tables.
#[derive(Debug, Clone)]
pub struct RawInputs {
    pub capacity: LoadedTable<CapacityRecord>,
    pub connections: LoadedTable<ConnectionRecord>,
}

impl RawInputs {
    /// Reference tables, no file access.
    pub fn reference() -> Self {
        Self {
            capacity: LoadedTable {
                records: reference_capacity_records(),
                source: TableSource::Reference,
                diagnostics: Diagnostics::new(),
            },
            connections: LoadedTable {
                records: reference_connection_records(),
                source: TableSource::Reference,
                diagnostics: Diagnostics::new(),
            },
        }
    }

    /// Read diagnostics from both tables, capacity first.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diag = self.capacity.diagnostics.clone();
        diag.merge(self.connections.diagnostics.clone());
        diag
    }
}

pub fn read_capacity_csv(path: &Path) -> GridResult<(Vec<CapacityRecord>, Diagnostics)> {
    let (rows, diag) = read_table::<CapacityRow>(path, "capacity", &CAPACITY_COLUMNS)?;
    let records = rows
        .into_iter()
        .map(|(row, line)| CapacityRecord::from_text(row.operator, row.capacity_gw).at_line(line))
        .collect();
    Ok((records, diag))
}

pub fn read_connections_csv(path: &Path) -> GridResult<(Vec<ConnectionRecord>, Diagnostics)> {
    let (rows, diag) = read_table::<ConnectionRow>(path, "connection", &CONNECTION_COLUMNS)?;
    let records = rows
        .into_iter()
        .map(|(row, line)| ConnectionRecord::new(row.from, row.to).at_line(line))
        .collect();
    Ok((records, diag))
}

pub fn load_capacity(path: Option<&Path>) -> LoadedTable<CapacityRecord> {
    load_or_reference(path, "capacity", read_capacity_csv, reference_capacity_records)
}

pub fn load_connections(path: Option<&Path>) -> LoadedTable<ConnectionRecord> {
    load_or_reference(
        path,
        "connection",
        read_connections_csv,
        reference_connection_records,
    )
}

/// Load both tables, falling back per table. Never fails.
pub fn load_inputs(capacity_csv: Option<&Path>, connections_csv: Option<&Path>) -> RawInputs {
    RawInputs {
        capacity: load_capacity(capacity_csv),
        connections: load_connections(connections_csv),
    }
}

fn load_or_reference<T>(
    path: Option<&Path>,
    category: &str,
    read: impl Fn(&Path) -> GridResult<(Vec<T>, Diagnostics)>,
    reference: impl Fn() -> Vec<T>,
) -> LoadedTable<T> {
    let Some(path) = path else {
        debug!(table = category, "no file given, using reference table");
        return LoadedTable {
            records: reference(),
            source: TableSource::Reference,
            diagnostics: Diagnostics::new(),
        };
    };

    match read(path) {
        Ok((records, diagnostics)) => {
            info!(
                table = category,
                path = %path.display(),
                records = records.len(),
                "loaded table"
            );
            LoadedTable {
                records,
                source: TableSource::File(path.to_path_buf()),
                diagnostics,
            }
        }
        Err(e) => {
            warn!(table = category, error = %e, "falling back to reference table");
            let mut diagnostics = Diagnostics::new();
            diagnostics.add_warning_with_entity(
                "source",
                &format!("{e}; using built-in reference {category} table"),
                &path.display().to_string(),
            );
            LoadedTable {
                records: reference(),
                source: TableSource::Reference,
                diagnostics,
            }
        }
    }
}

/// Read a headed CSV table into rows tagged with their 1-based line number.
fn read_table<T: DeserializeOwned>(
    path: &Path,
    category: &str,
    columns: &[(&str, &str)],
) -> GridResult<(Vec<(T, usize)>, Diagnostics)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers = rdr.headers().map_err(|e| csv_error(path, e))?.clone();
    for (name, alias) in columns {
        if !headers.iter().any(|h| h == *name || h == *alias) {
            return Err(GridError::Validation(format!(
                "{}: missing column '{}' (or '{}')",
                path.display(),
                name,
                alias
            )));
        }
    }

    let mut rows = Vec::new();
    let mut diag = Diagnostics::new();
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                diag.add_error_at_line(category, &format!("malformed row skipped: {e}"), line);
                continue;
            }
        };
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => rows.push((row, line)),
            Err(e) => {
                diag.add_error_at_line(category, &format!("malformed row skipped: {e}"), line)
            }
        }
    }
    Ok((rows, diag))
}

fn csv_error(path: &Path, e: csv::Error) -> GridError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => GridError::Io(io),
        other => GridError::Parse(format!("{}: {:?}", path.display(), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_capacity_english_headers() {
        let file = csv_file("operator,capacity_gw\nTokyo, 52.8\nChubu,abc\n");
        let (records, diag) = read_capacity_csv(file.path()).unwrap();

        assert!(diag.is_empty());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], CapacityRecord::from_text("Tokyo", "52.8").at_line(2));
        assert_eq!(records[1].line, Some(3));
    }

    #[test]
    fn test_read_native_headers() {
        let file = csv_file("電力会社1,電力会社2\n北海道,東北\n");
        let (records, _) = read_connections_csv(file.path()).unwrap();
        assert_eq!(records, vec![ConnectionRecord::new("北海道", "東北").at_line(2)]);

        let file = csv_file("電力会社,発電能力_GW\n東京,52.8\n");
        let (records, _) = read_capacity_csv(file.path()).unwrap();
        assert_eq!(records[0].operator, "東京");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let file = csv_file("operator,gw\nTokyo,1\n");
        let err = read_capacity_csv(file.path()).unwrap_err();
        assert!(matches!(err, GridError::Validation(_)));
        assert!(err.to_string().contains("capacity_gw"));
    }

    #[test]
    fn test_short_row_becomes_diagnostic() {
        let file = csv_file("from,to\nTokyo,Chubu\nKansai\nKansai,Shikoku\n");
        let (records, diag) = read_connections_csv(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.errors().next().unwrap().line, Some(3));
    }

    #[test]
    fn test_missing_file_falls_back_to_reference() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_capacity(Some(&dir.path().join("absent.csv")));

        assert_eq!(table.source, TableSource::Reference);
        assert_eq!(table.records.len(), 9);
        assert_eq!(table.diagnostics.warning_count(), 1);
        assert_eq!(table.diagnostics.issues[0].category, "source");
    }

    #[test]
    fn test_no_path_uses_reference_silently() {
        let inputs = load_inputs(None, None);
        assert_eq!(inputs.connections.records.len(), 9);
        assert!(inputs.diagnostics().is_empty());
    }
}
