use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CleanError, Result};
use crate::pipeline::normalize::normalize_header;

/// A single source row keyed by the original header strings.
pub type RawRecord = HashMap<String, String>;

/// The full source table: original headers in column order plus all rows.
#[derive(Debug)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

/// Reads the source CSV, preserving original header strings and row order.
/// The first line is the header row. Short rows are tolerated; the missing
/// cells simply stay absent from the record.
pub fn load_csv(path: &Path) -> Result<SourceTable> {
    if !path.exists() {
        return Err(CleanError::MissingInput(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let display_headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    debug!(columns = ?display_headers, "parsed header row");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRecord = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.to_string()))
            .collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(CleanError::EmptyInput);
    }

    info!(rows = rows.len(), path = %path.display(), "loaded source CSV");
    Ok(SourceTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let result = load_csv(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(CleanError::MissingInput(_))));
    }

    #[test]
    fn header_only_file_is_empty_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "Station Name,Latitude,Longitude\n").unwrap();
        assert!(matches!(load_csv(&path), Err(CleanError::EmptyInput)));
    }

    #[test]
    fn preserves_headers_and_row_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(
            &path,
            "Station Name,Latitude,Longitude\nAlpha,47.6,-122.3\nBeta,47.7,-122.4\n",
        )
        .unwrap();

        let table = load_csv(&path).unwrap();
        assert_eq!(table.headers, vec!["Station Name", "Latitude", "Longitude"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Station Name"], "Alpha");
        assert_eq!(table.rows[1]["Latitude"], "47.7");
    }

    #[test]
    fn short_rows_leave_cells_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "A,B,C\n1,2\n").unwrap();

        let table = load_csv(&path).unwrap();
        assert_eq!(table.rows[0].get("B").map(String::as_str), Some("2"));
        assert_eq!(table.rows[0].get("C"), None);
    }
}
