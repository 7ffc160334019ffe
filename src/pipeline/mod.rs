// Cleaning pipeline: load, normalize, deduplicate, emit.

pub mod dedupe;
pub mod emit;
pub mod loader;
pub mod normalize;

use std::path::PathBuf;

use tracing::info;

use crate::config::CleanConfig;
use crate::error::Result;
use dedupe::Deduplicator;
use normalize::{RowOutcome, StationNormalizer, StationRecord};

/// Counters and artifact paths from one cleaning run.
///
/// Invariant: `rows_read = rows_retained + invalid_coordinates + duplicates`.
#[derive(Debug)]
pub struct CleanSummary {
    pub rows_read: usize,
    pub rows_retained: usize,
    pub invalid_coordinates: usize,
    pub duplicates: usize,
    pub output_csv: PathBuf,
    pub output_geojson: PathBuf,
}

/// Runs the full cleaning pass described by `config`: reads the source CSV,
/// normalizes and validates every row, drops duplicates, and writes the
/// cleaned CSV plus the GeoJSON FeatureCollection. Both outputs carry the
/// same records in the same first-seen order.
pub fn run(config: &CleanConfig) -> Result<CleanSummary> {
    let source = loader::load_csv(&config.input_csv)?;
    let rows_read = source.rows.len();

    let normalizer = StationNormalizer::new(&source.headers);
    let mut deduplicator = Deduplicator::new();
    let mut invalid_coordinates = 0usize;
    let mut cleaned: Vec<StationRecord> = Vec::new();

    for raw in &source.rows {
        match normalizer.normalize_row(raw) {
            RowOutcome::Accepted(record) => {
                if deduplicator.insert(&record) {
                    cleaned.push(record);
                }
            }
            RowOutcome::InvalidCoordinates => invalid_coordinates += 1,
        }
    }

    let fields = emit::output_fields(&source.headers);
    emit::write_csv(&config.output_csv, &fields, &cleaned)?;
    emit::write_geojson(&config.output_geojson, &cleaned)?;

    let summary = CleanSummary {
        rows_read,
        rows_retained: cleaned.len(),
        invalid_coordinates,
        duplicates: deduplicator.duplicate_count(),
        output_csv: config.output_csv.clone(),
        output_geojson: config.output_geojson.clone(),
    };
    info!(
        rows_read = summary.rows_read,
        retained = summary.rows_retained,
        invalid_coordinates = summary.invalid_coordinates,
        duplicates = summary.duplicates,
        "cleaning run complete"
    );
    Ok(summary)
}
