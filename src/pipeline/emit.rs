use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::constants;
use crate::error::Result;
use crate::pipeline::normalize::{key_name, StationRecord};

/// Builds the cleaned-CSV column list: canonical keys of the original
/// headers (minus latitude/longitude) in source column order, then any of
/// the fixed output fields not already present. Duplicate canonical keys
/// keep their first position only.
pub fn output_fields(headers: &[String]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for header in headers {
        let key = key_name(header);
        if key == "latitude" || key == "longitude" || fields.contains(&key) {
            continue;
        }
        fields.push(key);
    }
    for fixed in constants::FIXED_OUTPUT_FIELDS {
        if !fields.iter().any(|f| f == fixed) {
            fields.push(fixed.to_string());
        }
    }
    fields
}

/// Renders one output cell. The typed core fields win over any passthrough
/// value that canonicalized onto the same key; missing values render empty.
fn csv_value(record: &StationRecord, field: &str) -> String {
    match field {
        "latitude" => record.latitude.to_string(),
        "longitude" => record.longitude.to_string(),
        "ev_level1_evse_num" => record.ev_level1_evse_num.to_string(),
        "ev_level2_evse_num" => record.ev_level2_evse_num.to_string(),
        "ev_dc_fast_count" => record.ev_dc_fast_count.to_string(),
        "ev_connector_types" => record.ev_connector_types.join(";"),
        _ => record.extra.get(field).cloned().unwrap_or_default(),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

/// Writes the cleaned CSV, one row per retained record.
pub fn write_csv(path: &Path, fields: &[String], records: &[StationRecord]) -> Result<()> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(fields)?;
    for record in records {
        writer.write_record(fields.iter().map(|f| csv_value(record, f)))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "wrote cleaned CSV");
    Ok(())
}

#[derive(Debug, Serialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: PointGeometry,
    properties: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// GeoJSON convention: longitude first.
    coordinates: [f64; 2],
}

/// Feature properties carry the full record minus the coordinates, which
/// live in the geometry. Typed fields overwrite any passthrough value that
/// landed on the same canonical key; connectors stay a JSON array.
fn feature_properties(record: &StationRecord) -> Map<String, Value> {
    let mut props = Map::new();
    for (key, value) in &record.extra {
        props.insert(key.clone(), Value::String(value.clone()));
    }
    props.insert(
        "ev_level1_evse_num".to_string(),
        record.ev_level1_evse_num.into(),
    );
    props.insert(
        "ev_level2_evse_num".to_string(),
        record.ev_level2_evse_num.into(),
    );
    props.insert(
        "ev_dc_fast_count".to_string(),
        record.ev_dc_fast_count.into(),
    );
    props.insert(
        "ev_connector_types".to_string(),
        Value::Array(
            record
                .ev_connector_types
                .iter()
                .cloned()
                .map(Value::String)
                .collect(),
        ),
    );
    props
}

/// Writes the GeoJSON FeatureCollection, one Point feature per retained
/// record, in the same order as the CSV rows. Pretty-printed, UTF-8.
pub fn write_geojson(path: &Path, records: &[StationRecord]) -> Result<()> {
    ensure_parent_dir(path)?;

    let collection = FeatureCollection {
        kind: "FeatureCollection",
        features: records
            .iter()
            .map(|record| Feature {
                kind: "Feature",
                geometry: PointGeometry {
                    kind: "Point",
                    coordinates: [record.longitude, record.latitude],
                },
                properties: feature_properties(record),
            })
            .collect(),
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &collection)?;
    writer.flush()?;

    info!(path = %path.display(), features = records.len(), "wrote GeoJSON FeatureCollection");
    Ok(())
}
