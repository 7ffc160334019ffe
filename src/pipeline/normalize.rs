use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::constants;
use crate::pipeline::loader::RawRecord;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_KEY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9a-zA-Z_]+").unwrap());
static CONNECTOR_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;/\\]|\s{2,}|\s").unwrap());

/// Trims and collapses internal whitespace runs to single spaces. Used for
/// display and log consistency only, never for identity.
pub fn normalize_header(h: &str) -> String {
    WHITESPACE_RUN.replace_all(h.trim(), " ").into_owned()
}

/// Derives the canonical identifier-safe key for a source header: lowercase,
/// trim, every run of characters outside `[0-9a-zA-Z_]` becomes a single
/// underscore, leading/trailing underscores stripped. Stable across runs.
pub fn key_name(h: &str) -> String {
    NON_KEY_CHARS
        .replace_all(&h.trim().to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

/// Empty or unparsable input is absent, not an error.
pub fn parse_float(v: &str) -> Option<f64> {
    let v = v.trim();
    if v.is_empty() {
        return None;
    }
    v.parse::<f64>().ok()
}

/// Integer parsing with float-then-truncate semantics, so "3.0" reads as 3.
pub fn parse_int(v: &str) -> Option<i64> {
    parse_float(v).filter(|f| f.is_finite()).map(|f| f as i64)
}

/// Splits a raw connector list on commas, semicolons, slashes, backslashes,
/// and whitespace, uppercases each token, and deduplicates preserving
/// first-occurrence order. Concatenated tokens like "J1772COMBO" stay as-is.
pub fn normalize_connectors(s: &str) -> Vec<String> {
    let s = s.trim();
    if s.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for part in CONNECTOR_SPLIT.split(s) {
        let token = part.trim().to_uppercase();
        if token.is_empty() || !seen.insert(token.clone()) {
            continue;
        }
        out.push(token);
    }
    out
}

/// A validated, canonicalized charging-station row. The core fields are
/// typed; every other source column rides along in `extra` under its
/// canonical key, so unrecognized columns survive the pipeline untouched.
#[derive(Debug, Clone)]
pub struct StationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub ev_level1_evse_num: i64,
    pub ev_level2_evse_num: i64,
    pub ev_dc_fast_count: i64,
    pub ev_connector_types: Vec<String>,
    pub extra: BTreeMap<String, String>,
}

impl StationRecord {
    /// Station name as carried through under its canonical key.
    pub fn station_name(&self) -> &str {
        self.extra
            .get("station_name")
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Street address as carried through under its canonical key.
    pub fn street_address(&self) -> &str {
        self.extra
            .get("street_address")
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Outcome of normalizing one source row.
#[derive(Debug)]
pub enum RowOutcome {
    Accepted(StationRecord),
    /// Latitude/longitude missing, unparsable, or outside the bounding box.
    InvalidCoordinates,
}

fn within_bounds(lat: f64, lon: f64) -> bool {
    (constants::LAT_MIN..=constants::LAT_MAX).contains(&lat)
        && (constants::LON_MIN..=constants::LON_MAX).contains(&lon)
}

/// Looks a value up by header name, trying the exact casing first and the
/// all-lowercase variant second. Empty values count as misses so the
/// fallback gets a chance.
fn lookup<'a>(row: &'a RawRecord, header: &str) -> Option<&'a str> {
    let exact = row
        .get(header)
        .map(String::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty());
    exact.or_else(|| {
        row.get(header.to_lowercase().as_str())
            .map(String::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

/// Canonicalizes raw rows against the known station schema.
pub struct StationNormalizer {
    headers: Vec<String>,
}

impl StationNormalizer {
    pub fn new(headers: &[String]) -> Self {
        Self {
            headers: headers.to_vec(),
        }
    }

    /// Produces a `StationRecord` from a raw row, or rejects it when its
    /// coordinates are absent or fall outside the Seattle bounding box.
    /// All cell values are whitespace-trimmed before any other processing.
    pub fn normalize_row(&self, raw: &RawRecord) -> RowOutcome {
        let row: RawRecord = raw
            .iter()
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .collect();

        let lat = lookup(&row, constants::LATITUDE_HEADER).and_then(parse_float);
        let lon = lookup(&row, constants::LONGITUDE_HEADER).and_then(parse_float);
        let (lat, lon) = match (lat, lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                debug!("row has no parsable coordinates, dropping");
                return RowOutcome::InvalidCoordinates;
            }
        };
        if !within_bounds(lat, lon) {
            debug!(lat, lon, "coordinates outside the Seattle bounding box, dropping");
            return RowOutcome::InvalidCoordinates;
        }

        let level1 = lookup(&row, constants::LEVEL1_EVSE_HEADER).and_then(parse_int);
        let level2 = lookup(&row, constants::LEVEL2_EVSE_HEADER).and_then(parse_int);
        let dc_fast = lookup(&row, constants::DC_FAST_HEADER).and_then(parse_int);
        let connectors = lookup(&row, constants::CONNECTOR_TYPES_HEADER)
            .map(normalize_connectors)
            .unwrap_or_default();

        // Carry every source column through under its canonical key. The
        // coordinate columns live in the typed fields instead, and the EVSE
        // count columns are replaced by their parsed counterparts.
        let mut extra = BTreeMap::new();
        for header in &self.headers {
            let key = key_name(header);
            if key == "latitude" || key == "longitude" {
                continue;
            }
            if header == constants::LEVEL1_EVSE_HEADER
                || header == constants::LEVEL2_EVSE_HEADER
                || header == constants::DC_FAST_HEADER
            {
                continue;
            }
            let value = row.get(header).cloned().unwrap_or_default();
            extra.insert(key, value);
        }

        RowOutcome::Accepted(StationRecord {
            latitude: lat,
            longitude: lon,
            ev_level1_evse_num: level1.unwrap_or(0),
            ev_level2_evse_num: level2.unwrap_or(0),
            ev_dc_fast_count: dc_fast.unwrap_or(0),
            ev_connector_types: connectors,
            extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn row(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn key_name_canonicalizes_headers() {
        assert_eq!(key_name("EV Level1 EVSE Num"), "ev_level1_evse_num");
        assert_eq!(key_name("  Weird--Header!! "), "weird_header");
        assert_eq!(key_name("Latitude"), "latitude");
        assert_eq!(key_name("already_safe"), "already_safe");
    }

    #[test]
    fn normalize_header_collapses_whitespace() {
        assert_eq!(normalize_header("  Station   Name "), "Station Name");
        assert_eq!(normalize_header("Plain"), "Plain");
    }

    #[test]
    fn parse_float_treats_empty_as_absent() {
        assert_eq!(parse_float("47.61"), Some(47.61));
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("  "), None);
        assert_eq!(parse_float("north"), None);
    }

    #[test]
    fn parse_int_truncates_floats() {
        assert_eq!(parse_int("3.0"), Some(3));
        assert_eq!(parse_int("3.9"), Some(3));
        assert_eq!(parse_int("7"), Some(7));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("several"), None);
        assert_eq!(parse_int("nan"), None);
    }

    #[test]
    fn connectors_are_split_uppercased_and_deduplicated() {
        assert_eq!(
            normalize_connectors("Type1, Type1; TYPE2"),
            vec!["TYPE1", "TYPE2"]
        );
        assert_eq!(
            normalize_connectors("a  b/c\\d"),
            vec!["A", "B", "C", "D"]
        );
        // concatenated tokens are not split further
        assert_eq!(normalize_connectors("J1772COMBO"), vec!["J1772COMBO"]);
        assert!(normalize_connectors("").is_empty());
        assert!(normalize_connectors("   ").is_empty());
    }

    #[test]
    fn rows_outside_bounding_box_are_rejected() {
        let normalizer = StationNormalizer::new(&headers(&["Latitude", "Longitude"]));
        let outcome = normalizer.normalize_row(&row(&[
            ("Latitude", "47.65"),
            ("Longitude", "-100.0"),
        ]));
        assert!(matches!(outcome, RowOutcome::InvalidCoordinates));
    }

    #[test]
    fn rows_without_coordinates_are_rejected() {
        let normalizer =
            StationNormalizer::new(&headers(&["Station Name", "Latitude", "Longitude"]));
        let outcome = normalizer.normalize_row(&row(&[
            ("Station Name", "Ghost"),
            ("Latitude", ""),
            ("Longitude", "-122.33"),
        ]));
        assert!(matches!(outcome, RowOutcome::InvalidCoordinates));
    }

    #[test]
    fn lowercase_coordinate_headers_are_accepted() {
        let normalizer = StationNormalizer::new(&headers(&["latitude", "longitude"]));
        let outcome = normalizer.normalize_row(&row(&[
            ("latitude", "47.61"),
            ("longitude", "-122.33"),
        ]));
        match outcome {
            RowOutcome::Accepted(record) => {
                assert_eq!(record.latitude, 47.61);
                assert_eq!(record.longitude, -122.33);
            }
            RowOutcome::InvalidCoordinates => panic!("row should have been accepted"),
        }
    }

    #[test]
    fn counts_default_to_zero_and_extras_pass_through() {
        let normalizer = StationNormalizer::new(&headers(&[
            "Station Name",
            "Obscure Column!!",
            "Latitude",
            "Longitude",
            "EV Level1 EVSE Num",
            "EV Level2 EVSE Num",
            "EV DC Fast Count",
            "EV Connector Types",
        ]));
        let outcome = normalizer.normalize_row(&row(&[
            ("Station Name", "  Volta 01  "),
            ("Obscure Column!!", "kept"),
            ("Latitude", "47.6097"),
            ("Longitude", "-122.3331"),
            ("EV Level1 EVSE Num", ""),
            ("EV Level2 EVSE Num", "2.0"),
            ("EV DC Fast Count", "oops"),
            ("EV Connector Types", "J1772"),
        ]));

        let record = match outcome {
            RowOutcome::Accepted(record) => record,
            RowOutcome::InvalidCoordinates => panic!("row should have been accepted"),
        };
        assert_eq!(record.ev_level1_evse_num, 0);
        assert_eq!(record.ev_level2_evse_num, 2);
        assert_eq!(record.ev_dc_fast_count, 0);
        assert_eq!(record.ev_connector_types, vec!["J1772"]);
        assert_eq!(record.station_name(), "Volta 01");
        assert_eq!(record.extra["obscure_column"], "kept");
        // coordinate columns never appear in the passthrough map
        assert!(!record.extra.contains_key("latitude"));
        assert!(!record.extra.contains_key("longitude"));
    }
}
