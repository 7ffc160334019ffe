use std::collections::HashSet;

use tracing::debug;

use crate::pipeline::normalize::StationRecord;

/// Composite identity for a station row: uppercased name, uppercased street
/// address, and coordinates rounded to six decimal places (micro-degrees),
/// stored as integers so the key is `Eq + Hash`. Stations sharing all four
/// collapse into one record regardless of their other fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    name: String,
    address: String,
    lat_microdeg: i64,
    lon_microdeg: i64,
}

impl IdentityKey {
    pub fn of(record: &StationRecord) -> Self {
        Self {
            name: record.station_name().to_uppercase(),
            address: record.street_address().to_uppercase(),
            lat_microdeg: round_microdeg(record.latitude),
            lon_microdeg: round_microdeg(record.longitude),
        }
    }
}

fn round_microdeg(coord: f64) -> i64 {
    (coord * 1e6).round() as i64
}

/// First occurrence wins unconditionally; repeats are counted and dropped.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<IdentityKey>,
    duplicates: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the record is the first seen with its identity.
    pub fn insert(&mut self, record: &StationRecord) -> bool {
        let key = IdentityKey::of(record);
        if self.seen.insert(key) {
            true
        } else {
            debug!(
                name = record.station_name(),
                address = record.street_address(),
                "duplicate station discarded"
            );
            self.duplicates += 1;
            false
        }
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}
