/// Source column names the cleaner interprets directly. Lookups try the
/// exact casing first and fall back to the all-lowercase variant; any other
/// column passes through untouched under its canonical key.
pub const LATITUDE_HEADER: &str = "Latitude";
pub const LONGITUDE_HEADER: &str = "Longitude";
pub const LEVEL1_EVSE_HEADER: &str = "EV Level1 EVSE Num";
pub const LEVEL2_EVSE_HEADER: &str = "EV Level2 EVSE Num";
pub const DC_FAST_HEADER: &str = "EV DC Fast Count";
pub const CONNECTOR_TYPES_HEADER: &str = "EV Connector Types";

// Seattle-area bounding box; rows outside it are dropped.
pub const LAT_MIN: f64 = 47.3;
pub const LAT_MAX: f64 = 47.8;
pub const LON_MIN: f64 = -122.55;
pub const LON_MAX: f64 = -122.15;

/// Canonical fields guaranteed present in the cleaned CSV, appended after
/// the source columns when not already among them.
pub const FIXED_OUTPUT_FIELDS: [&str; 6] = [
    "latitude",
    "longitude",
    "ev_level1_evse_num",
    "ev_level2_evse_num",
    "ev_dc_fast_count",
    "ev_connector_types",
];

// Default asset locations, overridable via config.toml or CLI flags.
pub const DEFAULT_INPUT_CSV: &str = "assets/seattle_ev_stations.csv";
pub const DEFAULT_OUTPUT_CSV: &str = "assets/seattle_ev_stations_clean.csv";
pub const DEFAULT_OUTPUT_GEOJSON: &str = "assets/seattle_ev_stations_clean.geojson";
