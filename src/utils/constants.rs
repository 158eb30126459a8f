/// Column layout of the wide station file
pub const WIDE_IDENTITY_COLUMNS: [&str; 9] = [
    "STN_Name",
    "EG_GH_ID",
    "GEOGR2",
    "GEOGR1",
    "ELEVATION",
    "EG_EL",
    "YEAR",
    "MONTH",
    "TIME",
];
pub const WIDE_DAY_COLUMNS: usize = 31;
pub const WIDE_COLUMN_COUNT: usize = WIDE_IDENTITY_COLUMNS.len() + WIDE_DAY_COLUMNS;

/// Observation hour used when the raw time cannot be parsed
pub const DEFAULT_OBSERVATION_HOUR: u32 = 9;

/// File names
pub const SETTINGS_FILE: &str = "settings.json";
pub const STATION_REGISTRY_FILE: &str = "stationInfo.csv";
pub const SST_CACHE_FILE: &str = "sstNOAA.csv";
pub const GRID_DIR: &str = "griddata";

/// Directory names
pub const BASE_DIR: &str = "CAMT-ET";
pub const SHAPEFILE_DIR: &str = "shapefiles";
pub const DATA_DIR: &str = "data";
pub const OUTPUT_DIR: &str = "output";
pub const PACKAGE_DATA_DIR: &str = "camt-et";

/// Ethiopia geographic bounds
pub const ET_MIN_LAT: f64 = 3.4;
pub const ET_MAX_LAT: f64 = 14.9;
pub const ET_MIN_LON: f64 = 33.0;
pub const ET_MAX_LON: f64 = 48.0;
pub const COUNTRY_NAME: &str = "Ethiopia";

/// Interpolation grid defaults
pub const DEFAULT_GRID_SIZE: usize = 100;

/// Rainfall anomaly category bounds (fraction of the historical average)
pub const RAINFALL_UNDER_BOUND: f64 = 0.75;
pub const RAINFALL_OVER_BOUND: f64 = 1.25;

/// Percentile band used by historic comparison products
pub const LOWER_PERCENTILE: f64 = 0.05;
pub const UPPER_PERCENTILE: f64 = 0.95;

/// Maximum number of two-year periods in an anomaly comparison
pub const MAX_TWO_YEAR_PERIODS: usize = 4;

/// Wind rose layout
pub const WIND_SECTORS: usize = 16;
pub const WIND_SPEED_BINS: usize = 6;

/// NOAA CPC weekly/monthly SST indices
pub const SST_INDICES_URL: &str = "https://www.cpc.ncep.noaa.gov/data/indices/sstoi.indices";
pub const SST_FETCH_TIMEOUT_SECS: u64 = 20;
