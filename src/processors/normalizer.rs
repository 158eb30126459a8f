use chrono::{NaiveDate, NaiveTime, Timelike};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::station::normalize_station_name;
use crate::models::{Element, Observation, ObservationTable, StationMetadata};
use crate::processors::station_registry::{RegistryUpdate, StationRegistry};
use crate::readers::{DataChoice, RawMonthRow, WideReader};
use crate::utils::constants::DEFAULT_OBSERVATION_HOUR;

/// Data-quality counters of one normalisation pass. None of these are errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeStats {
    pub raw_rows: usize,
    pub observations: usize,
    pub invalid_dates: usize,
    pub unparseable_periods: usize,
    pub unknown_elements: usize,
    pub missing_values: usize,
    pub defaulted_times: usize,
}

impl NormalizeStats {
    pub fn dropped_rows(&self) -> usize {
        self.unparseable_periods + self.unknown_elements
    }
}

#[derive(Debug)]
pub enum LoadResult {
    Values {
        table: ObservationTable,
        stats: NormalizeStats,
    },
    Metadata(Vec<StationMetadata>),
}

/// Turns wide station-month rows into the long observation table.
pub struct RecordNormalizer {
    reader: WideReader,
}

impl RecordNormalizer {
    pub fn new() -> Self {
        Self {
            reader: WideReader::new(),
        }
    }

    pub fn with_reader(reader: WideReader) -> Self {
        Self { reader }
    }

    /// Read a wide station file, refresh the station registry and return either the
    /// observations or the station metadata of the file.
    pub fn load(
        &self,
        path: &Path,
        choice: DataChoice,
        registry: Option<&StationRegistry>,
    ) -> Result<LoadResult> {
        let rows = self.reader.read_rows(path)?;
        info!("Read {} station-month rows from {}", rows.len(), path.display());

        let stations = self.station_metadata(&rows);
        if let Some(registry) = registry {
            match registry.upsert(&stations)? {
                RegistryUpdate::Unchanged => info!("Station registry already up to date"),
                RegistryUpdate::Updated { added, replaced, total } => info!(
                    "Station registry updated: {} added, {} replaced, {} stations in total",
                    added, replaced, total
                ),
            }
        }

        match choice {
            DataChoice::Metadata => Ok(LoadResult::Metadata(stations)),
            DataChoice::Values => {
                let (mut table, stats) = self.normalize(&rows);
                table.source = Some(path.to_path_buf());
                Ok(LoadResult::Values { table, stats })
            }
        }
    }

    /// Unpivot the 31 day columns into one observation per valid calendar day.
    pub fn normalize(&self, rows: &[RawMonthRow]) -> (ObservationTable, NormalizeStats) {
        let mut stats = NormalizeStats {
            raw_rows: rows.len(),
            ..Default::default()
        };
        let mut observations = Vec::with_capacity(rows.len() * 31);

        for row in rows {
            let Some(element) = Element::from_code(&row.element) else {
                debug!("Line {}: unknown element '{}'", row.line, row.element);
                stats.unknown_elements += 1;
                continue;
            };
            let (Some(year), Some(month)) =
                (parse_integer::<i32>(&row.year), parse_integer::<u32>(&row.month))
            else {
                debug!("Line {}: unparseable year/month", row.line);
                stats.unparseable_periods += 1;
                continue;
            };
            let hour = match parse_hour(&row.time) {
                Some(hour) => hour,
                None => {
                    stats.defaulted_times += 1;
                    DEFAULT_OBSERVATION_HOUR
                }
            };
            let station = normalize_station_name(&row.station_name);

            for (index, raw_value) in row.days.iter().enumerate() {
                let day = index as u32 + 1;
                let Some(timestamp) = NaiveDate::from_ymd_opt(year, month, day)
                    .and_then(|date| date.and_hms_opt(hour, 0, 0))
                else {
                    stats.invalid_dates += 1;
                    continue;
                };

                let value = parse_value(raw_value);
                if value.is_none() {
                    stats.missing_values += 1;
                }
                observations.push(Observation::new(station.clone(), element, timestamp, value));
            }
        }

        stats.observations = observations.len();
        if stats.dropped_rows() > 0 {
            warn!(
                "Dropped {} rows ({} unknown elements, {} unparseable year/month)",
                stats.dropped_rows(),
                stats.unknown_elements,
                stats.unparseable_periods
            );
        }
        debug!(
            "Normalized {} rows into {} observations ({} invalid dates skipped)",
            stats.raw_rows, stats.observations, stats.invalid_dates
        );

        (ObservationTable::new(observations, None), stats)
    }

    /// Distinct stations of the file, first occurrence wins, sorted by name.
    pub fn station_metadata(&self, rows: &[RawMonthRow]) -> Vec<StationMetadata> {
        let mut stations: BTreeMap<String, StationMetadata> = BTreeMap::new();

        for row in rows {
            let name = normalize_station_name(&row.station_name);
            if name.is_empty() || stations.contains_key(&name) {
                continue;
            }
            let (Some(latitude), Some(longitude)) =
                (parse_value(&row.latitude), parse_value(&row.longitude))
            else {
                warn!("Line {}: station {} has no usable coordinates", row.line, name);
                continue;
            };
            stations.insert(
                name.clone(),
                StationMetadata::new(
                    name,
                    row.station_id.trim().to_string(),
                    latitude,
                    longitude,
                    parse_value(&row.elevation),
                ),
            );
        }

        stations.into_values().collect()
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Observation hour from a raw time token.
///
/// Tokens without a colon get one inserted before the last two characters
/// (`900` -> `9:00`). Anything that does not parse as `%H:%M` yields `None`.
pub fn parse_hour(raw: &str) -> Option<u32> {
    let token = raw.trim();
    if token.is_empty() {
        return None;
    }
    let repaired;
    let token = if token.contains(':') {
        token
    } else {
        let split = token.char_indices().rev().nth(1)?.0;
        repaired = format!("{}:{}", &token[..split], &token[split..]);
        &repaired
    };
    NaiveTime::parse_from_str(token, "%H:%M")
        .ok()
        .map(|time| time.hour())
}

/// Numeric cell value; blanks, text and non-finite numbers are absent.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Whole numbers, also when written as `2020.0`; values outside `T` are `None`.
fn parse_integer<T: FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    let whole = match raw.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        Some(_) => return None,
        None => raw,
    };
    whole.parse().ok()
}
