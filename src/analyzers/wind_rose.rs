use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::error::{ProcessingError, Result};
use crate::models::station::normalize_station_name;
use crate::models::{Element, Observation, ObservationTable, Season};
use crate::utils::constants::{WIND_SECTORS, WIND_SPEED_BINS};
use crate::utils::filename::wind_rose_filename;
use crate::utils::statistics::{linspace, mean, round_to};
use crate::writers::CsvProduct;

/// Which part of a year the wind rose covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindPeriod {
    Year(i32),
    Month { year: i32, month: u32 },
    /// Keyed by season-year, so a Bega rose includes the following January.
    Season { season_year: i32, season: Season },
}

impl WindPeriod {
    pub fn label(&self) -> String {
        match self {
            WindPeriod::Year(year) => year.to_string(),
            WindPeriod::Month { year, month } => format!("{} {}", year, month),
            WindPeriod::Season {
                season_year,
                season,
            } => format!("{} {}", season_year, season),
        }
    }

    fn contains(&self, obs: &Observation) -> bool {
        match *self {
            WindPeriod::Year(year) => obs.year() == year,
            WindPeriod::Month { year, month } => obs.year() == year && obs.month() == month,
            WindPeriod::Season {
                season_year,
                season,
            } => obs.season_year() == season_year && obs.season() == season,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindRoseRecord {
    pub direction: f64,
    pub speed_from: f64,
    pub speed_to: Option<f64>,
    pub percent: f64,
}

/// Direction and speed frequency statistics for one station and period.
#[derive(Debug, Clone, PartialEq)]
pub struct WindRose {
    pub station: String,
    pub label: String,
    pub records: usize,
    pub missing_percent: f64,
    pub calm_percent: f64,
    pub mean_speed: Option<f64>,
    pub mean_direction: Option<f64>,
    /// Lower edges of the speed bins; the last bin is open ended.
    pub speed_edges: Vec<f64>,
    /// Percent of all records per direction sector (rows) and speed bin (columns).
    pub frequencies: Vec<Vec<f64>>,
}

impl WindRose {
    pub fn sector_width() -> f64 {
        360.0 / WIND_SECTORS as f64
    }
}

impl CsvProduct for WindRose {
    type Record = WindRoseRecord;

    fn filename(&self) -> String {
        wind_rose_filename(&self.station, &self.label)
    }

    fn records(&self) -> Vec<WindRoseRecord> {
        let mut records = Vec::with_capacity(WIND_SECTORS * WIND_SPEED_BINS);
        for (sector, bins) in self.frequencies.iter().enumerate() {
            for (bin, percent) in bins.iter().enumerate() {
                records.push(WindRoseRecord {
                    direction: sector as f64 * Self::sector_width(),
                    speed_from: self.speed_edges[bin],
                    speed_to: self.speed_edges.get(bin + 1).copied(),
                    percent: *percent,
                });
            }
        }
        records
    }
}

/// Vector-average wind speed (2 decimals) and direction (whole degrees, 0-360).
pub fn vector_average(winds: &[(f64, f64)]) -> Option<(f64, f64)> {
    let (u, v): (Vec<f64>, Vec<f64>) = winds
        .iter()
        .map(|&(speed, direction)| {
            let angle = (270.0 - direction).to_radians();
            (-speed * angle.cos(), -speed * angle.sin())
        })
        .unzip();
    let (u, v) = (mean(&u)?, mean(&v)?);

    let speed = round_to((u * u + v * v).sqrt(), 2);
    let mut direction = (-v.atan2(u).to_degrees() + 90.0).round();
    if direction < 0.0 {
        direction += 360.0;
    }
    Some((speed, direction))
}

fn sector_of(direction: f64) -> usize {
    let width = WindRose::sector_width();
    let shifted = (direction + width / 2.0).rem_euclid(360.0);
    ((shifted / width) as usize).min(WIND_SECTORS - 1)
}

fn speed_edges(speeds: &[f64]) -> Vec<f64> {
    let min = speeds.iter().copied().fold(f64::INFINITY, f64::min);
    let max = speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() {
        return vec![0.0; WIND_SPEED_BINS];
    }
    linspace(min, max, WIND_SPEED_BINS)
}

fn bin_of(speed: f64, edges: &[f64]) -> usize {
    edges.iter().rposition(|edge| speed >= *edge).unwrap_or(0)
}

pub fn wind_rose(table: &ObservationTable, station: &str, period: WindPeriod) -> Result<WindRose> {
    let name = normalize_station_name(station);
    if !table.has_station(&name) {
        return Err(ProcessingError::StationNotFound {
            name,
            available: table.station_names(),
        });
    }

    let mut paired: BTreeMap<NaiveDateTime, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for obs in table.for_station(&name).filter(|o| period.contains(o)) {
        match obs.element {
            Element::WindSpeed => paired.entry(obs.timestamp).or_default().0 = obs.value,
            Element::WindDirection => paired.entry(obs.timestamp).or_default().1 = obs.value,
            _ => {}
        }
    }
    if paired.is_empty() {
        return Err(ProcessingError::PeriodNotFound(format!(
            "{} (no wind records at {})",
            period.label(),
            name
        )));
    }

    let records = paired.len();
    let complete: Vec<(f64, f64)> = paired
        .values()
        .filter_map(|(speed, direction)| Some(((*speed)?, (*direction)?)))
        .collect();
    let missing = records - complete.len();
    let calms = paired.values().filter(|(_, d)| *d == Some(0.0)).count();
    let rose: Vec<(f64, f64)> = complete.iter().copied().filter(|(_, d)| *d != 0.0).collect();

    let edges = speed_edges(&rose.iter().map(|(s, _)| *s).collect::<Vec<_>>());
    let mut frequencies = vec![vec![0.0; WIND_SPEED_BINS]; WIND_SECTORS];
    for &(speed, direction) in &rose {
        frequencies[sector_of(direction)][bin_of(speed, &edges)] += 100.0 / records as f64;
    }

    let percent = |count: usize| round_to(count as f64 * 100.0 / records as f64, 1);
    let average = vector_average(&complete);
    let rose = WindRose {
        station: name,
        label: period.label(),
        records,
        missing_percent: percent(missing),
        calm_percent: percent(calms),
        mean_speed: average.map(|(s, _)| s),
        mean_direction: average.map(|(_, d)| d),
        speed_edges: edges,
        frequencies,
    };

    info!(
        "Wind rose for {} at station {}: average wind speed {:?} m/s, direction {:?}°, {}% calms, {}% missing",
        rose.label, rose.station, rose.mean_speed, rose.mean_direction, rose.calm_percent, rose.missing_percent
    );
    Ok(rose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wind(day: u32, speed: Option<f64>, direction: Option<f64>) -> Vec<Observation> {
        let timestamp = NaiveDate::from_ymd_opt(2021, 3, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        vec![
            Observation::new("Gore".into(), Element::WindSpeed, timestamp, speed),
            Observation::new("Gore".into(), Element::WindDirection, timestamp, direction),
        ]
    }

    fn sample_table() -> ObservationTable {
        let observations = [
            wind(1, Some(2.0), Some(90.0)),
            wind(2, Some(4.0), Some(90.0)),
            wind(3, Some(1.0), Some(0.0)),
            wind(4, None, Some(180.0)),
            wind(5, Some(7.0), Some(185.0)),
        ]
        .concat();
        ObservationTable::new(observations, None)
    }

    #[test]
    fn test_vector_average() {
        let (speed, direction) = vector_average(&[(2.0, 90.0), (2.0, 90.0)]).unwrap();
        assert!((speed - 2.0).abs() < 1e-9);
        assert_eq!(direction, 90.0);

        let (_, north_west) = vector_average(&[(1.0, 350.0), (1.0, 330.0)]).unwrap();
        assert_eq!(north_west, 340.0);

        let (calm, _) = vector_average(&[(3.0, 90.0), (3.0, 270.0)]).unwrap();
        assert_eq!(calm, 0.0);
        assert_eq!(vector_average(&[]), None);
    }

    #[test]
    fn test_sectors() {
        assert_eq!(sector_of(0.0), 0);
        assert_eq!(sector_of(355.0), 0);
        assert_eq!(sector_of(11.0), 0);
        assert_eq!(sector_of(12.0), 1);
        assert_eq!(sector_of(90.0), 4);
        assert_eq!(sector_of(185.0), 8);
    }

    #[test]
    fn test_wind_rose_statistics() -> Result<()> {
        let rose = wind_rose(&sample_table(), "gore", WindPeriod::Month { year: 2021, month: 3 })?;

        assert_eq!(rose.records, 5);
        assert_eq!(rose.missing_percent, 20.0);
        assert_eq!(rose.calm_percent, 20.0);
        assert_eq!(rose.speed_edges, vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(rose.frequencies[4][0], 20.0);
        assert_eq!(rose.frequencies[4][2], 20.0);
        assert_eq!(rose.frequencies[8][5], 20.0);

        let total: f64 = rose.frequencies.iter().flatten().sum();
        assert!((total - 60.0).abs() < 1e-9);
        assert_eq!(rose.filename(), "Gore2021 3windrose.csv");
        assert_eq!(rose.records().len(), 96);
        Ok(())
    }

    #[test]
    fn test_period_without_wind() {
        let result = wind_rose(&sample_table(), "Gore", WindPeriod::Year(2019));
        assert!(matches!(result, Err(ProcessingError::PeriodNotFound(_))));
        let result = wind_rose(&sample_table(), "Assela", WindPeriod::Year(2021));
        assert!(matches!(result, Err(ProcessingError::StationNotFound { .. })));
    }
}
