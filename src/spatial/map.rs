use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Aggregation, CrossSection, CrossSectionMeta, StationMetadata};
use crate::spatial::geometry::AreaGeometry;
use crate::spatial::grid::Grid;
use crate::spatial::interpolation::{SamplePoint, SpatialInterpolator};
use crate::utils::constants::{RAINFALL_OVER_BOUND, RAINFALL_UNDER_BOUND};
use crate::utils::filename::{
    cross_section_filename, map_surface_filename, station_distribution_filename,
};
use crate::writers::CsvProduct;

/// A cross-section row placed on the map through the station registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPoint {
    pub station: String,
    pub longitude: f64,
    pub latitude: f64,
    pub value: Option<f64>,
    pub average: Option<f64>,
    pub std_dev: Option<f64>,
}

/// Attach registry coordinates; rows without an entry are skipped and repeated
/// coordinates keep their first station.
pub fn join_stations(
    section: &CrossSection,
    registry: &HashMap<String, StationMetadata>,
) -> Vec<StationPoint> {
    let mut points: Vec<StationPoint> = Vec::with_capacity(section.len());
    let mut unknown = 0;
    for row in &section.rows {
        let Some(meta) = registry.get(&row.station) else {
            unknown += 1;
            continue;
        };
        if points
            .iter()
            .any(|p| p.longitude == meta.longitude && p.latitude == meta.latitude)
        {
            debug!("Station {} shares its location with another station, skipped", row.station);
            continue;
        }
        points.push(StationPoint {
            station: row.station.clone(),
            longitude: meta.longitude,
            latitude: meta.latitude,
            value: row.value,
            average: row.average,
            std_dev: row.std_dev,
        });
    }
    if unknown > 0 {
        warn!("{} stations have no registry entry and are left off the map", unknown);
    }
    points
}

/// Stations with a present value for the cross-section's period.
#[derive(Debug, Clone, PartialEq)]
pub struct StationDistribution {
    pub meta: CrossSectionMeta,
    pub stations: Vec<StationPoint>,
}

pub fn station_distribution(
    section: &CrossSection,
    registry: &HashMap<String, StationMetadata>,
) -> StationDistribution {
    let stations = join_stations(section, registry)
        .into_iter()
        .filter(|p| p.value.is_some())
        .collect();
    StationDistribution {
        meta: section.meta.clone(),
        stations,
    }
}

impl CsvProduct for StationDistribution {
    type Record = StationPoint;

    fn filename(&self) -> String {
        station_distribution_filename(self.meta.element, &self.meta.label())
    }

    fn records(&self) -> Vec<StationPoint> {
        self.stations.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyCategory {
    Under,
    Normal,
    Over,
}

impl AnomalyCategory {
    /// Classify a ratio of value to historical average.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < RAINFALL_UNDER_BOUND {
            AnomalyCategory::Under
        } else if ratio < RAINFALL_OVER_BOUND {
            AnomalyCategory::Normal
        } else {
            AnomalyCategory::Over
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceRecord {
    pub x_d: f64,
    pub y_d: f64,
    pub value: Option<f64>,
    pub average: Option<f64>,
    pub anomaly: Option<f64>,
    pub category: Option<AnomalyCategory>,
}

/// Interpolated value, average and anomaly grids of one cross-section over an area.
///
/// Anomalies are ratios (value / average) for accumulating elements and
/// differences (value - average) for averaging ones; grid points outside the
/// area hold no value.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSurface {
    pub meta: CrossSectionMeta,
    pub area: String,
    pub method: String,
    pub stations: Vec<StationPoint>,
    pub grid: Vec<SurfaceRecord>,
}

impl MapSurface {
    pub fn stations_filename(&self) -> String {
        cross_section_filename(self.meta.element, &self.meta.label(), &self.area)
    }

    pub fn category_counts(&self) -> HashMap<AnomalyCategory, usize> {
        let mut counts = HashMap::new();
        for category in self.grid.iter().filter_map(|r| r.category) {
            *counts.entry(category).or_insert(0) += 1;
        }
        counts
    }
}

impl CsvProduct for MapSurface {
    type Record = SurfaceRecord;

    fn filename(&self) -> String {
        map_surface_filename(&self.method, self.meta.element, &self.meta.label(), &self.area)
    }

    fn records(&self) -> Vec<SurfaceRecord> {
        self.grid.clone()
    }
}

fn samples(
    area: &dyn AreaGeometry,
    stations: &[StationPoint],
    pick: impl Fn(&StationPoint) -> Option<f64>,
) -> Vec<SamplePoint> {
    stations
        .iter()
        .filter_map(|station| {
            let value = pick(station)?;
            let (x, y) = area.project(station.longitude, station.latitude);
            Some(SamplePoint { x, y, value })
        })
        .collect()
}

pub fn map_surface(
    section: &CrossSection,
    registry: &HashMap<String, StationMetadata>,
    area: &dyn AreaGeometry,
    grid: &Grid,
    interpolator: &dyn SpatialInterpolator,
) -> Result<MapSurface> {
    let aggregation = section.meta.element.require_aggregation()?;
    let stations = join_stations(section, registry);

    let targets = grid.metric_coordinates();
    let values = interpolator.interpolate(&samples(area, &stations, |s| s.value), &targets)?;
    let averages = interpolator.interpolate(&samples(area, &stations, |s| s.average), &targets)?;

    let records = grid
        .points
        .iter()
        .zip(values.into_iter().zip(averages))
        .map(|(point, (value, average))| {
            if !point.inside {
                return SurfaceRecord {
                    x_d: point.x_d,
                    y_d: point.y_d,
                    value: None,
                    average: None,
                    anomaly: None,
                    category: None,
                };
            }
            let (anomaly, category) = match aggregation {
                Aggregation::Accumulating => {
                    let ratio = value / average;
                    if ratio.is_finite() {
                        (Some(ratio), Some(AnomalyCategory::from_ratio(ratio)))
                    } else {
                        (None, None)
                    }
                }
                Aggregation::Averaging => (Some(value - average), None),
            };
            SurfaceRecord {
                x_d: point.x_d,
                y_d: point.y_d,
                value: Some(value),
                average: Some(average),
                anomaly,
                category,
            }
        })
        .collect();

    info!(
        "{} map of {} {} over {} from {} stations",
        interpolator.name(),
        section.meta.long_name(),
        section.meta.label(),
        area.name(),
        stations.len()
    );
    Ok(MapSurface {
        meta: section.meta.clone(),
        area: area.name().to_string(),
        method: interpolator.name().to_string(),
        stations,
        grid: records,
    })
}
