use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::calendar::season_year;
use crate::models::{DailyTable, Element, Granularity, PeriodTable, Season};
use crate::utils::constants::{LOWER_PERCENTILE, UPPER_PERCENTILE};
use crate::utils::filename::cumulative_filename;
use crate::utils::statistics::{mean, quantile};
use crate::writers::CsvProduct;

/// Position within a (season-)year: month then dekad or day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct CumulativeStep {
    month: u32,
    dekad: Option<u8>,
    day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeRow {
    pub month: u32,
    pub dekad: Option<u8>,
    pub day: Option<u32>,
    pub cumulative: Option<f64>,
    pub average: Option<f64>,
    pub per5: Option<f64>,
    pub per95: Option<f64>,
}

/// Running rainfall total of one year against the spread of all years.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeRainfall {
    pub station: String,
    pub year: i32,
    pub season: Option<Season>,
    pub rows: Vec<CumulativeRow>,
}

impl CumulativeRainfall {
    pub fn label(&self) -> String {
        match self.season {
            Some(season) => format!("{} {}", self.year, season),
            None => self.year.to_string(),
        }
    }
}

impl CsvProduct for CumulativeRainfall {
    type Record = CumulativeRow;

    fn filename(&self) -> String {
        cumulative_filename(Element::Precipitation, &self.station, self.year)
    }

    fn records(&self) -> Vec<CumulativeRow> {
        self.rows.clone()
    }
}

/// Months of the selection in accumulation order; Bega runs October to January.
fn selected_months(season: Option<Season>) -> Vec<u32> {
    match season {
        Some(season) => season.months().to_vec(),
        None => (1..=12).collect(),
    }
}

/// Year a value accumulates into: the season-year when a season is selected.
fn accumulation_year(year: i32, month: u32, season: Option<Season>) -> i32 {
    match season {
        Some(_) => season_year(year, month),
        None => year,
    }
}

/// Shared by the dekadal and daily variants: `points` carries (calendar year, step, value).
fn accumulate(
    station: &str,
    year: i32,
    season: Option<Season>,
    points: Vec<(i32, CumulativeStep, Option<f64>)>,
) -> CumulativeRainfall {
    let months = selected_months(season);
    let order = |step: &CumulativeStep| {
        let position = months.iter().position(|m| *m == step.month).unwrap_or(months.len());
        (position, step.dekad, step.day)
    };

    let mut per_year: BTreeMap<i32, Vec<(CumulativeStep, f64)>> = BTreeMap::new();
    for (calendar_year, step, value) in points {
        if !months.contains(&step.month) {
            continue;
        }
        per_year
            .entry(accumulation_year(calendar_year, step.month, season))
            .or_default()
            .push((step, value.unwrap_or(0.0)));
    }

    let mut per_step: BTreeMap<CumulativeStep, Vec<f64>> = BTreeMap::new();
    let mut selected: BTreeMap<CumulativeStep, f64> = BTreeMap::new();
    for (group_year, mut steps) in per_year {
        steps.sort_by_key(|(step, _)| order(step));
        let mut total = 0.0;
        for (step, value) in steps {
            total += value;
            per_step.entry(step).or_default().push(total);
            if group_year == year {
                selected.insert(step, total);
            }
        }
    }

    let mut steps: Vec<CumulativeStep> = per_step.keys().copied().collect();
    steps.sort_by_key(|step| order(step));
    let rows = steps
        .into_iter()
        .map(|step| {
            let totals = per_step.get(&step).map(Vec::as_slice).unwrap_or(&[]);
            CumulativeRow {
                month: step.month,
                dekad: step.dekad,
                day: step.day,
                cumulative: selected.get(&step).copied(),
                average: mean(totals),
                per5: quantile(totals, LOWER_PERCENTILE),
                per95: quantile(totals, UPPER_PERCENTILE),
            }
        })
        .collect();

    CumulativeRainfall {
        station: station.to_string(),
        year,
        season,
        rows,
    }
}

/// Cumulative dekadal rainfall from a PRECIP dekad table.
pub fn cumulative_dekadal(
    table: &PeriodTable,
    year: i32,
    season: Option<Season>,
) -> Result<CumulativeRainfall> {
    table.expect_granularity(Granularity::Dekad, "cumulative rainfall")?;
    if table.meta.element != Element::Precipitation {
        return Err(ProcessingError::WrongTable(format!(
            "cumulative rainfall needs a PRECIP table, got {}",
            table.meta.element
        )));
    }
    if !table.has_year(year) {
        return Err(ProcessingError::YearNotFound(year));
    }

    let points = table
        .rows
        .iter()
        .filter_map(|row| {
            let month = row.key.sub.month()?;
            let dekad = row.key.sub.dekad()?;
            let step = CumulativeStep {
                month,
                dekad: Some(dekad.index()),
                day: None,
            };
            Some((row.year(), step, row.value))
        })
        .collect();

    let product = accumulate(&table.meta.station, year, season, points);
    debug!("Cumulative rainfall {} has {} dekads", product.label(), product.rows.len());
    Ok(product)
}

/// Cumulative daily rainfall straight from a station's daily table.
pub fn cumulative_daily(
    daily: &DailyTable,
    year: i32,
    season: Option<Season>,
) -> Result<CumulativeRainfall> {
    if !daily.has_element(Element::Precipitation) {
        return Err(ProcessingError::ElementNotFound {
            element: Element::Precipitation.code(),
            available: daily.elements.iter().map(|e| e.code()).collect(),
        });
    }
    if !daily.years().contains(&year) {
        return Err(ProcessingError::YearNotFound(year));
    }

    let points = daily
        .rows
        .iter()
        .map(|row| {
            let step = CumulativeStep {
                month: row.calendar.month,
                dekad: None,
                day: Some(row.calendar.day),
            };
            (row.calendar.year, step, row.value(Element::Precipitation))
        })
        .collect();

    Ok(accumulate(&daily.station, year, season, points))
}
