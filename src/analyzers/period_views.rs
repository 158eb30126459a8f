use serde::Serialize;

use crate::error::{ProcessingError, Result};
use crate::models::{Granularity, PeriodMeta, PeriodStatistic, PeriodTable, Season, SubPeriod};
use crate::utils::filename::{season_comparison_filename, year_anomaly_filename};
use crate::writers::CsvProduct;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearAnomalyRow {
    pub year: i32,
    pub value: Option<f64>,
    pub average: Option<f64>,
    pub anomaly: Option<f64>,
    pub above_average: Option<bool>,
}

/// Yearly departures from the station's all-year average.
#[derive(Debug, Clone, PartialEq)]
pub struct YearAnomalies {
    pub meta: PeriodMeta,
    pub rows: Vec<YearAnomalyRow>,
}

pub fn year_anomalies(table: &PeriodTable) -> Result<YearAnomalies> {
    table.expect_granularity(Granularity::Year, "year anomalies")?;

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let anomaly = row.anomaly();
            YearAnomalyRow {
                year: row.year(),
                value: row.value,
                average: row.average,
                anomaly,
                above_average: anomaly.map(|a| a >= 0.0),
            }
        })
        .collect();

    Ok(YearAnomalies {
        meta: table.meta.clone(),
        rows,
    })
}

impl CsvProduct for YearAnomalies {
    type Record = YearAnomalyRow;

    fn filename(&self) -> String {
        year_anomaly_filename(self.meta.element, &self.meta.station)
    }

    fn records(&self) -> Vec<YearAnomalyRow> {
        self.rows.clone()
    }
}

/// The year table as bar-chart data: one value per year.
pub fn year_series(table: &PeriodTable) -> Result<Vec<(i32, Option<f64>)>> {
    table.expect_granularity(Granularity::Year, "year series")?;
    Ok(table.rows.iter().map(|r| (r.year(), r.value)).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonComparisonRow {
    pub season: &'static str,
    pub value: Option<f64>,
    pub average: Option<f64>,
}

/// The seasons of one year next to their all-year averages.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonComparison {
    pub meta: PeriodMeta,
    pub year: i32,
    pub rows: Vec<SeasonComparisonRow>,
}

pub fn season_comparison(table: &PeriodTable, year: i32) -> Result<SeasonComparison> {
    table.expect_granularity(Granularity::Season, "season comparison")?;
    if !table.has_year(year) {
        return Err(ProcessingError::YearNotFound(year));
    }

    let rows = Season::ALL
        .iter()
        .map(|season| {
            let of_season = |r: &&PeriodStatistic| r.key.sub == SubPeriod::Season(*season);
            let selected = table.rows_for_year(year).find(of_season);
            let average = table.rows.iter().find(of_season).and_then(|r| r.average);
            SeasonComparisonRow {
                season: season.name(),
                value: selected.and_then(|r| r.value),
                average,
            }
        })
        .collect();

    Ok(SeasonComparison {
        meta: table.meta.clone(),
        year,
        rows,
    })
}

impl CsvProduct for SeasonComparison {
    type Record = SeasonComparisonRow;

    fn filename(&self) -> String {
        season_comparison_filename(self.meta.element, &self.meta.station, self.year)
    }

    fn records(&self) -> Vec<SeasonComparisonRow> {
        self.rows.clone()
    }
}
