use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{ProcessingError, Result};
use crate::models::calendar::month_abbreviation;
use crate::models::{Dekad, Granularity, PeriodMeta, PeriodTable, SubPeriod};
use crate::utils::constants::{LOWER_PERCENTILE, UPPER_PERCENTILE};
use crate::utils::filename::period_table_filename;
use crate::utils::statistics::{mean, quantile};
use crate::writers::CsvProduct;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentHistoricRow {
    pub label: String,
    pub month: u32,
    pub dekad: Option<u8>,
    pub historical: Option<f64>,
    pub per5: Option<f64>,
    pub per95: Option<f64>,
    pub recent: Option<f64>,
}

/// One year's dekads or months against the 5-95 percentile band of all years.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentHistoric {
    pub meta: PeriodMeta,
    pub year: i32,
    pub first_year: i32,
    pub last_year: i32,
    pub rows: Vec<RecentHistoricRow>,
}

impl RecentHistoric {
    pub fn historic_label(&self) -> String {
        format!("{}-{}", self.first_year, self.last_year)
    }
}

/// Full year template (36 dekads or 12 months) of the sub-periods of a table.
fn template(granularity: Granularity) -> Vec<SubPeriod> {
    match granularity {
        Granularity::Dekad => (1..=12)
            .flat_map(|month| Dekad::ALL.into_iter().map(move |dekad| SubPeriod::Dekad { month, dekad }))
            .collect(),
        _ => (1..=12).map(SubPeriod::Month).collect(),
    }
}

pub fn recent_historic(table: &PeriodTable, year: i32) -> Result<RecentHistoric> {
    let granularity = table.meta.granularity;
    if !matches!(granularity, Granularity::Dekad | Granularity::Month) {
        return Err(ProcessingError::WrongTable(format!(
            "recent versus historic needs a dekadal or month table, got a {} table",
            granularity
        )));
    }
    let years = table.years();
    let (Some(&first_year), Some(&last_year)) = (years.first(), years.last()) else {
        return Err(ProcessingError::MissingData(format!(
            "{} table of {} has no rows",
            granularity, table.meta.station
        )));
    };

    let mut history: BTreeMap<SubPeriod, Vec<f64>> = BTreeMap::new();
    for row in &table.rows {
        if let Some(value) = row.value {
            history.entry(row.key.sub).or_default().push(value);
        }
    }

    let rows = template(granularity)
        .into_iter()
        .map(|sub| {
            let values = history.get(&sub).map(Vec::as_slice).unwrap_or(&[]);
            let month = sub.month().unwrap_or(1);
            let dekad = sub.dekad();
            let label = match dekad {
                Some(dekad) => format!("{} {}", month_abbreviation(month), dekad),
                None => month_abbreviation(month).to_string(),
            };
            RecentHistoricRow {
                label,
                month,
                dekad: dekad.map(|d| d.index()),
                historical: mean(values),
                per5: quantile(values, LOWER_PERCENTILE),
                per95: quantile(values, UPPER_PERCENTILE),
                recent: table
                    .rows_for_year(year)
                    .find(|r| r.key.sub == sub)
                    .and_then(|r| r.value),
            }
        })
        .collect();

    Ok(RecentHistoric {
        meta: table.meta.clone(),
        year,
        first_year,
        last_year,
        rows,
    })
}

impl CsvProduct for RecentHistoric {
    type Record = RecentHistoricRow;

    fn filename(&self) -> String {
        format!(
            "{}{}",
            self.year,
            period_table_filename(self.meta.element, &self.meta.station, self.meta.granularity)
        )
    }

    fn records(&self) -> Vec<RecentHistoricRow> {
        self.rows.clone()
    }
}
