use std::collections::BTreeMap;

use crate::error::{ProcessingError, Result};
use crate::models::calendar::month_abbreviation;
use crate::models::{Granularity, PeriodTable};
use crate::readers::SstRecord;
use crate::utils::constants::{LOWER_PERCENTILE, MAX_TWO_YEAR_PERIODS, UPPER_PERCENTILE};
use crate::utils::filename::{sst_anomaly_filename, two_year_anomaly_filename};
use crate::utils::statistics::quantile;

/// Check the start years of two-year periods against the years present in the data.
pub fn validate_start_years(starts: &[i32], available: &[i32]) -> Result<()> {
    let missing: Vec<i32> = starts
        .iter()
        .copied()
        .filter(|year| !available.contains(year))
        .collect();
    if !missing.is_empty() {
        return Err(ProcessingError::InvalidYears(format!(
            "The provided years {:?} are not in the database. Please select other years",
            missing
        )));
    }
    if starts.len() > MAX_TWO_YEAR_PERIODS {
        return Err(ProcessingError::InvalidYears(format!(
            "You provided more than {} years. Please select maximum {} years",
            MAX_TWO_YEAR_PERIODS, MAX_TWO_YEAR_PERIODS
        )));
    }
    if starts.windows(2).any(|pair| pair[1] - pair[0] < 2) {
        return Err(ProcessingError::InvalidYears(
            "The difference between some of the selected years is less than 2. \
             Please select years with at least 2 years difference from each other"
                .to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwoYearRow {
    /// 1 for the start year, 2 for the year after.
    pub relative_year: u8,
    pub month: u32,
    pub anomalies: Vec<Option<f64>>,
    pub per5: Option<f64>,
    pub per95: Option<f64>,
}

/// Monthly anomalies over up to four two-year periods on a shared 24-month axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoYearAnomalies {
    pub title: String,
    pub filename: String,
    pub starts: Vec<i32>,
    pub rows: Vec<TwoYearRow>,
}

impl TwoYearAnomalies {
    fn build(title: String, filename: String, starts: &[i32], points: &[(i32, u32, Option<f64>)]) -> Self {
        let mut lookup: BTreeMap<(i32, u32), Option<f64>> = BTreeMap::new();
        let mut band: BTreeMap<(u8, u32), Vec<f64>> = BTreeMap::new();
        for &(year, month, anomaly) in points {
            lookup.insert((year, month), anomaly);
            if let Some(anomaly) = anomaly {
                // Even years line up as the first year of a pair, odd years as the second.
                let relative = (year.rem_euclid(2) + 1) as u8;
                band.entry((relative, month)).or_default().push(anomaly);
            }
        }

        let rows = [1u8, 2]
            .into_iter()
            .flat_map(|relative_year| (1..=12).map(move |month| (relative_year, month)))
            .map(|(relative_year, month)| {
                let anomalies = starts
                    .iter()
                    .map(|start| {
                        let year = start + relative_year as i32 - 1;
                        lookup.get(&(year, month)).copied().flatten()
                    })
                    .collect();
                let values = band.get(&(relative_year, month)).map(Vec::as_slice).unwrap_or(&[]);
                TwoYearRow {
                    relative_year,
                    month,
                    anomalies,
                    per5: quantile(values, LOWER_PERCENTILE),
                    per95: quantile(values, UPPER_PERCENTILE),
                }
            })
            .collect();

        Self {
            title,
            filename,
            starts: starts.to_vec(),
            rows,
        }
    }

    pub fn period_labels(&self) -> Vec<String> {
        self.starts
            .iter()
            .map(|start| format!("{}-{}", start, start + 1))
            .collect()
    }

    /// Header plus one CSV row per month of the 24-month axis.
    pub fn csv_rows(&self) -> Vec<Vec<String>> {
        let fmt = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();

        let mut header = vec!["relative_year".to_string(), "month".to_string()];
        header.extend(self.period_labels());
        header.extend(["per5".to_string(), "per95".to_string()]);

        let mut rows = vec![header];
        for row in &self.rows {
            let mut line = vec![
                row.relative_year.to_string(),
                month_abbreviation(row.month).to_string(),
            ];
            line.extend(row.anomalies.iter().map(|a| fmt(*a)));
            line.push(fmt(row.per5));
            line.push(fmt(row.per95));
            rows.push(line);
        }
        rows
    }
}

/// Station monthly anomalies (value minus all-year monthly average).
pub fn two_year_anomalies(table: &PeriodTable, starts: &[i32]) -> Result<TwoYearAnomalies> {
    table.expect_granularity(Granularity::Month, "two-year anomalies")?;
    validate_start_years(starts, &table.years())?;

    let points: Vec<(i32, u32, Option<f64>)> = table
        .rows
        .iter()
        .filter_map(|row| Some((row.year(), row.key.sub.month()?, row.anomaly())))
        .collect();

    Ok(TwoYearAnomalies::build(
        format!("{} {} anomalies", table.meta.station, table.meta.long_name()),
        two_year_anomaly_filename(table.meta.element, &table.meta.station),
        starts,
        &points,
    ))
}

/// Niño-3.4 sea surface temperature anomalies.
pub fn sst_two_year_anomalies(records: &[SstRecord], starts: &[i32]) -> Result<TwoYearAnomalies> {
    let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
    years.dedup();
    validate_start_years(starts, &years)?;

    let points: Vec<(i32, u32, Option<f64>)> = records
        .iter()
        .map(|r| (r.year, r.month, Some(r.nino34_anomaly)))
        .collect();

    Ok(TwoYearAnomalies::build(
        "Niño-3.4 SST anomalies".to_string(),
        sst_anomaly_filename().to_string(),
        starts,
        &points,
    ))
}
