use serde::Serialize;

use crate::models::{CrossSection, PeriodTable};
use crate::utils::filename::period_table_filename;
use crate::writers::csv_writer::CsvProduct;

/// Flat CSV row of a period table; sub-period columns not used by the granularity stay empty.
#[derive(Debug, Serialize)]
pub struct PeriodRecord {
    pub year: i32,
    pub season: Option<&'static str>,
    pub month: Option<u32>,
    pub dekad: Option<u8>,
    pub day: Option<u32>,
    pub element: &'static str,
    pub value: Option<f64>,
    pub average: Option<f64>,
    pub std_dev: Option<f64>,
    pub period_days: Option<u32>,
    pub observed_days: usize,
    pub completeness: Option<f64>,
}

impl CsvProduct for PeriodTable {
    type Record = PeriodRecord;

    fn filename(&self) -> String {
        period_table_filename(self.meta.element, &self.meta.station, self.meta.granularity)
    }

    fn records(&self) -> Vec<PeriodRecord> {
        self.rows
            .iter()
            .map(|row| PeriodRecord {
                year: row.key.year,
                season: row.key.sub.season().map(|s| s.name()),
                month: row.key.sub.month(),
                dekad: row.key.sub.dekad().map(|d| d.index()),
                day: row.key.sub.day(),
                element: self.meta.element.code(),
                value: row.value,
                average: row.average,
                std_dev: row.std_dev,
                period_days: row.period_days,
                observed_days: row.observed_days,
                completeness: row.completeness,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct CrossSectionRecord {
    pub station: String,
    pub element: &'static str,
    pub period: String,
    pub value: Option<f64>,
    pub average: Option<f64>,
    pub std_dev: Option<f64>,
}

pub fn cross_section_records(section: &CrossSection) -> Vec<CrossSectionRecord> {
    let label = section.meta.label();
    section
        .rows
        .iter()
        .map(|row| CrossSectionRecord {
            station: row.station.clone(),
            element: section.meta.element.code(),
            period: label.clone(),
            value: row.value,
            average: row.average,
            std_dev: row.std_dev,
        })
        .collect()
}
