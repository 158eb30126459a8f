use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::calendar::CalendarFields;
use crate::models::element::Element;

/// One calendar day of a single station with one value per element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub calendar: CalendarFields,
    pub values: BTreeMap<Element, Option<f64>>,
}

impl DailyRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            calendar: CalendarFields::from_date(date),
            values: BTreeMap::new(),
        }
    }

    pub fn value(&self, element: Element) -> Option<f64> {
        self.values.get(&element).copied().flatten()
    }
}

/// A single station's continuous daily series.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTable {
    pub station: String,
    pub elements: Vec<Element>,
    pub rows: Vec<DailyRow>,
}

impl DailyTable {
    pub fn has_element(&self, element: Element) -> bool {
        self.elements.contains(&element)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Share of days (0-1) without a value for `element`.
    pub fn missing_fraction(&self, element: Element) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let missing = self
            .rows
            .iter()
            .filter(|r| r.value(element).is_none())
            .count();
        missing as f64 / self.rows.len() as f64
    }

    /// Human readable summary such as `PRECIP (2.1% NaN) and TMPMIN (40.0% NaN).`
    pub fn missing_summary(&self) -> String {
        let parts: Vec<String> = self
            .elements
            .iter()
            .map(|e| format!("{} ({:.1}% NaN)", e, self.missing_fraction(*e) * 100.0))
            .collect();
        match parts.split_last() {
            None => String::from("none."),
            Some((last, [])) => format!("{last}."),
            Some((last, rest)) => format!("{} and {}.", rest.join(", "), last),
        }
    }

    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.calendar.year).collect();
        years.dedup();
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: NaiveDate, precip: Option<f64>, tmin: Option<f64>) -> DailyRow {
        let mut row = DailyRow::new(date);
        row.values.insert(Element::Precipitation, precip);
        row.values.insert(Element::MinTemperature, tmin);
        row
    }

    #[test]
    fn test_missing_summary() {
        let d = |day| NaiveDate::from_ymd_opt(2021, 3, day).unwrap();
        let table = DailyTable {
            station: "Assela".to_string(),
            elements: vec![Element::Precipitation, Element::MinTemperature],
            rows: vec![
                row(d(1), Some(1.0), None),
                row(d(2), None, None),
                row(d(3), Some(0.0), Some(9.0)),
                row(d(4), Some(0.0), None),
            ],
        };

        assert_eq!(table.missing_fraction(Element::Precipitation), 0.25);
        assert_eq!(
            table.missing_summary(),
            "PRECIP (25.0% NaN) and TMPMIN (75.0% NaN)."
        );
        assert_eq!(table.first_date(), Some(d(1)));
        assert_eq!(table.years(), vec![2021]);
    }
}
