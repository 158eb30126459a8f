use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::models::calendar::{CalendarFields, Dekad, Season};
use crate::models::element::Element;

/// One daily value of one element at one station, in long format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: String,
    pub element: Element,
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
    pub calendar: CalendarFields,
}

impl Observation {
    pub fn new(
        station: String,
        element: Element,
        timestamp: NaiveDateTime,
        value: Option<f64>,
    ) -> Self {
        Self {
            station,
            element,
            timestamp,
            value,
            calendar: CalendarFields::from_date(timestamp.date()),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn year(&self) -> i32 {
        self.calendar.year
    }

    pub fn month(&self) -> u32 {
        self.calendar.month
    }

    pub fn day(&self) -> u32 {
        self.calendar.day
    }

    pub fn season(&self) -> Season {
        self.calendar.season
    }

    pub fn season_year(&self) -> i32 {
        self.calendar.season_year
    }

    pub fn dekad(&self) -> Dekad {
        self.calendar.dekad
    }
}

/// The canonical long-format dataset, sorted by station, element code and time.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    pub source: Option<PathBuf>,
    observations: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(mut observations: Vec<Observation>, source: Option<PathBuf>) -> Self {
        observations.sort_by(|a, b| {
            a.station
                .cmp(&b.station)
                .then_with(|| a.element.code().cmp(b.element.code()))
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });
        Self {
            source,
            observations,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn station_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.iter().map(|o| o.station.as_str()).collect();
        names.into_iter().map(str::to_string).collect()
    }

    pub fn elements(&self) -> BTreeSet<Element> {
        self.iter().map(|o| o.element).collect()
    }

    pub fn has_element(&self, element: Element) -> bool {
        self.iter().any(|o| o.element == element)
    }

    pub fn has_station(&self, station: &str) -> bool {
        self.iter().any(|o| o.station == station)
    }

    pub fn for_station<'a>(&'a self, station: &'a str) -> impl Iterator<Item = &'a Observation> {
        self.iter().filter(move |o| o.station == station)
    }
}

impl<'a> IntoIterator for &'a ObservationTable {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_observation_calendar_fields() {
        let obs = Observation::new(
            "Assela".to_string(),
            Element::Precipitation,
            at(2020, 1, 25, 9),
            Some(3.0),
        );
        assert_eq!(obs.season(), Season::Bega);
        assert_eq!(obs.season_year(), 2019);
        assert_eq!(obs.dekad(), Dekad::Third);
        assert_eq!(obs.hour(), 9);
    }

    #[test]
    fn test_table_sorting() {
        let table = ObservationTable::new(
            vec![
                Observation::new("Bahir Dar".into(), Element::Precipitation, at(2020, 1, 1, 9), None),
                Observation::new("Assela".into(), Element::MinTemperature, at(2020, 1, 2, 9), Some(8.0)),
                Observation::new("Assela".into(), Element::Precipitation, at(2020, 1, 2, 9), Some(1.0)),
                Observation::new("Assela".into(), Element::Precipitation, at(2020, 1, 1, 9), Some(2.0)),
            ],
            None,
        );

        let keys: Vec<(&str, &str, u32)> = table
            .iter()
            .map(|o| (o.station.as_str(), o.element.code(), o.day()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Assela", "PRECIP", 1),
                ("Assela", "PRECIP", 2),
                ("Assela", "TMPMIN", 2),
                ("Bahir Dar", "PRECIP", 1),
            ]
        );
        assert_eq!(table.station_names(), vec!["Assela", "Bahir Dar"]);
    }
}
