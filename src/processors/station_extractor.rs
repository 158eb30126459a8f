use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::error::{ProcessingError, Result};
use crate::models::element::rainy_day;
use crate::models::station::normalize_station_name;
use crate::models::{Aggregation, DailyRow, DailyTable, Element, ObservationTable};

/// Reshapes one station's observations into a continuous daily table.
#[derive(Debug, Default)]
pub struct StationExtractor;

impl StationExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, table: &ObservationTable, station: &str) -> Result<DailyTable> {
        let name = normalize_station_name(station);
        if !table.has_station(&name) {
            return Err(ProcessingError::StationNotFound {
                name,
                available: table.station_names(),
            });
        }

        let mut elements: BTreeSet<Element> = BTreeSet::new();
        let mut days: BTreeMap<NaiveDate, BTreeMap<Element, Vec<f64>>> = BTreeMap::new();
        for obs in table.for_station(&name) {
            elements.insert(obs.element);
            let values = days.entry(obs.date()).or_default().entry(obs.element).or_default();
            if let Some(value) = obs.value {
                values.push(value);
            }
        }

        let derive_rainy_days = elements.contains(&Element::Precipitation);
        if derive_rainy_days {
            elements.insert(Element::RainyDay);
        }
        let elements: Vec<Element> = elements.into_iter().collect();

        let (Some(first), Some(last)) = (days.keys().next().copied(), days.keys().last().copied())
        else {
            return Err(ProcessingError::MissingData(format!(
                "no observations for station {}",
                name
            )));
        };

        let rows: Vec<DailyRow> = first
            .iter_days()
            .take_while(|date| *date <= last)
            .map(|date| {
                let mut row = DailyRow::new(date);
                let observed = days.get(&date);
                for element in &elements {
                    let value = observed
                        .and_then(|values| values.get(element))
                        .and_then(|values| Aggregation::Averaging.apply(values));
                    row.values.insert(*element, value);
                }
                if derive_rainy_days {
                    let rd = rainy_day(row.value(Element::Precipitation));
                    row.values.insert(Element::RainyDay, rd);
                }
                row
            })
            .collect();

        let daily = DailyTable {
            station: name,
            elements,
            rows,
        };
        info!(
            "Station {} has data from {} to {}. Missing values: {}",
            daily.station,
            first,
            last,
            daily.missing_summary()
        );
        Ok(daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use pretty_assertions::assert_eq;

    fn obs(station: &str, element: Element, day: u32, hour: u32, value: Option<f64>) -> Observation {
        let timestamp = NaiveDate::from_ymd_opt(2021, 7, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Observation::new(station.to_string(), element, timestamp, value)
    }

    fn sample_table() -> ObservationTable {
        ObservationTable::new(
            vec![
                obs("Assela", Element::Precipitation, 1, 9, Some(0.5)),
                obs("Assela", Element::Precipitation, 3, 9, Some(12.0)),
                obs("Assela", Element::Precipitation, 3, 15, Some(4.0)),
                obs("Assela", Element::MinTemperature, 2, 9, Some(9.0)),
                obs("Assela", Element::MinTemperature, 4, 9, None),
                obs("Gore", Element::Precipitation, 1, 9, Some(3.0)),
            ],
            None,
        )
    }

    #[test]
    fn test_daily_table_is_continuous() -> Result<()> {
        let daily = StationExtractor::new().extract(&sample_table(), " assela")?;

        assert_eq!(daily.station, "Assela");
        assert_eq!(
            daily.elements,
            vec![Element::Precipitation, Element::RainyDay, Element::MinTemperature]
        );
        assert_eq!(daily.rows.len(), 4);

        let precip: Vec<Option<f64>> = daily
            .rows
            .iter()
            .map(|r| r.value(Element::Precipitation))
            .collect();
        assert_eq!(precip, vec![Some(0.5), None, Some(8.0), None]);

        let rd: Vec<Option<f64>> = daily.rows.iter().map(|r| r.value(Element::RainyDay)).collect();
        assert_eq!(rd, vec![Some(0.0), None, Some(1.0), None]);

        assert_eq!(daily.rows[1].value(Element::MinTemperature), Some(9.0));
        assert_eq!(daily.missing_fraction(Element::MinTemperature), 0.75);
        Ok(())
    }

    #[test]
    fn test_unknown_station() {
        let result = StationExtractor::new().extract(&sample_table(), "Jimma");
        match result {
            Err(ProcessingError::StationNotFound { name, available }) => {
                assert_eq!(name, "Jimma");
                assert_eq!(available, vec!["Assela", "Gore"]);
            }
            other => panic!("expected StationNotFound, got {:?}", other),
        }
    }
}
