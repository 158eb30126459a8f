use std::collections::BTreeMap;
use tracing::info;

use crate::error::{ProcessingError, Result};
use crate::models::element::rainy_day;
use crate::models::{
    CrossSection, CrossSectionMeta, CrossSectionRow, Element, Observation, ObservationTable,
    PeriodFilter,
};
use crate::utils::statistics::{mean, sample_std};

/// Values of one element for all stations over one fixed period.
#[derive(Debug, Default)]
pub struct CrossSectionExtractor;

impl CrossSectionExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(
        &self,
        table: &ObservationTable,
        element: Element,
        year: i32,
        filter: PeriodFilter,
    ) -> Result<CrossSection> {
        let aggregation = element.require_aggregation()?;
        let source = self.source_element(table, element)?;
        self.validate_period(table, year, &filter)?;

        // Per station, per matching year: present values of the element.
        let mut per_year: BTreeMap<&str, BTreeMap<i32, Vec<f64>>> = BTreeMap::new();
        for obs in table.iter().filter(|o| o.element == source) {
            if !matches_filter(obs, &filter) {
                continue;
            }
            let values = per_year
                .entry(obs.station.as_str())
                .or_default()
                .entry(matching_year(obs, &filter))
                .or_default();
            let value = if element == Element::RainyDay {
                rainy_day(obs.value)
            } else {
                obs.value
            };
            if let Some(value) = value {
                values.push(value);
            }
        }

        let rows: Vec<CrossSectionRow> = per_year
            .into_iter()
            .filter_map(|(station, years)| {
                let target = years.get(&year)?;
                let history: Vec<f64> = years
                    .values()
                    .filter_map(|values| aggregation.apply(values))
                    .collect();
                Some(CrossSectionRow {
                    station: station.to_string(),
                    value: aggregation.apply(target),
                    average: mean(&history),
                    std_dev: sample_std(&history),
                })
            })
            .collect();

        let meta = CrossSectionMeta {
            element,
            year,
            filter,
        };
        info!(
            "Data for element {} is calculated for {} for {} locations",
            element,
            meta.label(),
            rows.len()
        );
        Ok(CrossSection { meta, rows })
    }

    /// Element whose observations feed the cross-section; rainy days come from rainfall.
    fn source_element(&self, table: &ObservationTable, element: Element) -> Result<Element> {
        let source = if element == Element::RainyDay && !table.has_element(Element::RainyDay) {
            Element::Precipitation
        } else {
            element
        };
        if table.has_element(source) {
            return Ok(source);
        }
        Err(ProcessingError::ElementNotFound {
            element: element.code(),
            available: table.elements().into_iter().map(|e| e.code()).collect(),
        })
    }

    fn validate_period(&self, table: &ObservationTable, year: i32, filter: &PeriodFilter) -> Result<()> {
        let in_year = || table.iter().filter(move |o| o.year() == year);

        if in_year().next().is_none() {
            return Err(ProcessingError::YearNotFound(year));
        }

        if let Some(dekad) = filter.dekad {
            let Some(month) = filter.month else {
                return Err(ProcessingError::DekadWithoutMonth(dekad.index()));
            };
            if !in_year().any(|o| o.month() == month) {
                return Err(ProcessingError::PeriodNotFound(PeriodFilter::month(month).label(year)));
            }
            if !in_year().any(|o| o.month() == month && o.dekad() == dekad) {
                return Err(ProcessingError::PeriodNotFound(filter.label(year)));
            }
        } else if let Some(month) = filter.month {
            if !in_year().any(|o| o.month() == month) {
                return Err(ProcessingError::PeriodNotFound(filter.label(year)));
            }
        } else if let Some(season) = filter.season {
            if !in_year().any(|o| o.season() == season) {
                return Err(ProcessingError::PeriodNotFound(filter.label(year)));
            }
        }
        Ok(())
    }
}

/// Most specific selection wins: dekad, then month, then season.
fn matches_filter(obs: &Observation, filter: &PeriodFilter) -> bool {
    match (filter.month, filter.dekad, filter.season) {
        (Some(month), Some(dekad), _) => obs.month() == month && obs.dekad() == dekad,
        (Some(month), None, _) => obs.month() == month,
        (None, _, Some(season)) => obs.season() == season,
        (None, _, None) => true,
    }
}

/// Season selections match on season-year so that January joins its Bega.
fn matching_year(obs: &Observation, filter: &PeriodFilter) -> i32 {
    if filter.month.is_none() && filter.season.is_some() {
        obs.season_year()
    } else {
        obs.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dekad, Season};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn obs(station: &str, element: Element, y: i32, m: u32, d: u32, value: Option<f64>) -> Observation {
        let timestamp = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Observation::new(station.to_string(), element, timestamp, value)
    }

    fn sample_table() -> ObservationTable {
        use Element::{MaxTemperature as TX, Precipitation as PR};
        ObservationTable::new(
            vec![
                obs("Assela", PR, 2019, 3, 5, Some(10.0)),
                obs("Assela", PR, 2019, 3, 15, Some(0.5)),
                obs("Assela", PR, 2020, 3, 5, Some(4.0)),
                obs("Assela", PR, 2020, 3, 25, Some(6.0)),
                obs("Assela", PR, 2020, 10, 1, Some(2.0)),
                obs("Assela", PR, 2021, 1, 3, Some(3.0)),
                obs("Gore", PR, 2020, 3, 6, None),
                obs("Gore", PR, 2018, 3, 6, Some(30.0)),
                obs("Gore", TX, 2020, 3, 6, Some(24.0)),
                obs("Gore", TX, 2020, 3, 7, Some(26.0)),
            ],
            None,
        )
    }

    #[test]
    fn test_month_cross_section() -> Result<()> {
        let section = CrossSectionExtractor::new().extract(
            &sample_table(),
            Element::Precipitation,
            2020,
            PeriodFilter::month(3),
        )?;

        assert_eq!(section.meta.label(), "2020-3");
        assert_eq!(section.len(), 2);

        let assela = section.get("Assela").unwrap();
        assert_eq!(assela.value, Some(10.0));
        assert_eq!(assela.average, Some(10.25));

        // Gore's only March 2020 value is absent: the row stays, without a value.
        let gore = section.get("Gore").unwrap();
        assert_eq!(gore.value, None);
        assert_eq!(gore.average, Some(30.0));
        assert_eq!(gore.std_dev, None);
        Ok(())
    }

    #[test]
    fn test_dekad_and_averaging() -> Result<()> {
        let extractor = CrossSectionExtractor::new();
        let table = sample_table();

        let dekad = extractor.extract(&table, Element::Precipitation, 2020, PeriodFilter::dekad(3, Dekad::First))?;
        assert_eq!(dekad.get("Assela").unwrap().value, Some(4.0));
        assert_eq!(dekad.meta.label(), "2020-3 dk1");

        let temperature = extractor.extract(&table, Element::MaxTemperature, 2020, PeriodFilter::year())?;
        assert_eq!(temperature.len(), 1);
        assert_eq!(temperature.get("Gore").unwrap().value, Some(25.0));
        Ok(())
    }

    #[test]
    fn test_season_uses_season_year() -> Result<()> {
        let section = CrossSectionExtractor::new().extract(
            &sample_table(),
            Element::Precipitation,
            2020,
            PeriodFilter::season(Season::Bega),
        )?;
        assert_eq!(section.meta.label(), "2020 Bega");
        assert_eq!(section.get("Assela").unwrap().value, Some(5.0));
        assert!(section.get("Gore").is_none());
        Ok(())
    }

    #[test]
    fn test_rainy_days_from_precipitation() -> Result<()> {
        let section = CrossSectionExtractor::new().extract(
            &sample_table(),
            Element::RainyDay,
            2019,
            PeriodFilter::month(3),
        )?;
        let assela = section.get("Assela").unwrap();
        assert_eq!(assela.value, Some(1.0));
        assert_eq!(assela.average, Some(1.5));
        Ok(())
    }

    #[test]
    fn test_validation_order() {
        let extractor = CrossSectionExtractor::new();
        let table = sample_table();

        let err = |element, year, filter| extractor.extract(&table, element, year, filter).unwrap_err();

        assert!(matches!(
            err(Element::WindSpeed, 2020, PeriodFilter::year()),
            ProcessingError::ElementNotImplemented(_)
        ));
        assert!(matches!(
            err(Element::MinTemperature, 2020, PeriodFilter::year()),
            ProcessingError::ElementNotFound { .. }
        ));
        assert!(matches!(
            err(Element::Precipitation, 2005, PeriodFilter::year()),
            ProcessingError::YearNotFound(2005)
        ));
        let no_month = PeriodFilter {
            dekad: Some(Dekad::Second),
            ..PeriodFilter::default()
        };
        assert!(matches!(
            err(Element::Precipitation, 2020, no_month),
            ProcessingError::DekadWithoutMonth(2)
        ));
        assert!(matches!(
            err(Element::Precipitation, 2020, PeriodFilter::dekad(3, Dekad::Second)),
            ProcessingError::PeriodNotFound(label) if label == "2020-3 dk2"
        ));
        assert!(matches!(
            err(Element::Precipitation, 2020, PeriodFilter::month(7)),
            ProcessingError::PeriodNotFound(_)
        ));
        assert!(matches!(
            err(Element::Precipitation, 2020, PeriodFilter::season(Season::Kiremt)),
            ProcessingError::PeriodNotFound(_)
        ));
    }
}
