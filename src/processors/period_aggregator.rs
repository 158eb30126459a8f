use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::models::{
    Aggregation, DailyTable, Element, Granularity, PeriodKey, PeriodMeta, PeriodStatistic, PeriodTable,
    SubPeriod,
};
use crate::utils::statistics::{mean, sample_std};

#[derive(Debug, Default)]
struct Group {
    values: Vec<f64>,
}

/// Aggregates a station's daily table into day, dekad, month, season or year statistics.
#[derive(Debug, Default)]
pub struct PeriodAggregator;

impl PeriodAggregator {
    pub fn new() -> Self {
        Self
    }

    /// String front end used by the CLI: element and granularity are parsed here.
    pub fn aggregate_named(
        &self,
        daily: &DailyTable,
        element: &str,
        granularity: &str,
    ) -> Result<PeriodTable> {
        let element: Element = element.parse()?;
        self.check_element(daily, element)?;
        let granularity: Granularity = granularity.parse()?;
        self.aggregate(daily, element, granularity)
    }

    pub fn aggregate(
        &self,
        daily: &DailyTable,
        element: Element,
        granularity: Granularity,
    ) -> Result<PeriodTable> {
        let aggregation = self.check_element(daily, element)?;

        let mut groups: BTreeMap<PeriodKey, Group> = BTreeMap::new();
        for row in &daily.rows {
            let group = groups.entry(granularity.key_for(&row.calendar)).or_default();
            if let Some(value) = row.value(element) {
                group.values.push(value);
            }
        }

        let aggregated: Vec<(PeriodKey, Option<f64>, usize)> = groups
            .into_iter()
            .map(|(key, group)| (key, aggregation.apply(&group.values), group.values.len()))
            .collect();

        let mut history: BTreeMap<SubPeriod, Vec<f64>> = BTreeMap::new();
        for (key, value, _) in &aggregated {
            if let Some(value) = value {
                history.entry(key.sub).or_default().push(*value);
            }
        }
        let baseline: BTreeMap<SubPeriod, (Option<f64>, Option<f64>)> = history
            .into_iter()
            .map(|(sub, values)| (sub, (mean(&values), sample_std(&values))))
            .collect();

        let mut dropped = 0;
        let mut rows = Vec::with_capacity(aggregated.len());
        for (key, value, observed_days) in aggregated {
            let (average, std_dev) = baseline.get(&key.sub).copied().unwrap_or((None, None));
            let period_days = key.calendar_days();
            let completeness = period_days.map(|days| observed_days as f64 / days as f64);

            let keep = match granularity {
                Granularity::Day => value.is_some(),
                _ => completeness.is_some_and(|c| c > 0.0),
            };
            if !keep {
                dropped += 1;
                continue;
            }

            rows.push(PeriodStatistic {
                key,
                value,
                average,
                std_dev,
                period_days,
                observed_days,
                completeness,
            });
        }

        debug!("Dropped {} {} periods without observations", dropped, granularity);
        info!(
            "Data for {} at {} aggregated to {} {} periods",
            element,
            daily.station,
            rows.len(),
            granularity
        );

        Ok(PeriodTable {
            meta: PeriodMeta {
                element,
                station: daily.station.clone(),
                granularity,
            },
            rows,
        })
    }

    fn check_element(&self, daily: &DailyTable, element: Element) -> Result<Aggregation> {
        let aggregation = element.require_aggregation()?;
        if !daily.has_element(element) {
            return Err(ProcessingError::ElementNotFound {
                element: element.code(),
                available: daily.elements.iter().map(|e| e.code()).collect(),
            });
        }
        Ok(aggregation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyRow, Dekad, Season};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn daily_table(days: &[(NaiveDate, Option<f64>)]) -> DailyTable {
        let rows = days
            .iter()
            .map(|(date, value)| {
                let mut row = DailyRow::new(*date);
                row.values.insert(Element::Precipitation, *value);
                row.values.insert(Element::MinTemperature, value.map(|v| v / 2.0));
                row
            })
            .collect();
        DailyTable {
            station: "Assela".to_string(),
            elements: vec![Element::Precipitation, Element::MinTemperature],
            rows,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_row_under_sum_and_mean() -> Result<()> {
        let daily = daily_table(&[(date(2020, 3, 5), Some(8.0))]);
        let aggregator = PeriodAggregator::new();

        let sum = aggregator.aggregate(&daily, Element::Precipitation, Granularity::Month)?;
        let avg = aggregator.aggregate(&daily, Element::MinTemperature, Granularity::Month)?;

        assert_eq!(sum.rows.len(), 1);
        assert_eq!(sum.rows[0].value, Some(8.0));
        assert_eq!(avg.rows[0].value, Some(4.0));
        assert_eq!(sum.rows[0].std_dev, None);
        Ok(())
    }

    #[test]
    fn test_full_dekad_is_complete() -> Result<()> {
        let days: Vec<_> = (1..=28).map(|d| (date(2021, 2, d), Some(1.0))).collect();
        let daily = daily_table(&days);

        let table = PeriodAggregator::new().aggregate(&daily, Element::Precipitation, Granularity::Dekad)?;

        let completeness: Vec<_> = table.rows.iter().map(|r| r.completeness).collect();
        assert_eq!(completeness, vec![Some(1.0), Some(1.0), Some(1.0)]);
        assert_eq!(table.rows[2].period_days, Some(8));
        assert_eq!(table.rows[2].value, Some(8.0));
        assert_eq!(table.rows[2].key.sub, SubPeriod::Dekad { month: 2, dekad: Dekad::Third });
        Ok(())
    }

    #[test]
    fn test_empty_periods_are_excluded() -> Result<()> {
        let mut days: Vec<_> = (1..=31).map(|d| (date(2020, 1, d), None)).collect();
        days.push((date(2020, 2, 1), Some(2.0)));
        let daily = daily_table(&days);
        let aggregator = PeriodAggregator::new();

        let months = aggregator.aggregate(&daily, Element::Precipitation, Granularity::Month)?;
        assert_eq!(months.rows.len(), 1);
        assert_eq!(months.rows[0].key.sub, SubPeriod::Month(2));
        assert_eq!(months.rows[0].completeness, Some(1.0 / 29.0));

        let day_rows = aggregator.aggregate(&daily, Element::Precipitation, Granularity::Day)?;
        assert_eq!(day_rows.rows.len(), 1);
        assert_eq!(day_rows.rows[0].completeness, None);
        Ok(())
    }

    #[test]
    fn test_history_per_sub_period() -> Result<()> {
        let daily = daily_table(&[
            (date(2018, 7, 1), Some(10.0)),
            (date(2019, 7, 1), Some(20.0)),
            (date(2020, 7, 1), Some(30.0)),
        ]);
        let table = PeriodAggregator::new().aggregate(&daily, Element::Precipitation, Granularity::Year)?;

        assert_eq!(table.years(), vec![2018, 2019, 2020]);
        for row in &table.rows {
            assert_eq!(row.average, Some(20.0));
            assert_eq!(row.std_dev, Some(10.0));
        }
        assert_eq!(table.rows[1].anomaly(), Some(0.0));
        Ok(())
    }

    #[test]
    fn test_seasons_sorted_in_season_order() -> Result<()> {
        let days: Vec<_> = [
            date(2019, 2, 1),
            date(2019, 6, 1),
            date(2019, 10, 1),
            date(2020, 1, 15),
            date(2020, 3, 1),
        ]
        .into_iter()
        .map(|d| (d, Some(1.0)))
        .collect();
        let table = PeriodAggregator::new().aggregate(&daily_table(&days), Element::Precipitation, Granularity::Season)?;

        let keys: Vec<(i32, Option<Season>)> =
            table.rows.iter().map(|r| (r.year(), r.key.sub.season())).collect();
        assert_eq!(
            keys,
            vec![
                (2019, Some(Season::Belg)),
                (2019, Some(Season::Kiremt)),
                (2019, Some(Season::Bega)),
                (2020, Some(Season::Belg)),
            ]
        );
        assert_eq!(table.rows[2].value, Some(2.0));
        assert_eq!(table.rows[2].period_days, Some(123));
        Ok(())
    }

    #[test]
    fn test_validation_errors() {
        let daily = daily_table(&[(date(2020, 3, 5), Some(8.0))]);
        let aggregator = PeriodAggregator::new();

        assert!(matches!(
            aggregator.aggregate_named(&daily, "SUNHRS", "month"),
            Err(ProcessingError::UnknownElement { .. })
        ));
        assert!(matches!(
            aggregator.aggregate_named(&daily, "WINSPD", "month"),
            Err(ProcessingError::ElementNotImplemented("WINSPD"))
        ));
        assert!(matches!(
            aggregator.aggregate_named(&daily, "TMPMAX", "month"),
            Err(ProcessingError::ElementNotFound { element: "TMPMAX", .. })
        ));
        assert!(matches!(
            aggregator.aggregate_named(&daily, "PRECIP", "week"),
            Err(ProcessingError::UnknownGranularity(_))
        ));
    }
}
