use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ProcessingError, Result};
use crate::models::calendar::{days_in_month, days_in_year, CalendarFields, Dekad, Season};
use crate::models::element::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Dekad,
    Month,
    Season,
    Year,
}

impl Granularity {
    pub fn name(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Dekad => "dekadal",
            Granularity::Month => "month",
            Granularity::Season => "season",
            Granularity::Year => "year",
        }
    }

    /// Key of the period containing a day with the given calendar fields.
    pub fn key_for(&self, calendar: &CalendarFields) -> PeriodKey {
        let (year, sub) = match self {
            Granularity::Day => (
                calendar.year,
                SubPeriod::Day {
                    month: calendar.month,
                    day: calendar.day,
                },
            ),
            Granularity::Dekad => (
                calendar.year,
                SubPeriod::Dekad {
                    month: calendar.month,
                    dekad: calendar.dekad,
                },
            ),
            Granularity::Month => (calendar.year, SubPeriod::Month(calendar.month)),
            Granularity::Season => (calendar.season_year, SubPeriod::Season(calendar.season)),
            Granularity::Year => (calendar.year, SubPeriod::Year),
        };
        PeriodKey { year, sub }
    }
}

impl FromStr for Granularity {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "dekad" | "dekadal" => Ok(Granularity::Dekad),
            "month" | "monthly" => Ok(Granularity::Month),
            "season" | "seasonal" => Ok(Granularity::Season),
            "year" | "yearly" => Ok(Granularity::Year),
            _ => Err(ProcessingError::UnknownGranularity(s.to_string())),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The part of a period key that repeats every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubPeriod {
    Year,
    Season(Season),
    Month(u32),
    Dekad { month: u32, dekad: Dekad },
    Day { month: u32, day: u32 },
}

impl SubPeriod {
    pub fn month(&self) -> Option<u32> {
        match self {
            SubPeriod::Month(month)
            | SubPeriod::Dekad { month, .. }
            | SubPeriod::Day { month, .. } => Some(*month),
            _ => None,
        }
    }

    pub fn season(&self) -> Option<Season> {
        match self {
            SubPeriod::Season(season) => Some(*season),
            _ => None,
        }
    }

    pub fn dekad(&self) -> Option<Dekad> {
        match self {
            SubPeriod::Dekad { dekad, .. } => Some(*dekad),
            _ => None,
        }
    }

    pub fn day(&self) -> Option<u32> {
        match self {
            SubPeriod::Day { day, .. } => Some(*day),
            _ => None,
        }
    }
}

/// A period instance: a year (season-year for seasons) plus its sub-year part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub sub: SubPeriod,
}

impl PeriodKey {
    /// Calendar length of the period instance; `None` for single days.
    pub fn calendar_days(&self) -> Option<u32> {
        match self.sub {
            SubPeriod::Day { .. } => None,
            SubPeriod::Dekad { month, dekad } => dekad.length(self.year, month),
            SubPeriod::Month(month) => days_in_month(self.year, month),
            SubPeriod::Season(season) => season.length(self.year),
            SubPeriod::Year => days_in_year(self.year),
        }
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sub {
            SubPeriod::Year => write!(f, "{}", self.year),
            SubPeriod::Season(season) => write!(f, "{} {}", self.year, season),
            SubPeriod::Month(month) => write!(f, "{}-{:02}", self.year, month),
            SubPeriod::Dekad { month, dekad } => write!(f, "{}-{:02} {}", self.year, month, dekad),
            SubPeriod::Day { month, day } => write!(f, "{}-{:02}-{:02}", self.year, month, day),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStatistic {
    pub key: PeriodKey,
    pub value: Option<f64>,
    pub average: Option<f64>,
    pub std_dev: Option<f64>,
    pub period_days: Option<u32>,
    pub observed_days: usize,
    pub completeness: Option<f64>,
}

impl PeriodStatistic {
    pub fn year(&self) -> i32 {
        self.key.year
    }

    /// Departure from the historical average.
    pub fn anomaly(&self) -> Option<f64> {
        Some(self.value? - self.average?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodMeta {
    pub element: Element,
    pub station: String,
    pub granularity: Granularity,
}

impl PeriodMeta {
    pub fn long_name(&self) -> &'static str {
        self.element.long_name()
    }

    pub fn unit(&self) -> &'static str {
        self.element.unit()
    }
}

/// Period statistics of one element at one station.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTable {
    pub meta: PeriodMeta,
    pub rows: Vec<PeriodStatistic>,
}

impl PeriodTable {
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.key.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.rows.iter().any(|r| r.key.year == year)
    }

    pub fn rows_for_year(&self, year: i32) -> impl Iterator<Item = &PeriodStatistic> {
        self.rows.iter().filter(move |r| r.key.year == year)
    }

    pub fn get(&self, key: &PeriodKey) -> Option<&PeriodStatistic> {
        self.rows.iter().find(|r| r.key == *key)
    }

    /// Fails unless this table was aggregated at `granularity`.
    pub fn expect_granularity(&self, granularity: Granularity, product: &str) -> Result<()> {
        if self.meta.granularity != granularity {
            return Err(ProcessingError::WrongTable(format!(
                "{} needs a single station {} table, got a {} table",
                product, granularity, self.meta.granularity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_key_display() {
        let key = |sub| PeriodKey { year: 2020, sub };
        assert_eq!(key(SubPeriod::Year).to_string(), "2020");
        assert_eq!(key(SubPeriod::Season(Season::Belg)).to_string(), "2020 Belg");
        assert_eq!(
            key(SubPeriod::Dekad { month: 3, dekad: Dekad::Second }).to_string(),
            "2020-03 dk2"
        );
        assert_eq!(key(SubPeriod::Day { month: 2, day: 29 }).to_string(), "2020-02-29");
    }

    #[test]
    fn test_granularity_keys() {
        let cal = CalendarFields::from_date(NaiveDate::from_ymd_opt(2020, 1, 15).unwrap());

        assert_eq!(
            Granularity::Season.key_for(&cal),
            PeriodKey {
                year: 2019,
                sub: SubPeriod::Season(Season::Bega)
            }
        );
        assert_eq!(
            Granularity::Dekad.key_for(&cal),
            PeriodKey {
                year: 2020,
                sub: SubPeriod::Dekad {
                    month: 1,
                    dekad: Dekad::Second
                }
            }
        );
        assert_eq!(Granularity::Year.key_for(&cal).sub, SubPeriod::Year);
    }

    #[test]
    fn test_calendar_days() {
        let key = |year, sub| PeriodKey { year, sub };
        assert_eq!(key(2020, SubPeriod::Month(2)).calendar_days(), Some(29));
        assert_eq!(
            key(
                2021,
                SubPeriod::Dekad {
                    month: 2,
                    dekad: Dekad::Third
                }
            )
            .calendar_days(),
            Some(8)
        );
        assert_eq!(key(2020, SubPeriod::Season(Season::Belg)).calendar_days(), Some(121));
        assert_eq!(key(2019, SubPeriod::Year).calendar_days(), Some(365));
        assert_eq!(key(2019, SubPeriod::Day { month: 1, day: 1 }).calendar_days(), None);
        assert_eq!(key(2019, SubPeriod::Month(13)).calendar_days(), None);
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!("dekadal".parse::<Granularity>().unwrap(), Granularity::Dekad);
        assert_eq!("Season".parse::<Granularity>().unwrap(), Granularity::Season);
        assert!(matches!(
            "fortnight".parse::<Granularity>(),
            Err(ProcessingError::UnknownGranularity(_))
        ));
    }

    #[test]
    fn test_key_ordering_puts_seasons_in_season_order() {
        let mut keys = vec![
            PeriodKey { year: 2020, sub: SubPeriod::Season(Season::Belg) },
            PeriodKey { year: 2019, sub: SubPeriod::Season(Season::Bega) },
            PeriodKey { year: 2019, sub: SubPeriod::Season(Season::Belg) },
            PeriodKey { year: 2019, sub: SubPeriod::Season(Season::Kiremt) },
        ];
        keys.sort();
        let seasons: Vec<(i32, Season)> = keys
            .iter()
            .map(|k| (k.year, k.sub.season().unwrap()))
            .collect();
        assert_eq!(
            seasons,
            vec![
                (2019, Season::Belg),
                (2019, Season::Kiremt),
                (2019, Season::Bega),
                (2020, Season::Belg),
            ]
        );
    }
}
