use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// Ethiopian meteorological seasons, ordered as they fall in a season-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Belg,
    Kiremt,
    Bega,
}

impl Season {
    pub const ALL: [Season; 3] = [Season::Belg, Season::Kiremt, Season::Bega];

    pub fn from_month(month: u32) -> Season {
        match month {
            2..=5 => Season::Belg,
            6..=9 => Season::Kiremt,
            _ => Season::Bega,
        }
    }

    /// Calendar months in the order they occur within the season.
    pub fn months(&self) -> &'static [u32] {
        match self {
            Season::Belg => &[2, 3, 4, 5],
            Season::Kiremt => &[6, 7, 8, 9],
            Season::Bega => &[10, 11, 12, 1],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Season::Belg => "Belg",
            Season::Kiremt => "Kiremt",
            Season::Bega => "Bega",
        }
    }

    /// Number of calendar days in the season starting in `season_year`.
    pub fn length(&self, season_year: i32) -> Option<u32> {
        let first_month = self.months()[0];
        self.months()
            .iter()
            .map(|&month| {
                let year = if month < first_month { season_year + 1 } else { season_year };
                days_in_month(year, month)
            })
            .sum()
    }
}

impl FromStr for Season {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "belg" => Ok(Season::Belg),
            "kiremt" => Ok(Season::Kiremt),
            "bega" => Ok(Season::Bega),
            _ => Err(ProcessingError::UnknownSeason(s.to_string())),
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ten-day subdivision of a month; the third dekad takes the remaining days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Dekad {
    First = 1,
    Second = 2,
    Third = 3,
}

impl Dekad {
    pub const ALL: [Dekad; 3] = [Dekad::First, Dekad::Second, Dekad::Third];

    pub fn from_day(day: u32) -> Dekad {
        match day {
            0..=10 => Dekad::First,
            11..=20 => Dekad::Second,
            _ => Dekad::Third,
        }
    }

    pub fn from_index(index: u8) -> Option<Dekad> {
        match index {
            1 => Some(Dekad::First),
            2 => Some(Dekad::Second),
            3 => Some(Dekad::Third),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// `None` when `month` is not a calendar month.
    pub fn length(&self, year: i32, month: u32) -> Option<u32> {
        let days = days_in_month(year, month)?;
        match self {
            Dekad::First | Dekad::Second => Some(10),
            Dekad::Third => Some(days - 20),
        }
    }
}

impl From<Dekad> for u8 {
    fn from(dekad: Dekad) -> u8 {
        dekad.index()
    }
}

impl TryFrom<u8> for Dekad {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Dekad::from_index(value).ok_or_else(|| format!("dekad must be 1, 2 or 3, got {value}"))
    }
}

impl std::fmt::Display for Dekad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dk{}", self.index())
    }
}

/// Length of a calendar month: the day before the first of the next month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    next.pred_opt().map(|last| last.day())
}

pub fn days_in_year(year: i32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    Some(if first.leap_year() { 366 } else { 365 })
}

/// January belongs to the Bega season that started the previous October.
pub fn season_year(year: i32, month: u32) -> i32 {
    if month == 1 {
        year - 1
    } else {
        year
    }
}

/// Calendar fields shared by observations and daily rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    pub season_year: i32,
    pub season: Season,
    pub month: u32,
    pub dekad: Dekad,
    pub day: u32,
}

impl CalendarFields {
    pub fn from_date(date: NaiveDate) -> Self {
        let (year, month, day) = (date.year(), date.month(), date.day());
        Self {
            year,
            season_year: season_year(year, month),
            season: Season::from_month(month),
            month,
            dekad: Dekad::from_day(day),
            day,
        }
    }
}

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[(month.clamp(1, 12) - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_assignment_is_total() {
        let expected = [
            Season::Bega,
            Season::Belg,
            Season::Belg,
            Season::Belg,
            Season::Belg,
            Season::Kiremt,
            Season::Kiremt,
            Season::Kiremt,
            Season::Kiremt,
            Season::Bega,
            Season::Bega,
            Season::Bega,
        ];
        for (i, season) in expected.iter().enumerate() {
            let month = i as u32 + 1;
            assert_eq!(Season::from_month(month), *season);
            assert!(season.months().contains(&month));
        }
        let covered: usize = Season::ALL.iter().map(|s| s.months().len()).sum();
        assert_eq!(covered, 12);
    }

    #[test]
    fn test_season_year() {
        assert_eq!(season_year(2020, 1), 2019);
        for month in 2..=12 {
            assert_eq!(season_year(2020, month), 2020);
        }
    }

    #[test]
    fn test_season_order() {
        let mut seasons = vec![Season::Bega, Season::Belg, Season::Kiremt];
        seasons.sort();
        assert_eq!(seasons, vec![Season::Belg, Season::Kiremt, Season::Bega]);
    }

    #[test]
    fn test_dekad_partition() {
        for day in 1..=10 {
            assert_eq!(Dekad::from_day(day), Dekad::First);
        }
        for day in 11..=20 {
            assert_eq!(Dekad::from_day(day), Dekad::Second);
        }
        for day in 21..=31 {
            assert_eq!(Dekad::from_day(day), Dekad::Third);
        }
    }

    #[test]
    fn test_dekad_lengths() {
        assert_eq!(Dekad::First.length(2021, 2), Some(10));
        assert_eq!(Dekad::Third.length(2021, 2), Some(8));
        assert_eq!(Dekad::Third.length(2020, 2), Some(9));
        assert_eq!(Dekad::Third.length(2020, 4), Some(10));
        assert_eq!(Dekad::Third.length(2020, 1), Some(11));
        assert_eq!(Dekad::First.length(2020, 13), None);
    }

    #[test]
    fn test_season_lengths() {
        assert_eq!(Season::Bega.length(2019), Some(123));
        assert_eq!(Season::Kiremt.length(2019), Some(122));
        assert_eq!(Season::Belg.length(2019), Some(120));
        assert_eq!(Season::Belg.length(2020), Some(121));
        // Bega 2023 ends in January 2024 and is unaffected by the leap February.
        assert_eq!(Season::Bega.length(2023), Some(123));
    }

    #[test]
    fn test_month_and_year_lengths() {
        assert_eq!(days_in_month(2020, 2), Some(29));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2021, 12), Some(31));
        assert_eq!(days_in_month(2021, 4), Some(30));
        assert_eq!(days_in_month(2021, 13), None);
        assert_eq!(days_in_month(2021, 0), None);
        assert_eq!(days_in_year(2020), Some(366));
        assert_eq!(days_in_year(2021), Some(365));
    }

    #[test]
    fn test_parse_season() {
        assert_eq!("kiremt".parse::<Season>().unwrap(), Season::Kiremt);
        assert!("winter".parse::<Season>().is_err());
    }
}
