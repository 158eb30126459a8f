use serde::{Deserialize, Serialize};

use crate::models::calendar::{Dekad, Season};
use crate::models::element::Element;

/// Optional sub-year selection for a cross-section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFilter {
    pub season: Option<Season>,
    pub month: Option<u32>,
    pub dekad: Option<Dekad>,
}

impl PeriodFilter {
    pub fn year() -> Self {
        Self::default()
    }

    pub fn season(season: Season) -> Self {
        Self {
            season: Some(season),
            ..Self::default()
        }
    }

    pub fn month(month: u32) -> Self {
        Self {
            month: Some(month),
            ..Self::default()
        }
    }

    pub fn dekad(month: u32, dekad: Dekad) -> Self {
        Self {
            month: Some(month),
            dekad: Some(dekad),
            ..Self::default()
        }
    }

    /// Period label: `2020`, `2020 Belg`, `2020-3` or `2020-3 dk2`.
    pub fn label(&self, year: i32) -> String {
        match (self.month, self.dekad, self.season) {
            (Some(month), Some(dekad), _) => format!("{year}-{month} {dekad}"),
            (Some(month), None, _) => format!("{year}-{month}"),
            (None, _, Some(season)) => format!("{year} {season}"),
            (None, _, None) => year.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionRow {
    pub station: String,
    pub value: Option<f64>,
    pub average: Option<f64>,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionMeta {
    pub element: Element,
    pub year: i32,
    pub filter: PeriodFilter,
}

impl CrossSectionMeta {
    pub fn label(&self) -> String {
        self.filter.label(self.year)
    }

    pub fn long_name(&self) -> &'static str {
        self.element.long_name()
    }

    pub fn unit(&self) -> &'static str {
        self.element.unit()
    }
}

/// All stations for one fixed period: the input of spatial interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    pub meta: CrossSectionMeta,
    pub rows: Vec<CrossSectionRow>,
}

impl CrossSection {
    pub fn get(&self, station: &str) -> Option<&CrossSectionRow> {
        self.rows.iter().find(|r| r.station == station)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_labels() {
        assert_eq!(PeriodFilter::year().label(2020), "2020");
        assert_eq!(PeriodFilter::season(Season::Belg).label(2020), "2020 Belg");
        assert_eq!(PeriodFilter::month(3).label(2020), "2020-3");
        assert_eq!(PeriodFilter::dekad(3, Dekad::Second).label(2020), "2020-3 dk2");
    }
}
