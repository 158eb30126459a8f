use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::{ET_MAX_LAT, ET_MAX_LON, ET_MIN_LAT, ET_MIN_LON};

/// One entry of the station registry, in the registry's column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[serde(rename = "STN_Name")]
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(rename = "EG_GH_ID")]
    pub station_id: String,

    #[serde(rename = "GEOGR2")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[serde(rename = "GEOGR1")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[serde(rename = "ELEVATION")]
    pub elevation: Option<f64>,
}

impl StationMetadata {
    pub fn new(
        name: String,
        station_id: String,
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
    ) -> Self {
        Self {
            name,
            station_id,
            latitude,
            longitude,
            elevation,
        }
    }

    pub fn is_within_ethiopia_bounds(&self) -> bool {
        self.latitude >= ET_MIN_LAT
            && self.latitude <= ET_MAX_LAT
            && self.longitude >= ET_MIN_LON
            && self.longitude <= ET_MAX_LON
    }

    pub fn same_location(&self, other: &StationMetadata) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

/// Title-case a raw station name after trimming it: `" ADDIS ababa"` -> `"Addis Ababa"`.
pub fn normalize_station_name(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if at_word_start {
                normalized.extend(c.to_uppercase());
            } else {
                normalized.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            normalized.push(c);
            at_word_start = true;
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_validation() {
        let station = StationMetadata::new(
            "Assela".to_string(),
            "10016".to_string(),
            7.95,
            39.12,
            Some(2413.0),
        );

        assert!(station.validate().is_ok());
        assert!(station.is_within_ethiopia_bounds());
    }

    #[test]
    fn test_invalid_coordinates() {
        let station = StationMetadata::new(
            "Invalid Station".to_string(),
            "1".to_string(),
            91.0, // Invalid latitude
            39.0,
            None,
        );

        assert!(station.validate().is_err());
    }

    #[test]
    fn test_normalize_station_name() {
        assert_eq!(normalize_station_name("  assela "), "Assela");
        assert_eq!(normalize_station_name("ADDIS ABABA"), "Addis Ababa");
        assert_eq!(normalize_station_name("debre-markos"), "Debre-Markos");
        assert_eq!(normalize_station_name("mekele 2"), "Mekele 2");
    }
}
