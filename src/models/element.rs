use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// How values of an element combine over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Rainfall-like quantities: the period value is the sum.
    Accumulating,
    /// Temperature-like quantities: the period value is the mean.
    Averaging,
}

impl Aggregation {
    /// Aggregate the present values; `None` when nothing is present.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        match self {
            Aggregation::Accumulating => Some(sum),
            Aggregation::Averaging => Some(sum / values.len() as f64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "PRECIP")]
    Precipitation,
    #[serde(rename = "RD")]
    RainyDay,
    #[serde(rename = "TMPMAX")]
    MaxTemperature,
    #[serde(rename = "TMPMIN")]
    MinTemperature,
    #[serde(rename = "WINDIR")]
    WindDirection,
    #[serde(rename = "WINSPD")]
    WindSpeed,
}

pub struct ElementDefinition {
    pub element: Element,
    pub code: &'static str,
    pub long_name: &'static str,
    pub unit: &'static str,
    pub aggregation: Option<Aggregation>,
}

pub const ELEMENTS: &[ElementDefinition] = &[
    ElementDefinition {
        element: Element::Precipitation,
        code: "PRECIP",
        long_name: "precipitation",
        unit: "(mm)",
        aggregation: Some(Aggregation::Accumulating),
    },
    ElementDefinition {
        element: Element::RainyDay,
        code: "RD",
        long_name: "rainy days",
        unit: "(-)",
        aggregation: Some(Aggregation::Accumulating),
    },
    ElementDefinition {
        element: Element::MaxTemperature,
        code: "TMPMAX",
        long_name: "maximum temperature",
        unit: "(°C)",
        aggregation: Some(Aggregation::Averaging),
    },
    ElementDefinition {
        element: Element::MinTemperature,
        code: "TMPMIN",
        long_name: "minimum temperature",
        unit: "(°C)",
        aggregation: Some(Aggregation::Averaging),
    },
    ElementDefinition {
        element: Element::WindDirection,
        code: "WINDIR",
        long_name: "wind direction",
        unit: "(°)",
        aggregation: None,
    },
    ElementDefinition {
        element: Element::WindSpeed,
        code: "WINSPD",
        long_name: "wind speed",
        unit: "(m/s)",
        aggregation: None,
    },
];

/// Threshold above which a day counts as rainy (mm).
pub const RAINY_DAY_THRESHOLD: f64 = 1.0;

impl Element {
    pub fn definition(&self) -> &'static ElementDefinition {
        // ELEMENTS holds exactly one entry per variant, in declaration order.
        &ELEMENTS[*self as usize]
    }

    pub fn code(&self) -> &'static str {
        self.definition().code
    }

    pub fn long_name(&self) -> &'static str {
        self.definition().long_name
    }

    pub fn unit(&self) -> &'static str {
        self.definition().unit
    }

    pub fn aggregation(&self) -> Option<Aggregation> {
        self.definition().aggregation
    }

    /// The aggregation policy, or an error for elements that cannot be aggregated.
    pub fn require_aggregation(&self) -> Result<Aggregation> {
        self.aggregation()
            .ok_or(ProcessingError::ElementNotImplemented(self.code()))
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        ELEMENTS
            .iter()
            .find(|def| def.code.eq_ignore_ascii_case(code))
            .map(|def| def.element)
    }

    /// Codes of every element that has an aggregation policy.
    pub fn aggregatable_codes() -> Vec<&'static str> {
        ELEMENTS
            .iter()
            .filter(|def| def.aggregation.is_some())
            .map(|def| def.code)
            .collect()
    }

    /// Elements that are computed from another element rather than read from file.
    pub fn is_derived(&self) -> bool {
        matches!(self, Element::RainyDay)
    }
}

impl FromStr for Element {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        Element::from_code(s).ok_or_else(|| ProcessingError::UnknownElement {
            element: s.to_string(),
            implemented: Element::aggregatable_codes(),
        })
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Rainy-day indicator for a precipitation value.
///
/// Values in (-1, 1] are dry (0), values above 1 mm are rainy (1); anything else,
/// including absent values, stays absent.
pub fn rainy_day(precipitation: Option<f64>) -> Option<f64> {
    match precipitation {
        Some(p) if p > RAINY_DAY_THRESHOLD => Some(1.0),
        Some(p) if p > -1.0 => Some(0.0),
        _ => None,
    }
}
