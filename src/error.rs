use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data choice '{0}' not clear. Please select 'values' or 'metadata'")]
    InvalidDataChoice(String),

    #[error("The element '{element}' is not (yet) implemented. Currently implemented are one of {implemented:?}")]
    UnknownElement {
        element: String,
        implemented: Vec<&'static str>,
    },

    #[error("The element '{0}' has no aggregation policy and cannot be aggregated")]
    ElementNotImplemented(&'static str),

    #[error("The provided data misses element '{element}'. Available elements are {available:?}")]
    ElementNotFound {
        element: &'static str,
        available: Vec<&'static str>,
    },

    #[error("The time period '{0}' is not one of the options: day, dekad, month, season, year")]
    UnknownGranularity(String),

    #[error("Station '{name}' not found. Available station names are: {}", available.join(", "))]
    StationNotFound { name: String, available: Vec<String> },

    #[error("The year {0} is not present in the provided data")]
    YearNotFound(i32),

    #[error("Dekad {0} supplied without a month. Select a dekad only in combination with a month")]
    DekadWithoutMonth(u8),

    #[error("The chosen period {0} does not exist in the provided data")]
    PeriodNotFound(String),

    #[error("Wrong table for this product: {0}")]
    WrongTable(String),

    #[error("Invalid year selection: {0}")]
    InvalidYears(String),

    #[error("The selected area '{0}' is not available")]
    AreaNotFound(String),

    #[error("Unknown kriging model '{0}'. Use one of linear, power, gaussian, spherical, exponential, hole-effect")]
    InvalidKrigingModel(String),

    #[error("Season '{0}' not recognized. Please select one of Belg, Kiremt, Bega")]
    UnknownSeason(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Missing required data: {0}")]
    MissingData(String),
}
