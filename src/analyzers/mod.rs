pub mod cumulative;
pub mod period_views;
pub mod recent_historic;
pub mod two_year;
pub mod wind_rose;

pub use cumulative::{cumulative_daily, cumulative_dekadal, CumulativeRainfall, CumulativeRow};
pub use period_views::{
    season_comparison, year_anomalies, year_series, SeasonComparison, SeasonComparisonRow,
    YearAnomalies, YearAnomalyRow,
};
pub use recent_historic::{recent_historic, RecentHistoric, RecentHistoricRow};
pub use two_year::{
    sst_two_year_anomalies, two_year_anomalies, validate_start_years, TwoYearAnomalies, TwoYearRow,
};
pub use wind_rose::{vector_average, wind_rose, WindPeriod, WindRose, WindRoseRecord};
