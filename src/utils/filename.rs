use std::path::{Path, PathBuf};

use crate::models::{Element, Granularity};

/// `{EL}{Station}{granularity}.csv`, e.g. `PRECIPAsseladekadal.csv`
pub fn period_table_filename(element: Element, station: &str, granularity: Granularity) -> String {
    format!("{}{}{}.csv", element, station, granularity)
}

/// `{EL}{Station}season{year}.csv`
pub fn season_comparison_filename(element: Element, station: &str, year: i32) -> String {
    format!("{}{}season{}.csv", element, station, year)
}

/// `{EL}{Station}YearAnom.csv`
pub fn year_anomaly_filename(element: Element, station: &str) -> String {
    format!("{}{}YearAnom.csv", element, station)
}

/// `{EL}{Station}2yearAnomalies.csv`
pub fn two_year_anomaly_filename(element: Element, station: &str) -> String {
    format!("{}{}2yearAnomalies.csv", element, station)
}

/// `{EL}{Station}{year}cumulative.csv`
pub fn cumulative_filename(element: Element, station: &str, year: i32) -> String {
    format!("{}{}{}cumulative.csv", element, station, year)
}

/// `{EL}{label}{area}stations.csv`, e.g. `TMPMAX2020 BelgEthiopiastations.csv`
pub fn cross_section_filename(element: Element, label: &str, area: &str) -> String {
    format!("{}{}{}stations.csv", element, label, area)
}

/// `{method}Surface{EL}{label}{area}.csv`, e.g. `idwSurfacePRECIP2020 BelgEthiopia.csv`
pub fn map_surface_filename(method: &str, element: Element, label: &str, area: &str) -> String {
    format!("{}Surface{}{}{}.csv", method, element, label, area)
}

/// `stationDistr{EL}{label}.csv`
pub fn station_distribution_filename(element: Element, label: &str) -> String {
    format!("stationDistr{}{}.csv", element, label)
}

/// `{Station}{label}windrose.csv`
pub fn wind_rose_filename(station: &str, label: &str) -> String {
    format!("{}{}windrose.csv", station, label)
}

pub fn sst_anomaly_filename() -> &'static str {
    "sstAnomalies.csv"
}

/// `{area}Grid.csv` inside the grid cache directory
pub fn grid_cache_path(grid_dir: &Path, area: &str) -> PathBuf {
    grid_dir.join(format!("{}Grid.csv", area))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_filenames() {
        assert_eq!(
            period_table_filename(Element::Precipitation, "Assela", Granularity::Dekad),
            "PRECIPAsseladekadal.csv"
        );
        assert_eq!(
            cumulative_filename(Element::Precipitation, "Assela", 2015),
            "PRECIPAssela2015cumulative.csv"
        );
        assert_eq!(
            cross_section_filename(Element::MaxTemperature, "2020 Belg", "Ethiopia"),
            "TMPMAX2020 BelgEthiopiastations.csv"
        );
        assert_eq!(
            two_year_anomaly_filename(Element::MinTemperature, "Assela"),
            "TMPMINAssela2yearAnomalies.csv"
        );
    }

    #[test]
    fn test_grid_cache_path() {
        let path = grid_cache_path(Path::new("/tmp/griddata"), "Oromia");
        assert_eq!(path, PathBuf::from("/tmp/griddata/OromiaGrid.csv"));
    }
}
