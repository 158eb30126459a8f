use crate::error::Result;
use crate::models::StationMetadata;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;
use validator::Validate;

/// Reads the station registry (`STN_Name, EG_GH_ID, GEOGR2, GEOGR1, ELEVATION`).
pub struct StationReader {
    skip_invalid: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { skip_invalid: true }
    }

    pub fn with_skip_invalid(skip_invalid: bool) -> Self {
        Self { skip_invalid }
    }

    /// Read station metadata from a registry CSV file
    pub fn read_stations(&self, path: &Path) -> Result<Vec<StationMetadata>> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));
        let mut stations = Vec::new();

        for (line, record) in reader.deserialize::<StationMetadata>().enumerate() {
            let station = record?;
            match station.validate() {
                Ok(()) => stations.push(station),
                Err(e) if self.skip_invalid => {
                    warn!(
                        "Skipping registry line {} ({}): {}",
                        line + 2,
                        station.name,
                        e
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(stations)
    }

    /// Read station metadata keyed by station name
    pub fn read_stations_map(&self, path: &Path) -> Result<HashMap<String, StationMetadata>> {
        let stations = self.read_stations(path)?;
        let mut map = HashMap::with_capacity(stations.len());

        for station in stations {
            map.insert(station.name.clone(), station);
        }

        Ok(map)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}
