use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use validator::Validate;

use crate::error::Result;
use crate::models::StationMetadata;
use crate::readers::StationReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryUpdate {
    Unchanged,
    Updated {
        added: usize,
        replaced: usize,
        total: usize,
    },
}

/// Persistent station metadata keyed by station name.
///
/// Read-then-write within one call; concurrent writers are not coordinated.
pub struct StationRegistry {
    path: PathBuf,
    update_all: bool,
}

impl StationRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            update_all: false,
        }
    }

    /// When set, every incoming station replaces its existing entry.
    pub fn with_update_all(mut self, update_all: bool) -> Self {
        self.update_all = update_all;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All registered stations; an absent registry file is an empty registry.
    pub fn stations(&self) -> Result<Vec<StationMetadata>> {
        if !self.path.exists() {
            debug!("No station registry at {}", self.path.display());
            return Ok(Vec::new());
        }
        StationReader::new().read_stations(&self.path)
    }

    pub fn lookup(&self) -> Result<HashMap<String, StationMetadata>> {
        Ok(self
            .stations()?
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect())
    }

    pub fn upsert(&self, incoming: &[StationMetadata]) -> Result<RegistryUpdate> {
        let mut registry: BTreeMap<String, StationMetadata> = self
            .stations()?
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();

        let (mut added, mut replaced) = (0, 0);
        for station in incoming {
            if let Err(e) = station.validate() {
                warn!("Station {} not registered: {}", station.name, e);
                continue;
            }
            match registry.get(&station.name) {
                None => {
                    registry.insert(station.name.clone(), station.clone());
                    added += 1;
                }
                Some(existing) if self.update_all && existing != station => {
                    registry.insert(station.name.clone(), station.clone());
                    replaced += 1;
                }
                Some(_) => {}
            }
        }

        if added == 0 && replaced == 0 {
            return Ok(RegistryUpdate::Unchanged);
        }

        self.write(registry.values())?;
        Ok(RegistryUpdate::Updated {
            added,
            replaced,
            total: registry.len(),
        })
    }

    fn write<'a>(&self, stations: impl Iterator<Item = &'a StationMetadata>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        for station in stations {
            writer.serialize(station)?;
        }
        writer.flush()?;
        Ok(())
    }
}
