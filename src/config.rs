use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ProcessingError, Result};
use crate::spatial::geometry::AdminLevel;
use crate::utils::constants::{
    BASE_DIR, DATA_DIR, GRID_DIR, OUTPUT_DIR, PACKAGE_DATA_DIR, SETTINGS_FILE, SHAPEFILE_DIR,
    SST_CACHE_FILE, STATION_REGISTRY_FILE,
};

/// Filesystem locations used by every component that touches disk.
///
/// Built once (defaults, then the JSON settings file, then `CAMT_*` environment
/// variables) and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub adm0_path: PathBuf,
    pub adm1_path: PathBuf,
    pub adm2_path: PathBuf,
    pub adm3_path: PathBuf,
    pub package_data_path: PathBuf,
    pub base_path: PathBuf,
    pub data_path: PathBuf,
    pub out_path: PathBuf,
}

/// Partial settings change; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub adm0_path: Option<PathBuf>,
    pub adm1_path: Option<PathBuf>,
    pub adm2_path: Option<PathBuf>,
    pub adm3_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    pub out_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapCapability {
    Available,
    Disabled { reason: String },
}

impl Settings {
    /// Layout rooted at `base_path`, with package data kept in `package_data_path`.
    pub fn with_base(base_path: &Path, package_data_path: &Path) -> Self {
        let shapes = base_path.join(SHAPEFILE_DIR);
        Self {
            adm0_path: shapes.join("ETadm0.zip"),
            adm1_path: shapes.join("ETadm1.zip"),
            adm2_path: shapes.join("ETadm2.zip"),
            adm3_path: shapes.join("ETadm3.zip"),
            package_data_path: package_data_path.to_path_buf(),
            base_path: base_path.to_path_buf(),
            data_path: base_path.join(DATA_DIR),
            out_path: base_path.join(OUTPUT_DIR),
        }
    }

    /// Defaults under the user's documents and local data directories.
    pub fn defaults() -> Result<Self> {
        let documents = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| ProcessingError::Config("cannot determine home directory".into()))?;
        let package_data = dirs::data_local_dir()
            .ok_or_else(|| ProcessingError::Config("cannot determine data directory".into()))?
            .join(PACKAGE_DATA_DIR);
        Ok(Self::with_base(&documents.join(BASE_DIR), &package_data))
    }

    pub fn default_settings_file() -> Result<PathBuf> {
        Ok(Self::defaults()?.package_data_path.join(SETTINGS_FILE))
    }

    /// Load settings on top of `defaults` from an optional JSON file and the environment.
    pub fn load_with_defaults(defaults: &Settings, settings_file: &Path) -> Result<Self> {
        let path_value = |p: &Path| p.to_string_lossy().into_owned();

        let settings = config::Config::builder()
            .set_default("adm0_path", path_value(&defaults.adm0_path))?
            .set_default("adm1_path", path_value(&defaults.adm1_path))?
            .set_default("adm2_path", path_value(&defaults.adm2_path))?
            .set_default("adm3_path", path_value(&defaults.adm3_path))?
            .set_default("package_data_path", path_value(&defaults.package_data_path))?
            .set_default("base_path", path_value(&defaults.base_path))?
            .set_default("data_path", path_value(&defaults.data_path))?
            .set_default("out_path", path_value(&defaults.out_path))?
            .add_source(
                config::File::from(settings_file)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix("CAMT"))
            .build()?
            .try_deserialize::<Settings>()?;

        debug!("Settings loaded from {}", settings_file.display());
        Ok(settings)
    }

    pub fn load(settings_file: Option<&Path>) -> Result<Self> {
        let defaults = Self::defaults()?;
        let file = match settings_file {
            Some(path) => path.to_path_buf(),
            None => defaults.package_data_path.join(SETTINGS_FILE),
        };
        Self::load_with_defaults(&defaults, &file)
    }

    /// Create the working directories and persist the settings file if it is missing.
    pub fn init(&self, settings_file: &Path) -> Result<()> {
        for dir in [
            self.base_path.join(SHAPEFILE_DIR),
            self.data_path.clone(),
            self.out_path.clone(),
            self.package_data_path.clone(),
        ] {
            if !dir.exists() {
                fs::create_dir_all(&dir)?;
                info!("Created directory {}", dir.display());
            }
        }
        if !settings_file.exists() {
            self.save(settings_file)?;
        }
        Ok(())
    }

    pub fn save(&self, settings_file: &Path) -> Result<()> {
        if let Some(parent) = settings_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(settings_file, serde_json::to_string_pretty(self)?)?;
        info!("Settings saved to {}", settings_file.display());
        Ok(())
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        let SettingsUpdate {
            adm0_path,
            adm1_path,
            adm2_path,
            adm3_path,
            data_path,
            out_path,
        } = update;
        let targets = [
            (&mut self.adm0_path, adm0_path),
            (&mut self.adm1_path, adm1_path),
            (&mut self.adm2_path, adm2_path),
            (&mut self.adm3_path, adm3_path),
            (&mut self.data_path, data_path),
            (&mut self.out_path, out_path),
        ];
        for (target, value) in targets {
            if let Some(value) = value {
                *target = value;
            }
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.package_data_path.join(STATION_REGISTRY_FILE)
    }

    pub fn grid_dir(&self) -> PathBuf {
        self.package_data_path.join(GRID_DIR)
    }

    pub fn sst_cache_path(&self) -> PathBuf {
        self.package_data_path.join(SST_CACHE_FILE)
    }

    pub fn admin_path(&self, level: AdminLevel) -> &Path {
        match level {
            AdminLevel::Country => &self.adm0_path,
            AdminLevel::Region => &self.adm1_path,
            AdminLevel::Zone => &self.adm2_path,
            AdminLevel::District => &self.adm3_path,
        }
    }

    pub fn missing_shapefiles(&self) -> Vec<AdminLevel> {
        AdminLevel::ALL
            .into_iter()
            .filter(|level| !self.admin_path(*level).exists())
            .collect()
    }

    /// Maps need every administrative level's shapefile.
    pub fn map_capability(&self) -> MapCapability {
        let missing = self.missing_shapefiles();
        if missing.is_empty() {
            return MapCapability::Available;
        }
        let reason = missing
            .iter()
            .map(|level| {
                format!(
                    "{} shape file not found at {}",
                    level.description(),
                    self.admin_path(*level).display()
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        warn!("Map abilities cannot be used: {}", reason);
        MapCapability::Disabled { reason }
    }
}
