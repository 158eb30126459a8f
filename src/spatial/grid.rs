use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ProcessingError, Result};
use crate::spatial::geometry::AreaGeometry;
use crate::utils::constants::DEFAULT_GRID_SIZE;
use crate::utils::filename::grid_cache_path;
use crate::utils::statistics::linspace;

/// One grid node: lon/lat, area membership and projected metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x_d: f64,
    pub y_d: f64,
    #[serde(rename = "bool1d")]
    pub inside: bool,
    pub x_m: f64,
    pub y_m: f64,
}

/// Square interpolation grid over an area's bounding box; x varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub area: String,
    pub size: usize,
    pub points: Vec<GridPoint>,
}

impl Grid {
    pub fn compute(area: &dyn AreaGeometry, size: usize) -> Self {
        let bounds = area.bounds();
        let xs = linspace(bounds.min_lon, bounds.max_lon, size);
        let ys = linspace(bounds.min_lat, bounds.max_lat, size);

        let points = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .map(|(x, y)| {
                let (x_m, y_m) = area.project(x, y);
                GridPoint {
                    x_d: x,
                    y_d: y,
                    inside: area.contains(x, y),
                    x_m,
                    y_m,
                }
            })
            .collect();

        Self {
            area: area.name().to_string(),
            size,
            points,
        }
    }

    pub fn inside_count(&self) -> usize {
        self.points.iter().filter(|p| p.inside).count()
    }

    pub fn metric_coordinates(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.x_m, p.y_m)).collect()
    }
}

/// Per-area grids persisted as CSV so the membership test runs once per area.
pub struct GridCache {
    dir: PathBuf,
    size: usize,
}

impl GridCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            size: DEFAULT_GRID_SIZE,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, area: &str) -> PathBuf {
        grid_cache_path(&self.dir, area)
    }

    pub fn load_or_compute(&self, area: &dyn AreaGeometry) -> Result<Grid> {
        let path = self.path(area.name());
        if path.exists() {
            let grid = Self::read(&path, area.name())?;
            info!("{} grid file read from {}", area.name(), path.display());
            return Ok(grid);
        }

        info!(
            "Grid for {} not yet calculated before; computing {}x{} points",
            area.name(),
            self.size,
            self.size
        );
        let grid = Grid::compute(area, self.size);
        fs::create_dir_all(&self.dir)?;
        let mut writer = csv::Writer::from_path(&path)?;
        for point in &grid.points {
            writer.serialize(point)?;
        }
        writer.flush()?;
        info!("{} grid saved to {}", area.name(), path.display());
        Ok(grid)
    }

    fn read(path: &Path, area: &str) -> Result<Grid> {
        let mut reader = csv::Reader::from_path(path)?;
        let points = reader
            .deserialize()
            .collect::<std::result::Result<Vec<GridPoint>, _>>()?;

        let size = (points.len() as f64).sqrt().round() as usize;
        if size * size != points.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "grid cache {} holds {} points, which is not a square grid",
                path.display(),
                points.len()
            )));
        }
        Ok(Grid {
            area: area.to_string(),
            size,
            points,
        })
    }

    /// Remove every cached grid; returns whether there was anything to remove.
    pub fn clear(&self) -> Result<bool> {
        if !self.dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.dir)?;
        info!("Grid data removed from {}", self.dir.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::geometry::{BoundingBoxArea, Bounds};
    use tempfile::TempDir;

    fn small_area() -> BoundingBoxArea {
        BoundingBoxArea::new("Arsi", Bounds::new(38.0, 7.0, 40.0, 8.0))
    }

    #[test]
    fn test_grid_layout() {
        let grid = Grid::compute(&small_area(), 3);
        assert_eq!(grid.points.len(), 9);
        let first_row: Vec<f64> = grid.points[..3].iter().map(|p| p.x_d).collect();
        assert_eq!(first_row, vec![38.0, 39.0, 40.0]);
        assert_eq!(grid.points[3].y_d, 7.5);
        assert_eq!(grid.inside_count(), 9);
    }

    #[test]
    fn test_cache_round_trip_and_clear() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = GridCache::new(dir.path().join("griddata")).with_size(4);

        let computed = cache.load_or_compute(&small_area())?;
        assert!(cache.path("Arsi").exists());

        let cached = cache.load_or_compute(&small_area())?;
        assert_eq!(cached.size, 4);
        assert_eq!(cached.points, computed.points);

        let header = fs::read_to_string(cache.path("Arsi"))?;
        assert!(header.starts_with("x_d,y_d,bool1d,x_m,y_m"));

        assert!(cache.clear()?);
        assert!(!cache.dir().exists());
        assert!(!cache.clear()?);
        Ok(())
    }
}
