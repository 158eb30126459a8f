use std::collections::HashMap;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{COUNTRY_NAME, ET_MAX_LAT, ET_MAX_LON, ET_MIN_LAT, ET_MIN_LON};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Administrative level of an area, from the whole country down to a district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AdminLevel {
    Country,
    Region,
    Zone,
    District,
}

impl AdminLevel {
    pub const ALL: [AdminLevel; 4] = [
        AdminLevel::Country,
        AdminLevel::Region,
        AdminLevel::Zone,
        AdminLevel::District,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            AdminLevel::Country => "adm0 (full ET)",
            AdminLevel::Region => "adm1 (ET regions)",
            AdminLevel::Zone => "adm2 (ET zones)",
            AdminLevel::District => "adm3 (ET districts)",
        }
    }
}

/// Area to map; the most specific name given wins (district > zone > region > country).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaSelector {
    pub region: Option<String>,
    pub zone: Option<String>,
    pub district: Option<String>,
}

impl AreaSelector {
    pub fn country() -> Self {
        Self::default()
    }

    pub fn target(&self) -> (AdminLevel, Option<&str>) {
        if let Some(district) = self.district.as_deref() {
            (AdminLevel::District, Some(district))
        } else if let Some(zone) = self.zone.as_deref() {
            (AdminLevel::Zone, Some(zone))
        } else if let Some(region) = self.region.as_deref() {
            (AdminLevel::Region, Some(region))
        } else {
            (AdminLevel::Country, None)
        }
    }

    pub fn name(&self) -> &str {
        self.target().1.unwrap_or(COUNTRY_NAME)
    }
}

/// Lon/lat bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn ethiopia() -> Self {
        Self::new(ET_MIN_LON, ET_MIN_LAT, ET_MAX_LON, ET_MAX_LAT)
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// Polygon geometry of one administrative area.
///
/// Shapefile reading and coordinate reference transforms live outside this crate;
/// an implementation only has to answer membership and projection queries.
pub trait AreaGeometry {
    fn name(&self) -> &str;

    fn bounds(&self) -> Bounds;

    fn contains(&self, lon: f64, lat: f64) -> bool;

    /// Metric coordinates of a lon/lat point, used for distances.
    fn project(&self, lon: f64, lat: f64) -> (f64, f64);
}

pub trait GeometryService {
    fn area(&self, selector: &AreaSelector) -> Result<Box<dyn AreaGeometry>>;
}

/// Rectangle area with an equirectangular projection around its centre latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxArea {
    name: String,
    bounds: Bounds,
}

impl BoundingBoxArea {
    pub fn new(name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    pub fn ethiopia() -> Self {
        Self::new(COUNTRY_NAME, Bounds::ethiopia())
    }
}

impl AreaGeometry for BoundingBoxArea {
    fn name(&self) -> &str {
        &self.name
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bounds.contains(lon, lat)
    }

    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (_, center_lat) = self.bounds.center();
        let x = EARTH_RADIUS_M * lon.to_radians() * center_lat.to_radians().cos();
        let y = EARTH_RADIUS_M * lat.to_radians();
        (x, y)
    }
}

/// Geometry service used when no shapefiles are available: the country rectangle
/// plus any named rectangles registered by the caller.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxService {
    areas: HashMap<(AdminLevel, String), Bounds>,
}

impl BoundingBoxService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_area(mut self, level: AdminLevel, name: impl Into<String>, bounds: Bounds) -> Self {
        self.areas.insert((level, name.into()), bounds);
        self
    }
}

impl GeometryService for BoundingBoxService {
    fn area(&self, selector: &AreaSelector) -> Result<Box<dyn AreaGeometry>> {
        match selector.target() {
            (AdminLevel::Country, _) | (_, None) => Ok(Box::new(BoundingBoxArea::ethiopia())),
            (level, Some(name)) => self
                .areas
                .get(&(level, name.to_string()))
                .map(|bounds| Box::new(BoundingBoxArea::new(name, *bounds)) as Box<dyn AreaGeometry>)
                .ok_or_else(|| ProcessingError::AreaNotFound(name.to_string())),
        }
    }
}
