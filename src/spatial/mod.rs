pub mod geometry;
pub mod grid;
pub mod interpolation;
pub mod map;

pub use geometry::{
    AdminLevel, AreaGeometry, AreaSelector, BoundingBoxArea, BoundingBoxService, Bounds,
    GeometryService,
};
pub use grid::{Grid, GridCache, GridPoint};
pub use interpolation::{InverseDistance, KrigingModel, SamplePoint, SpatialInterpolator};
pub use map::{
    join_stations, map_surface, station_distribution, AnomalyCategory, MapSurface,
    StationDistribution, StationPoint, SurfaceRecord,
};
