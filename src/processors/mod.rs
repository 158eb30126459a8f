pub mod cross_section;
pub mod normalizer;
pub mod period_aggregator;
pub mod station_extractor;
pub mod station_registry;

pub use cross_section::CrossSectionExtractor;
pub use normalizer::{LoadResult, NormalizeStats, RecordNormalizer};
pub use period_aggregator::PeriodAggregator;
pub use station_extractor::StationExtractor;
pub use station_registry::{RegistryUpdate, StationRegistry};
