pub mod sst_reader;
pub mod station_reader;
pub mod wide_reader;

pub use sst_reader::{parse_sst_indices, read_sst_cache, write_sst_cache, SstRecord};
pub use station_reader::StationReader;
pub use wide_reader::{DataChoice, RawMonthRow, WideReader};
