pub mod csv_writer;
pub mod records;

pub use csv_writer::{CsvExporter, CsvProduct};
pub use records::{cross_section_records, CrossSectionRecord, PeriodRecord};
