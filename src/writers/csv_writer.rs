use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ProcessingError, Result};

/// A data product that can be snapshotted as CSV under a deterministic name.
pub trait CsvProduct {
    type Record: Serialize;

    fn filename(&self) -> String;

    fn records(&self) -> Vec<Self::Record>;
}

/// Writes product snapshots into an existing output directory.
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    /// The directory must already exist; nothing is created on the user's behalf.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if !output_dir.is_dir() {
            return Err(ProcessingError::Config(format!(
                "The output folder {} does not exist. Data is not exported",
                output_dir.display()
            )));
        }
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn export<P: CsvProduct>(&self, product: &P) -> Result<PathBuf> {
        self.write_records(&product.filename(), &product.records())
    }

    pub fn write_records<T: Serialize>(&self, filename: &str, records: &[T]) -> Result<PathBuf> {
        let path = self.output_dir.join(filename);
        let mut writer = csv::Writer::from_path(&path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("Data exported to {} ({} rows)", path.display(), records.len());
        Ok(path)
    }

    /// For products whose columns depend on the request; the first row is the header.
    pub fn write_rows(&self, filename: &str, rows: &[Vec<String>]) -> Result<PathBuf> {
        let path = self.output_dir.join(filename);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Data exported to {}", path.display());
        Ok(path)
    }
}
