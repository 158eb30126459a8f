use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::error::{ProcessingError, Result};

/// One month of the NOAA `sstoi.indices` table.
///
/// Field names follow the cached CSV, where the repeated `ANOM` headers carry a
/// numeric suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SstRecord {
    #[serde(rename = "YR")]
    pub year: i32,
    #[serde(rename = "MON")]
    pub month: u32,
    #[serde(rename = "NINO1+2")]
    pub nino12: f64,
    #[serde(rename = "ANOM")]
    pub nino12_anomaly: f64,
    #[serde(rename = "NINO3")]
    pub nino3: f64,
    #[serde(rename = "ANOM.1")]
    pub nino3_anomaly: f64,
    #[serde(rename = "NINO4")]
    pub nino4: f64,
    #[serde(rename = "ANOM.2")]
    pub nino4_anomaly: f64,
    #[serde(rename = "NINO3.4")]
    pub nino34: f64,
    #[serde(rename = "ANOM.3")]
    pub nino34_anomaly: f64,
}

const SST_FIELDS: usize = 10;

/// Parse the whitespace separated table served by NOAA CPC.
pub fn parse_sst_indices(text: &str) -> Result<Vec<SstRecord>> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || fields[0] == "YR" {
            continue;
        }
        if fields.len() < SST_FIELDS {
            return Err(ProcessingError::InvalidFormat(format!(
                "SST line {} has {} fields, expected {}",
                index + 1,
                fields.len(),
                SST_FIELDS
            )));
        }

        let number = |i: usize| -> Result<f64> {
            fields[i].parse::<f64>().map_err(|_| {
                ProcessingError::InvalidFormat(format!(
                    "SST line {}: '{}' is not a number",
                    index + 1,
                    fields[i]
                ))
            })
        };
        let year = fields[0].parse::<i32>().map_err(|_| {
            ProcessingError::InvalidFormat(format!("SST line {}: bad year", index + 1))
        })?;
        let month = fields[1].parse::<u32>().map_err(|_| {
            ProcessingError::InvalidFormat(format!("SST line {}: bad month", index + 1))
        })?;

        records.push(SstRecord {
            year,
            month,
            nino12: number(2)?,
            nino12_anomaly: number(3)?,
            nino3: number(4)?,
            nino3_anomaly: number(5)?,
            nino4: number(6)?,
            nino4_anomaly: number(7)?,
            nino34: number(8)?,
            nino34_anomaly: number(9)?,
        });
    }

    debug!("Parsed {} SST index months", records.len());
    Ok(records)
}

pub fn read_sst_cache(path: &Path) -> Result<Vec<SstRecord>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let records = reader
        .deserialize::<SstRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn write_sst_cache(path: &Path, records: &[SstRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
 YR   MON  NINO1+2  ANOM   NINO3    ANOM   NINO4    ANOM NINO3.4    ANOM
 1982   1   24.29   -0.17   25.87    0.24   28.30    0.00   26.72    0.15
 1982   2   25.49   -0.58   26.38    0.01   28.21    0.11   26.70   -0.02
";

    #[test]
    fn test_parse_indices_uses_nino34_anomaly() -> Result<()> {
        let records = parse_sst_indices(SAMPLE)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 1982);
        assert_eq!(records[1].month, 2);
        assert_eq!(records[0].nino34_anomaly, 0.15);
        assert_eq!(records[1].nino34_anomaly, -0.02);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_short_line() {
        let result = parse_sst_indices("1982 1 24.29\n");
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_cache_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("sstNOAA.csv");
        let records = parse_sst_indices(SAMPLE)?;

        write_sst_cache(&path, &records)?;
        let header = std::fs::read_to_string(&path)?;
        assert!(header.starts_with("YR,MON,NINO1+2,ANOM,NINO3,ANOM.1"));
        assert_eq!(read_sst_cache(&path)?, records);
        Ok(())
    }
}
