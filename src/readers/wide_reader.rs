use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{WIDE_COLUMN_COUNT, WIDE_DAY_COLUMNS, WIDE_IDENTITY_COLUMNS};

/// What a load of a wide station file should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChoice {
    Values,
    Metadata,
}

impl FromStr for DataChoice {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "values" => Ok(DataChoice::Values),
            "metadata" => Ok(DataChoice::Metadata),
            _ => Err(ProcessingError::InvalidDataChoice(s.to_string())),
        }
    }
}

/// One station-element-month row of the wide file, still as raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMonthRow {
    pub line: usize,
    pub station_name: String,
    pub station_id: String,
    pub latitude: String,
    pub longitude: String,
    pub elevation: String,
    pub element: String,
    pub year: String,
    pub month: String,
    pub time: String,
    pub days: Vec<String>,
}

pub struct WideReader {
    has_headers: bool,
}

impl WideReader {
    pub fn new() -> Self {
        Self { has_headers: true }
    }

    pub fn with_headers(has_headers: bool) -> Self {
        Self { has_headers }
    }

    /// Read every row of a wide station file; UTF-8 first, Windows-1252 otherwise.
    pub fn read_rows(&self, path: &Path) -> Result<Vec<RawMonthRow>> {
        let bytes = fs::read(path)?;
        let text = decode_text(&bytes);
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.read_rows_from_str(&text)
    }

    pub fn read_rows_from_str(&self, text: &str) -> Result<Vec<RawMonthRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(text.as_bytes());

        if self.has_headers {
            let width = reader.headers()?.len();
            if width < WIDE_COLUMN_COUNT {
                return Err(ProcessingError::InvalidFormat(format!(
                    "expected at least {} columns ({}, 1..{}), found {}",
                    WIDE_COLUMN_COUNT,
                    WIDE_IDENTITY_COLUMNS.join(", "),
                    WIDE_DAY_COLUMNS,
                    width
                )));
            }
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let field = |i: usize| record.get(i).unwrap_or("").to_string();
            let identity = WIDE_IDENTITY_COLUMNS.len();

            rows.push(RawMonthRow {
                line: index + if self.has_headers { 2 } else { 1 },
                station_name: field(0),
                station_id: field(1),
                latitude: field(2),
                longitude: field(3),
                elevation: field(4),
                element: field(5),
                year: field(6),
                month: field(7),
                time: field(8),
                days: (identity..WIDE_COLUMN_COUNT).map(field).collect(),
            });
        }

        Ok(rows)
    }
}

impl Default for WideReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Station exports from older desktop tools are Windows-1252 encoded.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.trim_start_matches('\u{feff}')),
        Err(_) => {
            warn!("Input is not valid UTF-8, decoding as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn header() -> String {
        let days: Vec<String> = (1..=31).map(|d| d.to_string()).collect();
        format!("{},{}", WIDE_IDENTITY_COLUMNS.join(","), days.join(","))
    }

    #[test]
    fn test_data_choice() {
        assert_eq!("values".parse::<DataChoice>().unwrap(), DataChoice::Values);
        assert_eq!(" Metadata".parse::<DataChoice>().unwrap(), DataChoice::Metadata);
        assert!(matches!(
            "both".parse::<DataChoice>(),
            Err(ProcessingError::InvalidDataChoice(_))
        ));
    }

    #[test]
    fn test_read_rows_takes_first_forty_columns() -> Result<()> {
        let mut days = vec![String::new(); 31];
        days[0] = "1.5".to_string();
        days[30] = "2".to_string();
        let text = format!(
            "{},extra\nASSELA ,10016,7.95,39.12,2413,PRECIP,2020,1,900,{},ignored\n",
            header(),
            days.join(",")
        );

        let rows = WideReader::new().read_rows_from_str(&text)?;
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.station_name, "ASSELA ");
        assert_eq!(row.element, "PRECIP");
        assert_eq!(row.time, "900");
        assert_eq!(row.days.len(), 31);
        assert_eq!(row.days[0], "1.5");
        assert_eq!(row.days[30], "2");
        assert_eq!(row.line, 2);
        Ok(())
    }

    #[test]
    fn test_short_rows_are_padded() -> Result<()> {
        let text = format!("{}\nAssela,1,7.9,39.1,,PRECIP,2020,2,9:00,4\n", header());
        let rows = WideReader::new().read_rows_from_str(&text)?;
        assert_eq!(rows[0].days[0], "4");
        assert!(rows[0].days[1..].iter().all(String::is_empty));
        Ok(())
    }

    #[test]
    fn test_too_few_columns() {
        let result = WideReader::new().read_rows_from_str("STN_Name,YEAR\nAssela,2020\n");
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_windows_1252_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        let days = vec![""; 31].join(",");
        writeln!(file, "{}", header())?;
        file.write_all(b"Dire Dawa \xe9,1,9.6,41.8,1180,TMPMAX,2019,3,,")?;
        writeln!(file, "{}", &days[1..])?;

        let rows = WideReader::new().read_rows(file.path())?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].station_name, "Dire Dawa é");
        Ok(())
    }
}
