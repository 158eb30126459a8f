use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::readers::{parse_sst_indices, read_sst_cache, write_sst_cache, SstRecord};
use crate::utils::constants::{SST_FETCH_TIMEOUT_SECS, SST_INDICES_URL};

/// Outcome of an SST index request.
#[derive(Debug, Clone, PartialEq)]
pub enum SstFetch {
    /// Downloaded now and written to the cache.
    Fresh(Vec<SstRecord>),
    /// Download failed; the last cached copy is returned.
    Cached {
        records: Vec<SstRecord>,
        reason: String,
    },
    Unavailable { reason: String },
}

impl SstFetch {
    pub fn records(&self) -> Option<&[SstRecord]> {
        match self {
            SstFetch::Fresh(records) | SstFetch::Cached { records, .. } => Some(records),
            SstFetch::Unavailable { .. } => None,
        }
    }

    pub fn into_records(self) -> Result<Vec<SstRecord>> {
        match self {
            SstFetch::Fresh(records) | SstFetch::Cached { records, .. } => Ok(records),
            SstFetch::Unavailable { reason } => Err(ProcessingError::MissingData(reason)),
        }
    }
}

/// Niño SST indices from NOAA CPC with a local CSV cache as fallback.
pub struct SstSource {
    url: String,
    cache_path: PathBuf,
    timeout: Duration,
}

impl SstSource {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            url: SST_INDICES_URL.to_string(),
            cache_path: cache_path.into(),
            timeout: Duration::from_secs(SST_FETCH_TIMEOUT_SECS),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Try the network first, then the cache; never fails.
    pub fn fetch(&self) -> SstFetch {
        let downloaded = self.download();
        self.resolve(downloaded)
    }

    fn download(&self) -> Result<Vec<SstRecord>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let text = client.get(&self.url).send()?.error_for_status()?.text()?;
        parse_sst_indices(&text)
    }

    fn resolve(&self, downloaded: Result<Vec<SstRecord>>) -> SstFetch {
        let failure = match downloaded {
            Ok(records) => {
                match write_sst_cache(&self.cache_path, &records) {
                    Ok(()) => info!(
                        "SST data downloaded ({} months) and cached at {}",
                        records.len(),
                        self.cache_path.display()
                    ),
                    Err(e) => warn!("SST data downloaded but could not be cached: {}", e),
                }
                return SstFetch::Fresh(records);
            }
            Err(e) => e.to_string(),
        };

        warn!("Retrieving SST data from {} failed: {}", self.url, failure);
        if !self.cache_path.exists() {
            return SstFetch::Unavailable {
                reason: format!(
                    "online retrieval failed ({}) and no cached SST data exists at {}",
                    failure,
                    self.cache_path.display()
                ),
            };
        }
        match read_sst_cache(&self.cache_path) {
            Ok(records) => {
                info!("SST data read from cache {}", self.cache_path.display());
                SstFetch::Cached {
                    records,
                    reason: failure,
                }
            }
            Err(e) => SstFetch::Unavailable {
                reason: format!(
                    "online retrieval failed ({}) and the cache is unreadable ({})",
                    failure, e
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
 YR   MON  NINO1+2  ANOM   NINO3    ANOM   NINO4    ANOM NINO3.4    ANOM
 2015   1   23.10   -0.80   25.90    0.40   29.20    0.90   26.90    0.60
";

    fn offline() -> Result<Vec<SstRecord>> {
        Err(ProcessingError::MissingData("network down".to_string()))
    }

    #[test]
    fn test_fresh_download_is_cached() -> Result<()> {
        let dir = TempDir::new()?;
        let source = SstSource::new(dir.path().join("sstNOAA.csv"));

        let fetched = source.resolve(parse_sst_indices(SAMPLE));
        assert!(matches!(fetched, SstFetch::Fresh(ref r) if r.len() == 1));
        assert!(source.cache_path().exists());

        let fallback = source.resolve(offline());
        match fallback {
            SstFetch::Cached { records, reason } => {
                assert_eq!(records[0].nino34_anomaly, 0.6);
                assert!(reason.contains("network down"));
            }
            other => panic!("expected cached data, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_unavailable_without_cache() {
        let dir = TempDir::new().unwrap();
        let source = SstSource::new(dir.path().join("sstNOAA.csv"));
        let fetched = source.resolve(offline());
        assert!(fetched.records().is_none());
        assert!(fetched.into_records().is_err());
    }

    #[test]
    fn test_unreachable_host_falls_back() {
        let dir = TempDir::new().unwrap();
        let source = SstSource::new(dir.path().join("sstNOAA.csv"))
            .with_url("http://127.0.0.1:9/sstoi.indices")
            .with_timeout(Duration::from_secs(2));
        assert!(matches!(source.fetch(), SstFetch::Unavailable { .. }));
    }
}
