//! Price provider reading a JSON snapshot from disk.
//!
//! The file maps tickers to closing prices:
//!
//! ```json
//! {
//!   "AAPL": [{ "date": "2024-01-02", "close": 185.64 }],
//!   "MSFT": [{ "date": "2024-01-02", "close": 370.87 }]
//! }
//! ```

use super::{InMemoryPriceProvider, PriceProvider, ProviderError};
use crate::types::{PricePoint, PriceSeries};
use crate::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Provider serving prices from a JSON file loaded once at construction.
#[derive(Debug, Clone)]
pub struct JsonFilePriceProvider {
    path: PathBuf,
    inner: InMemoryPriceProvider,
}

impl JsonFilePriceProvider {
    /// Load all series from `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)?;
        let inner = Self::parse(&content)?;

        tracing::debug!(
            "Loaded price data for {} tickers from {}",
            inner.len(),
            path.display()
        );

        Ok(Self { path, inner })
    }

    /// Parse the JSON document into an in-memory provider.
    fn parse(content: &str) -> Result<InMemoryPriceProvider> {
        let raw: HashMap<String, Vec<PricePoint>> = serde_json::from_str(content)?;
        let mut inner = InMemoryPriceProvider::new();
        for (ticker, points) in raw {
            inner.insert_series(PriceSeries::new(&ticker, points));
        }
        Ok(inner)
    }

    /// Path the prices were loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceProvider for JsonFilePriceProvider {
    fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
    ) -> std::result::Result<PriceSeries, ProviderError> {
        self.inner.fetch_series(ticker, start)
    }

    fn fetch_latest(&self, ticker: &str) -> std::result::Result<f64, ProviderError> {
        self.inner.fetch_latest(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::tempdir;

    const PRICES: &str = r#"{
        "aapl": [
            { "date": "2024-01-03", "close": 184.25 },
            { "date": "2024-01-02", "close": 185.64 }
        ],
        "MSFT": [{ "date": "2024-01-02", "close": 370.87 }]
    }"#;

    #[test]
    fn test_load_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, PRICES).unwrap();

        let provider = JsonFilePriceProvider::from_path(&path).unwrap();
        assert_eq!(provider.path(), path.as_path());

        // Points are reordered by date, so the latest is Jan 3rd
        assert_eq!(provider.fetch_latest("AAPL").unwrap(), 184.25);
        assert_eq!(provider.fetch_latest("MSFT").unwrap(), 370.87);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(provider.fetch_series("AAPL", start).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = JsonFilePriceProvider::from_path(dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFilePriceProvider::from_path(&path);
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
