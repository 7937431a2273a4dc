//! In-memory price provider.

use super::{PriceProvider, ProviderError};
use crate::types::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Provider backed by series held in memory.
///
/// Tickers can be marked as failing to simulate an unreachable source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceProvider {
    series: HashMap<String, PriceSeries>,
    failing: HashSet<String>,
}

impl InMemoryPriceProvider {
    /// Create an empty provider. Every lookup fails until series are inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the full series for a ticker.
    pub fn insert_series(&mut self, series: PriceSeries) {
        self.series.insert(series.ticker.clone(), series);
    }

    /// Insert a series from `(date, close)` pairs.
    pub fn insert_closes(&mut self, ticker: &str, closes: &[(NaiveDate, f64)]) {
        let points = closes.iter().map(|&(date, close)| PricePoint::new(date, close));
        self.insert_series(PriceSeries::new(ticker, points));
    }

    /// Insert a one-point series, enough for valuation.
    pub fn insert_latest(&mut self, ticker: &str, date: NaiveDate, close: f64) {
        self.insert_closes(ticker, &[(date, close)]);
    }

    /// Make every lookup for `ticker` fail with [`ProviderError::Unavailable`].
    pub fn fail_ticker(&mut self, ticker: &str) {
        self.failing.insert(ticker.trim().to_uppercase());
    }

    /// Number of tickers with stored data.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn lookup(&self, ticker: &str) -> Result<&PriceSeries, ProviderError> {
        let key = ticker.trim().to_uppercase();
        if self.failing.contains(&key) {
            return Err(ProviderError::unavailable(&key, "source unreachable"));
        }
        self.series
            .get(&key)
            .ok_or_else(|| ProviderError::unavailable(&key, "unknown ticker"))
    }
}

impl PriceProvider for InMemoryPriceProvider {
    fn fetch_series(&self, ticker: &str, start: NaiveDate) -> Result<PriceSeries, ProviderError> {
        Ok(self.lookup(ticker)?.since(start))
    }

    fn fetch_latest(&self, ticker: &str) -> Result<f64, ProviderError> {
        let series = self.lookup(ticker)?;
        series
            .latest()
            .map(|p| p.close)
            .ok_or_else(|| ProviderError::no_data(&series.ticker))
    }
}
