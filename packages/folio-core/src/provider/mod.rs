//! Market data access.
//!
//! The analytics never talk to a market-data service directly. They go
//! through [`PriceProvider`], and treat every [`ProviderError`] as "skip this
//! ticker" rather than a failure of the whole computation.

mod file;
mod memory;

use crate::types::PriceSeries;
use chrono::NaiveDate;

pub use file::JsonFilePriceProvider;
pub use memory::InMemoryPriceProvider;

/// Reasons a price lookup can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The source could not be reached or does not know the ticker.
    #[error("Price data unavailable for {ticker}: {reason}")]
    Unavailable { ticker: String, reason: String },

    /// The ticker is known but no price falls in the requested range.
    #[error("No price data for {ticker}")]
    NoData { ticker: String },
}

impl ProviderError {
    pub fn unavailable(ticker: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }

    pub fn no_data(ticker: &str) -> Self {
        Self::NoData {
            ticker: ticker.to_string(),
        }
    }

    /// Ticker the failed lookup was for.
    pub fn ticker(&self) -> &str {
        match self {
            Self::Unavailable { ticker, .. } | Self::NoData { ticker } => ticker,
        }
    }
}

/// Source of historical and latest closing prices.
///
/// Calls are blocking. Implementations make no caching promise; callers
/// fetch fresh data on every recomputation.
pub trait PriceProvider {
    /// Closing prices for `ticker` from `start` (inclusive) to the most recent day.
    fn fetch_series(&self, ticker: &str, start: NaiveDate) -> Result<PriceSeries, ProviderError>;

    /// Most recent closing price for `ticker`.
    fn fetch_latest(&self, ticker: &str) -> Result<f64, ProviderError>;
}
