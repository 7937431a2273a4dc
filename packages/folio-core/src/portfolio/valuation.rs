//! Portfolio market valuation.

use super::{resolve, Ledger};
use crate::provider::{PriceProvider, ProviderError};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar days fetched before an as-of date to find its closing price.
///
/// Covers weekends and exchange holidays.
pub const AS_OF_LOOKBACK_DAYS: i64 = 14;

/// Which closing price to value the holdings at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationDate {
    /// Most recent close the provider has.
    #[default]
    Latest,
    /// Last close on or before the given date.
    AsOf(NaiveDate),
}

/// Market value of a single holding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionValue {
    /// Stock ticker symbol
    pub ticker: String,
    /// Net shares held (may be negative after an oversell)
    pub shares: i64,
    /// Closing price used
    pub price: f64,
    /// shares * price
    pub market_value: f64,
}

/// A ticker left out of the total because its price could not be fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

/// Valuation breakdown for a ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Valuation {
    /// Successfully priced holdings
    pub positions: Vec<PositionValue>,
    /// Holdings without a price, contributing nothing to the total
    pub skipped: Vec<SkippedTicker>,
    /// Sum of all priced market values
    pub total: f64,
}

impl Valuation {
    /// Weight of each priced holding in the total.
    ///
    /// Empty when the total is not positive.
    pub fn weights(&self) -> Vec<(String, f64)> {
        if self.total <= 0.0 {
            return Vec::new();
        }

        self.positions
            .iter()
            .map(|p| (p.ticker.clone(), p.market_value / self.total))
            .collect()
    }
}

/// Value every holding in the ledger.
///
/// A ticker whose price lookup fails is recorded in
/// [`Valuation::skipped`] and the rest are still valued. An empty ledger
/// values at exactly zero.
pub fn value_portfolio(
    ledger: &Ledger,
    provider: &dyn PriceProvider,
    date: ValuationDate,
) -> Valuation {
    let holdings = resolve(ledger);
    let mut valuation = Valuation::default();

    for (ticker, shares) in holdings.iter() {
        match closing_price(provider, ticker, date) {
            Ok(price) => {
                let market_value = shares as f64 * price;
                valuation.total += market_value;
                valuation.positions.push(PositionValue {
                    ticker: ticker.to_string(),
                    shares,
                    price,
                    market_value,
                });
            }
            Err(e) => {
                tracing::warn!("Skipping {} in valuation: {}", ticker, e);
                valuation.skipped.push(SkippedTicker {
                    ticker: ticker.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    valuation
}

/// Total market value of the ledger's holdings at the latest close.
pub fn total_value(ledger: &Ledger, provider: &dyn PriceProvider) -> f64 {
    value_portfolio(ledger, provider, ValuationDate::Latest).total
}

fn closing_price(
    provider: &dyn PriceProvider,
    ticker: &str,
    date: ValuationDate,
) -> Result<f64, ProviderError> {
    let price = match date {
        ValuationDate::Latest => provider.fetch_latest(ticker)?,
        ValuationDate::AsOf(as_of) => {
            let start = as_of
                .checked_sub_signed(Duration::days(AS_OF_LOOKBACK_DAYS))
                .unwrap_or(NaiveDate::MIN);
            provider
                .fetch_series(ticker, start)?
                .close_on_or_before(as_of)
                .map(|p| p.close)
                .ok_or_else(|| ProviderError::no_data(ticker))?
        }
    };

    // A NaN or infinite close would poison the whole total
    if !price.is_finite() {
        return Err(ProviderError::no_data(ticker));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryPriceProvider;
    use crate::types::Transaction;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn test_total_value_scenario() {
        let ledger = Ledger::new()
            .with_transaction(Transaction::buy(day(1), "AAPL", 10, 100.0))
            .with_transaction(Transaction::buy(day(1), "MSFT", 5, 200.0));

        let mut provider = InMemoryPriceProvider::new();
        provider.insert_latest("AAPL", day(2), 110.0);
        provider.insert_latest("MSFT", day(2), 210.0);

        // 10 * 110 + 5 * 210
        assert_eq!(total_value(&ledger, &provider), 2150.0);
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        let provider = InMemoryPriceProvider::new();
        let valuation = value_portfolio(&Ledger::new(), &provider, ValuationDate::Latest);

        assert_eq!(valuation.total, 0.0);
        assert!(valuation.positions.is_empty());
        assert!(valuation.skipped.is_empty());
    }

    #[test]
    fn test_failed_ticker_is_skipped() {
        let ledger = Ledger::new()
            .with_transaction(Transaction::buy(day(1), "AAPL", 10, 100.0))
            .with_transaction(Transaction::buy(day(1), "MSFT", 5, 200.0))
            .with_transaction(Transaction::buy(day(1), "GONE", 7, 50.0));

        let mut provider = InMemoryPriceProvider::new();
        provider.insert_latest("AAPL", day(2), 110.0);
        provider.insert_latest("MSFT", day(2), 210.0);
        provider.fail_ticker("MSFT");

        let valuation = value_portfolio(&ledger, &provider, ValuationDate::Latest);

        // Only AAPL is priced
        assert_eq!(valuation.total, 1100.0);
        assert_eq!(valuation.positions.len(), 1);
        let skipped: Vec<&str> = valuation.skipped.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(skipped, vec!["GONE", "MSFT"]);
    }

    #[test]
    fn test_delisted_ticker_contributes_zero() {
        let ledger = Ledger::new()
            .with_transaction(Transaction::buy(day(1), "AAPL", 1, 100.0))
            .with_transaction(Transaction::buy(day(1), "DEAD", 100, 5.0));

        let mut provider = InMemoryPriceProvider::new();
        provider.insert_latest("AAPL", day(2), 120.0);
        provider.insert_closes("DEAD", &[]);

        assert_eq!(total_value(&ledger, &provider), 120.0);
    }

    #[test]
    fn test_sold_out_position_is_worth_nothing() {
        let ledger = Ledger::new()
            .with_transaction(Transaction::buy(day(1), "AAPL", 10, 100.0))
            .with_transaction(Transaction::sell(day(2), "AAPL", 10, 105.0));

        let mut provider = InMemoryPriceProvider::new();
        provider.insert_latest("AAPL", day(3), 110.0);

        assert_eq!(total_value(&ledger, &provider), 0.0);
    }

    #[test]
    fn test_value_as_of_date() {
        let ledger = Ledger::new().with_transaction(Transaction::buy(day(1), "AAPL", 2, 100.0));

        let mut provider = InMemoryPriceProvider::new();
        provider.insert_closes("AAPL", &[(day(5), 100.0), (day(8), 104.0), (day(9), 106.0)]);

        // The 7th is a gap, so the 5th's close is used
        let valuation = value_portfolio(&ledger, &provider, ValuationDate::AsOf(day(7)));
        assert_eq!(valuation.total, 200.0);

        let valuation = value_portfolio(&ledger, &provider, ValuationDate::AsOf(day(9)));
        assert_eq!(valuation.total, 212.0);

        // Before any data: skipped, not an error
        let valuation = value_portfolio(&ledger, &provider, ValuationDate::AsOf(day(2)));
        assert_eq!(valuation.total, 0.0);
        assert_eq!(valuation.skipped.len(), 1);
    }

    #[test]
    fn test_weights() {
        let ledger = Ledger::new()
            .with_transaction(Transaction::buy(day(1), "AAPL", 10, 100.0))
            .with_transaction(Transaction::buy(day(1), "MSFT", 10, 100.0));

        let mut provider = InMemoryPriceProvider::new();
        provider.insert_latest("AAPL", day(2), 100.0);
        provider.insert_latest("MSFT", day(2), 100.0);

        let weights = value_portfolio(&ledger, &provider, ValuationDate::Latest).weights();
        assert_eq!(weights.len(), 2);
        assert!((weights[0].1 - 0.5).abs() < 0.01);
        assert!((weights[1].1 - 0.5).abs() < 0.01);
    }

    /// Provider returning a fixed latest close per ticker, whatever its value.
    struct FixedLatest(Vec<(&'static str, f64)>);

    impl PriceProvider for FixedLatest {
        fn fetch_series(
            &self,
            ticker: &str,
            _start: NaiveDate,
        ) -> Result<crate::types::PriceSeries, ProviderError> {
            Err(ProviderError::unavailable(ticker, "no history"))
        }

        fn fetch_latest(&self, ticker: &str) -> Result<f64, ProviderError> {
            self.0
                .iter()
                .find(|(t, _)| *t == ticker)
                .map(|(_, price)| *price)
                .ok_or_else(|| ProviderError::unavailable(ticker, "unknown ticker"))
        }
    }

    #[test]
    fn test_non_finite_latest_price_is_skipped() {
        let ledger = Ledger::new()
            .with_transaction(Transaction::buy(day(1), "AAPL", 10, 100.0))
            .with_transaction(Transaction::buy(day(1), "BAD", 1, 50.0))
            .with_transaction(Transaction::buy(day(1), "INF", 1, 50.0));

        let provider = FixedLatest(vec![
            ("AAPL", 110.0),
            ("BAD", f64::NAN),
            ("INF", f64::INFINITY),
        ]);

        let valuation = value_portfolio(&ledger, &provider, ValuationDate::Latest);
        assert_eq!(valuation.total, 1100.0);
        let skipped: Vec<&str> = valuation.skipped.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(skipped, vec!["BAD", "INF"]);
    }

    #[test]
    fn test_value_as_of_earliest_date_does_not_overflow() {
        let ledger = Ledger::new().with_transaction(Transaction::buy(day(1), "AAPL", 2, 100.0));

        let mut provider = InMemoryPriceProvider::new();
        provider.insert_latest("AAPL", day(5), 100.0);

        let valuation = value_portfolio(&ledger, &provider, ValuationDate::AsOf(NaiveDate::MIN));
        assert_eq!(valuation.total, 0.0);
        assert_eq!(valuation.skipped.len(), 1);
    }
}
