//! Daily return series and the blended portfolio series.

use super::Ledger;
use crate::provider::PriceProvider;
use crate::types::{PriceSeries, ReturnPoint, ReturnSeries};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Day-over-day fractional change of a price series.
///
/// Each return is dated at the later of its two closes. Non-finite results
/// (a zero close) are treated as missing.
pub fn daily_returns(series: &PriceSeries) -> ReturnSeries {
    let points = series
        .points()
        .windows(2)
        .filter_map(|pair| {
            let value = pair[1].close / pair[0].close - 1.0;
            value.is_finite().then_some(ReturnPoint {
                date: pair[1].date,
                value,
            })
        })
        .collect();

    ReturnSeries::new(points)
}

/// Equal-weighted, date-aligned mean of several return series.
///
/// Every date present in at least one series appears in the result; series
/// lacking that date are left out of its mean.
pub fn blend(series: &[ReturnSeries]) -> ReturnSeries {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for s in series {
        for point in &s.points {
            let entry = by_date.entry(point.date).or_insert((0.0, 0));
            entry.0 += point.value;
            entry.1 += 1;
        }
    }

    let points = by_date
        .into_iter()
        .map(|(date, (sum, count))| ReturnPoint {
            date,
            value: sum / count as f64,
        })
        .collect();

    ReturnSeries::new(points)
}

/// Blended daily returns of every ticker that appears in the ledger.
///
/// All tickers ever transacted are included, whatever their current
/// balance, and each counts equally regardless of position size. Tickers
/// the provider cannot serve are skipped.
pub fn blended_returns(
    ledger: &Ledger,
    provider: &dyn PriceProvider,
    start: NaiveDate,
) -> ReturnSeries {
    let mut per_ticker = Vec::new();
    for ticker in ledger.tickers() {
        match provider.fetch_series(&ticker, start) {
            Ok(prices) => per_ticker.push(daily_returns(&prices)),
            Err(e) => tracing::warn!("Skipping {} in returns: {}", ticker, e),
        }
    }

    let blended = blend(&per_ticker);
    tracing::debug!(
        "Blended {} return series into {} observations",
        per_ticker.len(),
        blended.len()
    );
    blended
}

/// Running sum of returns, as plotted for cumulative performance.
pub fn cumulative_returns(returns: &ReturnSeries) -> ReturnSeries {
    let mut total = 0.0;
    let points = returns
        .points
        .iter()
        .map(|p| {
            total += p.value;
            ReturnPoint {
                date: p.date,
                value: total,
            }
        })
        .collect();

    ReturnSeries::new(points)
}
