//! Portfolio module.
//!
//! Ledger, derived holdings, valuation, blended returns and risk metrics.

mod holdings;
mod ledger;
mod returns;
mod risk;
mod valuation;

pub use holdings::{resolve, Holdings};
pub use ledger::Ledger;
pub use returns::{blend, blended_returns, cumulative_returns, daily_returns};
pub use risk::{
    mean, percentile, sample_std_dev, sharpe_ratio, value_at_risk, Metric, RiskReport,
    DEFAULT_CONFIDENCE_LEVEL, DEFAULT_RISK_FREE_RATE, TRADING_DAYS_PER_YEAR,
};
pub use valuation::{
    total_value, value_portfolio, PositionValue, SkippedTicker, Valuation, ValuationDate,
    AS_OF_LOOKBACK_DAYS,
};
