//! Portfolio risk metrics calculation.
//!
//! Provides the Sharpe ratio and historical value-at-risk over a series of
//! daily returns, plus the summary statistics they are built from.

use crate::types::ReturnSeries;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Trading days per year, used to turn the annual risk-free rate into a daily one.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Default tail probability for value-at-risk (5th percentile).
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.05;

/// A risk figure, or the reason it cannot be computed.
///
/// Zero is a legitimate risk value, so "undefined" gets its own state
/// instead of being folded into a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metric {
    Value { value: f64 },
    NotEnoughData { reason: String },
}

impl Metric {
    /// Convert a calculation result, keeping insufficient data as a state.
    ///
    /// Any other error is passed through.
    pub fn from_result(result: Result<f64>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Metric::Value { value }),
            Err(Error::InsufficientData(reason)) => Ok(Metric::NotEnoughData { reason }),
            Err(e) => Err(e),
        }
    }

    /// The numeric value, if defined.
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value { value } => Some(*value),
            Metric::NotEnoughData { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.value().is_some()
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Value { value } => write!(f, "{:.4}", value),
            Metric::NotEnoughData { reason } => write!(f, "not enough data ({})", reason),
        }
    }
}

/// Risk metrics for a return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Number of return observations used
    pub observations: usize,
    /// Annual risk-free rate used for the Sharpe ratio
    pub risk_free_rate: f64,
    /// Tail probability used for value-at-risk
    pub confidence_level: f64,
    /// Arithmetic mean daily return
    pub mean_daily_return: Metric,
    /// Daily (non-annualized) Sharpe ratio
    pub sharpe_ratio: Metric,
    /// Historical value-at-risk as a return fraction
    pub value_at_risk: Metric,
}

impl RiskReport {
    /// Calculate every metric for `returns`.
    ///
    /// Metrics the series is too short for come back as
    /// [`Metric::NotEnoughData`]. Fails only on an invalid confidence level.
    pub fn from_returns(
        returns: &ReturnSeries,
        risk_free_rate: f64,
        confidence_level: f64,
    ) -> Result<Self> {
        let values = returns.values();

        Ok(Self {
            observations: values.len(),
            risk_free_rate,
            confidence_level,
            mean_daily_return: Metric::from_result(mean(&values))?,
            sharpe_ratio: Metric::from_result(sharpe_ratio(&values, risk_free_rate))?,
            value_at_risk: Metric::from_result(value_at_risk(&values, confidence_level))?,
        })
    }
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "Need at least 1 observation for a mean".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divides by n - 1).
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(Error::InsufficientData(
            "Need at least 2 observations for a standard deviation".to_string(),
        ));
    }

    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Calculate the Sharpe ratio from daily returns.
///
/// `(mean - risk_free_rate / 252) / sample_std_dev`, not annualized.
///
/// # Arguments
///
/// * `returns` - Daily returns (e.g., 0.01 for 1%)
/// * `risk_free_rate` - Annual risk-free rate (e.g., 0.02 for 2%)
///
/// # Errors
///
/// [`Error::InsufficientData`] with fewer than two returns or when every
/// return is the same (zero volatility), [`Error::InvalidOperation`] when a
/// return is NaN or infinite.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Result<f64> {
    if returns.iter().any(|r| !r.is_finite()) {
        return Err(Error::InvalidOperation(
            "Returns contain NaN or infinite values".to_string(),
        ));
    }
    let std = sample_std_dev(returns)?;

    // Exact comparison: summation noise would otherwise leave a tiny non-zero std
    let flat = returns.iter().all(|r| *r == returns[0]);
    if flat || std == 0.0 || !std.is_finite() {
        return Err(Error::InsufficientData(
            "Returns have zero volatility".to_string(),
        ));
    }

    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    Ok((mean(returns)? - daily_rf) / std)
}

/// Calculate historical value-at-risk.
///
/// The `confidence_level * 100`-th percentile of the returns, so with the
/// default 0.05 this is the 5th percentile: a negative number for a loss.
///
/// # Errors
///
/// [`Error::InsufficientData`] on an empty series,
/// [`Error::InvalidOperation`] when `confidence_level` is outside `[0, 1]`.
pub fn value_at_risk(returns: &[f64], confidence_level: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&confidence_level) {
        return Err(Error::InvalidOperation(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence_level
        )));
    }

    percentile(returns, confidence_level * 100.0)
}

/// Percentile with linear interpolation between order statistics.
///
/// For `n` sorted values the `q`-th percentile sits at zero-based position
/// `(n - 1) * q / 100`, interpolating between the neighbours.
pub fn percentile(values: &[f64], q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "Need at least 1 observation for a percentile".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&q) {
        return Err(Error::InvalidOperation(format!(
            "Percentile must be between 0 and 100, got {}",
            q
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = (sorted.len() - 1) as f64 * q / 100.0;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
