//! Core data types for the folio ledger and analytics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a ledger transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl TransactionKind {
    /// Sign applied to the share count when netting holdings.
    pub fn sign(self) -> i64 {
        match self {
            TransactionKind::Buy => 1,
            TransactionKind::Sell => -1,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "buy"),
            TransactionKind::Sell => write!(f, "sell"),
        }
    }
}

/// A single entry in the ledger. Never mutated once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Trade date
    pub date: NaiveDate,
    /// Stock ticker symbol (uppercase)
    pub ticker: String,
    /// Number of shares traded
    pub shares: u32,
    /// Price per share at execution
    pub price: f64,
    /// Buy or Sell
    pub kind: TransactionKind,
}

impl Transaction {
    /// Create a new transaction. The ticker is trimmed and uppercased.
    pub fn new(
        date: NaiveDate,
        ticker: &str,
        shares: u32,
        price: f64,
        kind: TransactionKind,
    ) -> Self {
        Self {
            date,
            ticker: ticker.trim().to_uppercase(),
            shares,
            price,
            kind,
        }
    }

    /// Shorthand for a buy.
    pub fn buy(date: NaiveDate, ticker: &str, shares: u32, price: f64) -> Self {
        Self::new(date, ticker, shares, price, TransactionKind::Buy)
    }

    /// Shorthand for a sell.
    pub fn sell(date: NaiveDate, ticker: &str, shares: u32, price: f64) -> Self {
        Self::new(date, ticker, shares, price, TransactionKind::Sell)
    }

    /// Share delta this transaction applies to its ticker's holding.
    pub fn signed_shares(&self) -> i64 {
        self.kind.sign() * i64::from(self.shares)
    }

    /// Total cash value of the trade.
    pub fn value(&self) -> f64 {
        f64::from(self.shares) * self.price
    }
}

/// A single closing price observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closing prices for one ticker, strictly increasing by date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSeries {
    /// Stock ticker symbol (uppercase)
    pub ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from unordered points.
    ///
    /// Points are sorted by date, non-finite closes are dropped and, for a
    /// repeated date, the last supplied point wins.
    pub fn new(ticker: &str, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close.is_finite())
            .collect();
        // Stable sort keeps supply order within a date, so the last one survives dedup.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            ticker: ticker.trim().to_uppercase(),
            points: deduped,
        }
    }

    /// All points in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point, if any.
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Last point dated on or before `date`.
    pub fn close_on_or_before(&self, date: NaiveDate) -> Option<&PricePoint> {
        self.points.iter().rev().find(|p| p.date <= date)
    }

    /// Copy of the series restricted to points dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> Self {
        Self {
            ticker: self.ticker.clone(),
            points: self.points.iter().filter(|p| p.date >= start).copied().collect(),
        }
    }
}

/// A single dated fractional return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Date-ordered fractional returns.
///
/// Used both for a single ticker and for the blended portfolio series.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReturnSeries {
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn new(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The return values without their dates.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn last(&self) -> Option<&ReturnPoint> {
        self.points.last()
    }
}

/// Macro-economic figures shown alongside the portfolio, in percent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MacroIndicators {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unemployment: Option<f64>,
}

impl MacroIndicators {
    /// True when no indicator has been configured.
    pub fn is_empty(&self) -> bool {
        self.interest_rate.is_none() && self.inflation.is_none() && self.unemployment.is_none()
    }
}

/// API response wrapper used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
