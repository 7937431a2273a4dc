//! Per-user session state and the views computed from it.
//!
//! A [`Session`] owns the ledger for as long as the process runs. Entries
//! go in through [`Session::record`]; every view re-derives its numbers from
//! the ledger and fresh provider calls.

use crate::config::Settings;
use crate::portfolio::{
    blended_returns, cumulative_returns, resolve, value_portfolio, Holdings, Ledger, Metric,
    RiskReport, Valuation, ValuationDate,
};
use crate::provider::PriceProvider;
use crate::types::{MacroIndicators, ReturnSeries, Transaction, TransactionKind};
use crate::{Error, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Smallest share count accepted by the entry form.
pub const MIN_SHARES: i64 = 1;

/// Smallest price accepted by the entry form.
pub const MIN_PRICE: f64 = 0.01;

/// A transaction as typed by the user, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    pub kind: TransactionKind,
    pub ticker: String,
    pub shares: i64,
    pub price: f64,
    /// Trade date; today when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl EntryForm {
    /// Check the form and build the transaction, dating it `today` if no date was given.
    pub fn into_transaction(self, today: NaiveDate) -> Result<Transaction> {
        let ticker = self.ticker.trim();
        if ticker.is_empty() {
            return Err(Error::InvalidTransaction("Ticker is required".to_string()));
        }
        if ticker.chars().any(char::is_whitespace) {
            return Err(Error::InvalidTransaction(format!(
                "Ticker must be a single symbol, got '{}'",
                ticker
            )));
        }
        if self.shares < MIN_SHARES {
            return Err(Error::InvalidTransaction(format!(
                "Shares must be at least {}, got {}",
                MIN_SHARES, self.shares
            )));
        }
        let shares = u32::try_from(self.shares).map_err(|_| {
            Error::InvalidTransaction(format!("Share count {} is too large", self.shares))
        })?;
        if !self.price.is_finite() || self.price < MIN_PRICE {
            return Err(Error::InvalidTransaction(format!(
                "Price must be at least {}, got {}",
                MIN_PRICE, self.price
            )));
        }

        Ok(Transaction::new(
            self.date.unwrap_or(today),
            ticker,
            shares,
            self.price,
            self.kind,
        ))
    }
}

impl FromStr for EntryForm {
    type Err = Error;

    /// Parse `buy|sell TICKER SHARES PRICE [YYYY-MM-DD]`.
    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if !(4..=5).contains(&fields.len()) {
            return Err(Error::Parse(format!(
                "Expected 'buy|sell TICKER SHARES PRICE [DATE]', got '{}'",
                s.trim()
            )));
        }

        let kind = match fields[0].to_lowercase().as_str() {
            "buy" => TransactionKind::Buy,
            "sell" => TransactionKind::Sell,
            other => {
                return Err(Error::Parse(format!(
                    "Unknown transaction type '{}', expected buy or sell",
                    other
                )))
            }
        };
        let shares = fields[2]
            .parse::<i64>()
            .map_err(|_| Error::Parse(format!("Invalid share count '{}'", fields[2])))?;
        let price = fields[3]
            .parse::<f64>()
            .map_err(|_| Error::Parse(format!("Invalid price '{}'", fields[3])))?;
        let date = fields
            .get(4)
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|_| Error::Parse(format!("Invalid date '{}', expected YYYY-MM-DD", d)))
            })
            .transpose()?;

        Ok(Self {
            kind,
            ticker: fields[1].to_string(),
            shares,
            price,
            date,
        })
    }
}

/// Everything the portfolio overview shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    /// Number of ledger entries
    pub transactions: usize,
    /// Net shares per ticker
    pub holdings: Holdings,
    /// Tickers with negative balances
    pub oversold: Vec<String>,
    /// Market value breakdown
    pub valuation: Valuation,
    /// Risk metrics over the blended returns
    pub risk: RiskReport,
    /// Sum of all blended daily returns
    pub cumulative_return: Metric,
}

/// One user's working state: settings plus the transaction ledger.
#[derive(Debug, Clone, Default)]
pub struct Session {
    settings: Settings,
    ledger: Ledger,
}

impl Session {
    /// Start a session with an empty ledger.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ledger: Ledger::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Validate an entry and append it, dated today if undated.
    pub fn record(&mut self, form: EntryForm) -> Result<&Transaction> {
        self.record_on(form, Local::now().date_naive())
    }

    /// Validate an entry and append it, using `today` for undated entries.
    pub fn record_on(&mut self, form: EntryForm, today: NaiveDate) -> Result<&Transaction> {
        let transaction = form.into_transaction(today)?;
        Ok(self.ledger.append(transaction))
    }

    /// Current net shares per ticker.
    pub fn holdings(&self) -> Holdings {
        resolve(&self.ledger)
    }

    /// Value the holdings at the latest close.
    pub fn valuation(&self, provider: &dyn PriceProvider) -> Valuation {
        value_portfolio(&self.ledger, provider, ValuationDate::Latest)
    }

    /// Value the holdings at the close on or before `date`.
    pub fn valuation_as_of(&self, provider: &dyn PriceProvider, date: NaiveDate) -> Valuation {
        value_portfolio(&self.ledger, provider, ValuationDate::AsOf(date))
    }

    /// Blended daily returns from the configured history start.
    pub fn returns(&self, provider: &dyn PriceProvider) -> ReturnSeries {
        blended_returns(&self.ledger, provider, self.settings.history_start)
    }

    /// Risk metrics over the blended returns.
    pub fn risk(&self, provider: &dyn PriceProvider) -> Result<RiskReport> {
        self.risk_for(&self.returns(provider))
    }

    fn risk_for(&self, returns: &ReturnSeries) -> Result<RiskReport> {
        RiskReport::from_returns(
            returns,
            self.settings.risk_free_rate,
            self.settings.confidence_level,
        )
    }

    /// Recompute every view at once.
    pub fn overview(&self, provider: &dyn PriceProvider) -> Result<Overview> {
        tracing::debug!("Computing overview for {} transactions", self.ledger.len());

        let holdings = self.holdings();
        let oversold = holdings.oversold().into_iter().map(String::from).collect();
        let valuation = self.valuation(provider);
        let returns = self.returns(provider);
        let risk = self.risk_for(&returns)?;
        let cumulative_return = match cumulative_returns(&returns).last() {
            Some(point) => Metric::Value { value: point.value },
            None => Metric::NotEnoughData {
                reason: "No return observations".to_string(),
            },
        };

        Ok(Overview {
            transactions: self.ledger.len(),
            holdings,
            oversold,
            valuation,
            risk,
            cumulative_return,
        })
    }

    /// Configured macro-economic figures.
    pub fn macro_indicators(&self) -> &MacroIndicators {
        &self.settings.macro_indicators
    }
}
