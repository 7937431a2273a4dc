//! Folio Core - Transaction ledger and portfolio analytics.
//!
//! This crate provides the core of a personal investment tracker:
//!
//! - **Ledger**: Append-only record of buy and sell transactions
//! - **Holdings**: Net share counts derived from the ledger
//! - **Valuation**: Market value of the holdings via a [`PriceProvider`]
//! - **Returns**: Equal-weighted blended daily returns across tickers
//! - **Risk metrics**: Sharpe ratio and historical value-at-risk
//!
//! Everything is recomputed on demand from the ledger; nothing is cached
//! and nothing outlives the [`Session`] that owns the ledger.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use folio_core::portfolio::{total_value, Ledger};
//! use folio_core::provider::InMemoryPriceProvider;
//! use folio_core::Transaction;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let mut ledger = Ledger::new();
//! ledger.append(Transaction::buy(date, "AAPL", 10, 100.0));
//!
//! let mut prices = InMemoryPriceProvider::new();
//! prices.insert_latest("AAPL", date, 110.0);
//!
//! assert_eq!(total_value(&ledger, &prices), 1100.0);
//! ```

pub mod config;
pub mod portfolio;
pub mod provider;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, MacroIndicators, PricePoint, PriceSeries, ReturnPoint, ReturnSeries, Transaction,
    TransactionKind,
};

// Re-export main functionality
pub use config::Settings;
pub use portfolio::{
    blended_returns, resolve, sharpe_ratio, total_value, value_at_risk, Holdings, Ledger, Metric,
    RiskReport, Valuation, ValuationDate,
};
pub use provider::{PriceProvider, ProviderError};
pub use session::{EntryForm, Overview, Session};

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
