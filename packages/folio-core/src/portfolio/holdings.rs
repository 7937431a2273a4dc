//! Net positions derived from the ledger.

use super::Ledger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net share count per ticker, ordered by ticker.
///
/// Balances are signed. Selling more than was bought leaves a negative
/// balance rather than being clamped; [`Holdings::oversold`] reports those.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Holdings(BTreeMap<String, i64>);

impl Holdings {
    /// Net shares for `ticker`, if it was ever transacted.
    pub fn get(&self, ticker: &str) -> Option<i64> {
        self.0.get(&ticker.trim().to_uppercase()).copied()
    }

    /// Iterate `(ticker, net_shares)` in ticker order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(ticker, shares)| (ticker.as_str(), *shares))
    }

    /// Number of tickers, including those netted to zero.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tickers with a non-zero balance.
    pub fn open(&self) -> impl Iterator<Item = (&str, i64)> {
        self.iter().filter(|(_, shares)| *shares != 0)
    }

    /// Tickers whose sells exceed their buys.
    pub fn oversold(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, shares)| *shares < 0)
            .map(|(ticker, _)| ticker)
            .collect()
    }
}

/// Net each ticker's buys and sells.
pub fn resolve(ledger: &Ledger) -> Holdings {
    let mut net: BTreeMap<String, i64> = BTreeMap::new();
    for tx in ledger.transactions() {
        // Entries built without `Transaction::new` may carry a raw ticker
        let ticker = tx.ticker.trim().to_uppercase();
        *net.entry(ticker).or_insert(0) += tx.signed_shares();
    }

    let holdings = Holdings(net);
    for ticker in holdings.oversold() {
        tracing::warn!(
            "Holding for {} is negative ({} shares): more sold than bought",
            ticker,
            holdings.get(ticker).unwrap_or_default()
        );
    }
    holdings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Transaction, TransactionKind};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn test_resolve_nets_buys_and_sells() {
        let ledger: Ledger = vec![
            Transaction::buy(day(1), "AAPL", 10, 150.0),
            Transaction::buy(day(2), "MSFT", 5, 300.0),
            Transaction::sell(day(3), "AAPL", 4, 160.0),
        ]
        .into_iter()
        .collect();

        let holdings = resolve(&ledger);
        assert_eq!(holdings.get("AAPL"), Some(6));
        assert_eq!(holdings.get("MSFT"), Some(5));
        assert_eq!(holdings.get("GOOGL"), None);
    }

    #[test]
    fn test_buy_then_sell_same_amount_is_zero() {
        let ledger = Ledger::new()
            .with_transaction(Transaction::buy(day(1), "AAPL", 10, 100.0))
            .with_transaction(Transaction::sell(day(2), "AAPL", 10, 110.0));

        let holdings = resolve(&ledger);
        assert_eq!(holdings.get("AAPL"), Some(0));
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings.open().count(), 0);
    }

    #[test]
    fn test_resolve_is_order_invariant() {
        let txs = vec![
            Transaction::buy(day(1), "AAPL", 10, 100.0),
            Transaction::sell(day(2), "AAPL", 3, 100.0),
            Transaction::buy(day(3), "MSFT", 7, 100.0),
            Transaction::buy(day(4), "AAPL", 2, 100.0),
            Transaction::sell(day(5), "MSFT", 1, 100.0),
        ];
        let forward: Ledger = txs.iter().cloned().collect();
        let backward: Ledger = txs.iter().rev().cloned().collect();

        assert_eq!(resolve(&forward), resolve(&backward));
    }

    #[test]
    fn test_oversell_keeps_negative_balance() {
        let ledger = Ledger::new().with_transaction(Transaction::sell(day(1), "TSLA", 5, 200.0));

        let holdings = resolve(&ledger);
        assert_eq!(holdings.get("TSLA"), Some(-5));
        assert_eq!(holdings.oversold(), vec!["TSLA"]);
    }

    #[test]
    fn test_empty_ledger_has_no_holdings() {
        assert!(resolve(&Ledger::new()).is_empty());
    }

    #[test]
    fn test_resolve_normalizes_raw_tickers() {
        let raw = Transaction {
            date: day(2),
            ticker: " aapl".to_string(),
            shares: 4,
            price: 100.0,
            kind: TransactionKind::Sell,
        };
        let ledger = Ledger::new()
            .with_transaction(Transaction::buy(day(1), "AAPL", 10, 100.0))
            .with_transaction(raw);

        let holdings = resolve(&ledger);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings.get("AAPL"), Some(6));
        assert_eq!(ledger.tickers(), vec!["AAPL".to_string()]);
    }
}
