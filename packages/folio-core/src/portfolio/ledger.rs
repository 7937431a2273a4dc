//! Append-only transaction ledger.

use crate::types::Transaction;
use serde::{Deserialize, Serialize};

/// Ordered record of every transaction entered in a session.
///
/// Transactions are kept in entry order, which need not match their trade
/// dates. There is no way to edit or remove an entry; corrections are new
/// offsetting transactions. The ledger does not validate what it is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction and return a reference to the stored entry.
    pub fn append(&mut self, transaction: Transaction) -> &Transaction {
        tracing::debug!(
            "Ledger append: {} {} {} @ {}",
            transaction.kind,
            transaction.ticker,
            transaction.shares,
            transaction.price
        );
        self.transactions.push(transaction);
        &self.transactions[self.transactions.len() - 1]
    }

    /// By-value append, returning the extended ledger.
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.append(transaction);
        self
    }

    /// All transactions in entry order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Distinct tickers in the order they first appear.
    pub fn tickers(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for tx in &self.transactions {
            let ticker = tx.ticker.trim().to_uppercase();
            if !seen.contains(&ticker) {
                seen.push(ticker);
            }
        }
        seen
    }
}

impl FromIterator<Transaction> for Ledger {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}
