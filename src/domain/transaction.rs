//! Explorer-sourced transaction records.

/// One historical transaction as reported by a block explorer.
///
/// `value` is in the chain's smallest unit (satoshi or wei).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub hash: Option<String>,
    pub value: u128,
    pub from: String,
    pub to: Option<String>,
    pub timestamp: i64,
}
