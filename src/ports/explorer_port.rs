//! Block explorer port trait.

use crate::domain::address::Address;
use crate::domain::error::CoinlensError;
use crate::domain::transaction::TransactionRecord;

/// Source of an address's transaction history.
pub trait TransactionSource {
    /// All known transactions for `address`, oldest first.
    fn fetch_transactions(&self, address: &Address) -> Result<Vec<TransactionRecord>, CoinlensError>;
}
