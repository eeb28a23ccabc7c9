//! Aggregate statistics for one address query.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::address::{Address, Chain};
use crate::domain::error::CoinlensError;
use crate::domain::transaction::TransactionRecord;

/// Per-chain transaction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainCounts {
    pub btc: usize,
    pub eth: usize,
}

impl ChainCounts {
    pub fn get(&self, chain: Chain) -> usize {
        match chain {
            Chain::Btc => self.btc,
            Chain::Eth => self.eth,
        }
    }

    fn increment(&mut self, chain: Chain) {
        match chain {
            Chain::Btc => self.btc += 1,
            Chain::Eth => self.eth += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.btc + self.eth
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressSummary {
    pub address: String,
    pub chain: Chain,
    pub first_transaction_time: DateTime<Utc>,
    pub last_transaction_time: DateTime<Utc>,
    /// Sum of all values, in the chain's smallest unit.
    pub total_value: u128,
    /// Largest single value, in the chain's smallest unit.
    pub max_value: u128,
    pub transaction_count: usize,
    pub sent: ChainCounts,
    pub received: ChainCounts,
}

impl AddressSummary {
    pub fn total_amount(&self) -> Decimal {
        to_display_units(self.total_value, self.chain)
    }

    pub fn max_amount(&self) -> Decimal {
        to_display_units(self.max_value, self.chain)
    }
}

/// Convert a smallest-unit amount into display units for `chain`.
///
/// Amounts beyond `Decimal`'s 96-bit mantissa saturate at `Decimal::MAX`.
pub fn to_display_units(value: u128, chain: Chain) -> Decimal {
    i128::try_from(value)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, chain.decimals()).ok())
        .map(|d| d.normalize())
        .unwrap_or(Decimal::MAX)
}

/// Reduce an address's transactions into an [`AddressSummary`].
///
/// A transaction counts as sent when its `from` field equals the queried
/// address, ignoring ASCII case; every other transaction counts as received.
pub fn aggregate(
    address: &Address,
    records: &[TransactionRecord],
) -> Result<AddressSummary, CoinlensError> {
    if records.is_empty() {
        return Err(CoinlensError::NoTransactions {
            address: address.to_string(),
        });
    }

    let chain = address.chain();
    let mut sent = ChainCounts::default();
    let mut received = ChainCounts::default();
    let mut total_value: u128 = 0;
    let mut max_value: u128 = 0;
    let mut first_ts = i64::MAX;
    let mut last_ts = i64::MIN;

    for tx in records {
        total_value = total_value.saturating_add(tx.value);
        max_value = max_value.max(tx.value);

        if address.matches(&tx.from) {
            sent.increment(chain);
        } else {
            received.increment(chain);
        }

        first_ts = first_ts.min(tx.timestamp);
        last_ts = last_ts.max(tx.timestamp);
    }

    Ok(AddressSummary {
        address: address.to_string(),
        chain,
        first_transaction_time: to_datetime(first_ts)?,
        last_transaction_time: to_datetime(last_ts)?,
        total_value,
        max_value,
        transaction_count: records.len(),
        sent,
        received,
    })
}

fn to_datetime(ts: i64) -> Result<DateTime<Utc>, CoinlensError> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| CoinlensError::FetchFailed {
        reason: format!("timestamp {} out of range", ts),
    })
}
