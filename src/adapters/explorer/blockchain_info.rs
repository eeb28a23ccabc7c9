//! blockchain.info `rawaddr` endpoint.

use serde::Deserialize;

use crate::domain::address::Address;
use crate::domain::error::CoinlensError;
use crate::domain::transaction::TransactionRecord;

#[derive(Debug, Deserialize)]
struct RawAddrResponse {
    #[serde(default)]
    txs: Option<Vec<RawTx>>,
}

#[derive(Debug, Deserialize)]
struct RawTx {
    #[serde(default)]
    hash: Option<String>,
    time: i64,
    /// Net effect of the transaction on the queried address, in satoshi.
    #[serde(default)]
    result: Option<i64>,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    out: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    #[serde(default)]
    prev_out: Option<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    #[serde(default)]
    addr: Option<String>,
    #[serde(default)]
    value: u64,
}

pub fn rawaddr_url(base_url: &str, address: &Address, api_key: &str) -> String {
    format!(
        "{}/rawaddr/{}?api_code={}",
        base_url.trim_end_matches('/'),
        address,
        api_key
    )
}

/// Parse a `rawaddr` body into records for `address`. A body without a
/// `txs` array is a failure.
pub fn parse_rawaddr(body: &str, address: &Address) -> Result<Vec<TransactionRecord>, CoinlensError> {
    let response: RawAddrResponse =
        serde_json::from_str(body).map_err(|e| CoinlensError::FetchFailed {
            reason: format!("malformed blockchain.info response: {}", e),
        })?;
    let txs = response.txs.ok_or_else(|| CoinlensError::FetchFailed {
        reason: "blockchain.info response has no txs".into(),
    })?;

    Ok(txs.into_iter().map(|tx| into_record(tx, address)).collect())
}

fn into_record(tx: RawTx, address: &Address) -> TransactionRecord {
    let input_addrs: Vec<&str> = tx
        .inputs
        .iter()
        .filter_map(|i| i.prev_out.as_ref()?.addr.as_deref())
        .collect();
    let sent = input_addrs.iter().any(|a| address.matches(a));

    let from = if sent {
        address.as_str().to_string()
    } else {
        input_addrs.first().map(|a| a.to_string()).unwrap_or_default()
    };
    let to = if sent {
        tx.out
            .iter()
            .filter_map(|o| o.addr.as_deref())
            .find(|a| !address.matches(a))
            .map(str::to_string)
    } else {
        Some(address.as_str().to_string())
    };

    let value = match tx.result {
        Some(net) => u128::from(net.unsigned_abs()),
        None => tx
            .out
            .iter()
            .filter(|o| o.addr.as_deref().is_some_and(|a| address.matches(a)))
            .map(|o| u128::from(o.value))
            .sum(),
    };

    TransactionRecord {
        hash: tx.hash,
        value,
        from,
        to,
        timestamp: tx.time,
    }
}
