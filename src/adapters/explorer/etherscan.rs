//! Etherscan `txlist` endpoint.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::address::Address;
use crate::domain::error::CoinlensError;
use crate::domain::transaction::TransactionRecord;

#[derive(Debug, Deserialize)]
struct TxListResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct EtherscanTx {
    #[serde(default)]
    hash: Option<String>,
    value: String,
    from: String,
    #[serde(default)]
    to: Option<String>,
    #[serde(rename = "timeStamp")]
    time_stamp: String,
}

pub fn txlist_url(base_url: &str, address: &Address, api_key: &str) -> String {
    format!(
        "{}?module=account&action=txlist&address={}&startblock=0&endblock=99999999&sort=asc&apikey={}",
        base_url.trim_end_matches('/'),
        address,
        api_key
    )
}

fn fetch_failed(reason: impl Into<String>) -> CoinlensError {
    CoinlensError::FetchFailed {
        reason: reason.into(),
    }
}

/// Parse a `txlist` body. Anything other than `message == "OK"` is a failure,
/// including Etherscan's "No transactions found".
pub fn parse_txlist(body: &str) -> Result<Vec<TransactionRecord>, CoinlensError> {
    let response: TxListResponse = serde_json::from_str(body)
        .map_err(|e| fetch_failed(format!("malformed etherscan response: {}", e)))?;

    match response.message.as_deref() {
        Some("OK") => {}
        Some(other) => return Err(fetch_failed(format!("etherscan: {}", other))),
        None => return Err(fetch_failed("etherscan response has no message field")),
    }

    let txs: Vec<EtherscanTx> = serde_json::from_value(response.result)
        .map_err(|e| fetch_failed(format!("malformed etherscan result: {}", e)))?;

    txs.into_iter().map(into_record).collect()
}

fn into_record(tx: EtherscanTx) -> Result<TransactionRecord, CoinlensError> {
    let value = tx
        .value
        .trim()
        .parse::<u128>()
        .map_err(|e| fetch_failed(format!("bad value {:?}: {}", tx.value, e)))?;
    let timestamp = tx
        .time_stamp
        .trim()
        .parse::<i64>()
        .map_err(|e| fetch_failed(format!("bad timeStamp {:?}: {}", tx.time_stamp, e)))?;

    Ok(TransactionRecord {
        hash: tx.hash.filter(|h| !h.is_empty()),
        value,
        from: tx.from,
        // Contract creations carry an empty `to`.
        to: tx.to.filter(|t| !t.is_empty()),
        timestamp,
    })
}
