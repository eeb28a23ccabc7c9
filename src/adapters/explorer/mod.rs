//! Block explorer adapter: Etherscan for ETH, blockchain.info for BTC.

pub mod blockchain_info;
pub mod etherscan;

use reqwest::blocking::Client;
use tracing::info;

use crate::adapters::http;
use crate::domain::address::{Address, Chain};
use crate::domain::error::CoinlensError;
use crate::domain::transaction::TransactionRecord;
use crate::ports::config_port::ConfigPort;
use crate::ports::explorer_port::TransactionSource;

pub const DEFAULT_ETHERSCAN_URL: &str = "https://api.etherscan.io/api";
pub const DEFAULT_BLOCKCHAIN_INFO_URL: &str = "https://blockchain.info";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Explorer credentials and endpoints, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub etherscan_api_key: String,
    pub blockchain_info_api_key: String,
    pub etherscan_url: String,
    pub blockchain_info_url: String,
    pub timeout_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            etherscan_api_key: String::new(),
            blockchain_info_api_key: String::new(),
            etherscan_url: DEFAULT_ETHERSCAN_URL.to_string(),
            blockchain_info_url: DEFAULT_BLOCKCHAIN_INFO_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ExplorerConfig {
    /// Read the `[explorer]` section; every key is optional.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let timeout = config.get_int("explorer", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);
        Self {
            etherscan_api_key: config.get_string_or("explorer", "etherscan_api_key", ""),
            blockchain_info_api_key: config.get_string_or("explorer", "blockchain_info_api_key", ""),
            etherscan_url: config.get_string_or("explorer", "etherscan_url", DEFAULT_ETHERSCAN_URL),
            blockchain_info_url: config.get_string_or(
                "explorer",
                "blockchain_info_url",
                DEFAULT_BLOCKCHAIN_INFO_URL,
            ),
            timeout_secs: u64::try_from(timeout)
                .ok()
                .filter(|t| *t > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct ExplorerAdapter {
    client: Client,
    config: ExplorerConfig,
}

impl ExplorerAdapter {
    pub fn new(config: ExplorerConfig) -> Result<Self, CoinlensError> {
        let client = http::build_client(config.timeout_secs)
            .map_err(|reason| CoinlensError::FetchFailed { reason })?;
        Ok(Self { client, config })
    }

    fn get(&self, label: &str, url: &str) -> Result<String, CoinlensError> {
        http::get_text(&self.client, label, url).map_err(|reason| CoinlensError::FetchFailed { reason })
    }
}

impl TransactionSource for ExplorerAdapter {
    fn fetch_transactions(&self, address: &Address) -> Result<Vec<TransactionRecord>, CoinlensError> {
        let mut records = match address.chain() {
            Chain::Eth => {
                let url = etherscan::txlist_url(
                    &self.config.etherscan_url,
                    address,
                    &self.config.etherscan_api_key,
                );
                etherscan::parse_txlist(&self.get("etherscan", &url)?)?
            }
            Chain::Btc => {
                let url = blockchain_info::rawaddr_url(
                    &self.config.blockchain_info_url,
                    address,
                    &self.config.blockchain_info_api_key,
                );
                blockchain_info::parse_rawaddr(&self.get("blockchain.info", &url)?, address)?
            }
        };

        // blockchain.info lists newest first.
        records.sort_by_key(|r| r.timestamp);
        info!(%address, chain = %address.chain(), count = records.len(), "fetched transactions");
        Ok(records)
    }
}
