//! Address shape classification.
//!
//! Addresses are recognised purely by shape; no checksum is verified and no
//! network access happens here.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::domain::error::CoinlensError;

static BTC_P2PKH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[a-km-zA-HJ-NP-Z1-9]{25,34}$").expect("valid P2PKH pattern"));
static BTC_P2SH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^3[a-km-zA-HJ-NP-Z1-9]{25,34}$").expect("valid P2SH pattern"));
static ETH_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid ETH pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Btc,
    Eth,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::Btc, Chain::Eth];

    /// Number of decimal places between the smallest on-chain unit and the
    /// display unit (satoshi → BTC, wei → ETH).
    pub fn decimals(self) -> u32 {
        match self {
            Chain::Btc => 8,
            Chain::Eth => 18,
        }
    }

    pub fn ticker(self) -> &'static str {
        match self {
            Chain::Btc => "BTC",
            Chain::Eth => "ETH",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

/// Classify an input string. Patterns are tried in order (P2PKH, P2SH, ETH)
/// and the first match wins.
pub fn classify(input: &str) -> Option<Chain> {
    if BTC_P2PKH.is_match(input) || BTC_P2SH.is_match(input) {
        Some(Chain::Btc)
    } else if ETH_HEX.is_match(input) {
        Some(Chain::Eth)
    } else {
        None
    }
}

/// An address whose chain was fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    value: String,
    chain: Chain,
}

impl Address {
    pub fn parse(input: &str) -> Result<Self, CoinlensError> {
        match classify(input) {
            Some(chain) => Ok(Self {
                value: input.to_string(),
                chain,
            }),
            None => Err(CoinlensError::UnrecognizedAddress {
                input: input.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Case-insensitive comparison against another address string.
    pub fn matches(&self, other: &str) -> bool {
        self.value.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
