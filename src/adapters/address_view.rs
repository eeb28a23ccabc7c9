//! Presentation of an address query: the view model and the session that
//! owns the current view.

use std::fmt;

use tracing::info;

use crate::adapters::svg_chart::{self, StackedBar};
use crate::domain::address::{Address, Chain};
use crate::domain::error::CoinlensError;
use crate::domain::summary::{self, AddressSummary};
use crate::ports::explorer_port::TransactionSource;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Classify `input`, fetch its history and aggregate it.
pub fn query_address(
    source: &dyn TransactionSource,
    input: &str,
) -> Result<AddressSummary, CoinlensError> {
    let address = Address::parse(input)?;
    info!(%address, chain = %address.chain(), "querying address");
    let records = source.fetch_transactions(&address)?;
    summary::aggregate(&address, &records)
}

/// Immutable rendering of one [`AddressSummary`].
#[derive(Debug, Clone, PartialEq)]
pub struct AddressView {
    pub address: String,
    pub lines: Vec<String>,
    pub chart: Vec<StackedBar>,
}

impl AddressView {
    pub fn from_summary(summary: &AddressSummary) -> Self {
        let lines = vec![
            format!(
                "First transaction time: {}",
                summary.first_transaction_time.format(TIME_FORMAT)
            ),
            format!(
                "Last transaction time: {}",
                summary.last_transaction_time.format(TIME_FORMAT)
            ),
            format!("Total amount: {}", summary.total_amount()),
            format!("Number of transactions: {}", summary.transaction_count),
            format!("Sent transactions (BTC): {}", summary.sent.btc),
            format!("Received transactions (BTC): {}", summary.received.btc),
            format!("Sent transactions (ETH): {}", summary.sent.eth),
            format!("Received transactions (ETH): {}", summary.received.eth),
            format!("Max transaction: {}", summary.max_amount()),
        ];

        let chart = Chain::ALL
            .iter()
            .map(|&chain| StackedBar {
                label: chain.ticker().to_string(),
                sent: summary.sent.get(chain),
                received: summary.received.get(chain),
            })
            .collect();

        Self {
            address: summary.address.clone(),
            lines,
            chart,
        }
    }

    pub fn chart_svg(&self) -> String {
        svg_chart::render_stacked_bar_svg(&self.chart)
    }
}

impl fmt::Display for AddressView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Holds at most one view; each successful submission replaces it and a
/// failed one leaves it in place.
#[derive(Debug, Default)]
pub struct QuerySession {
    current: Option<AddressView>,
}

impl QuerySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&AddressView> {
        self.current.as_ref()
    }

    pub fn submit(
        &mut self,
        source: &dyn TransactionSource,
        input: &str,
    ) -> Result<&AddressView, CoinlensError> {
        let summary = query_address(source, input)?;
        Ok(&*self.current.insert(AddressView::from_summary(&summary)))
    }
}
