//! Position tracking and trade records.

use chrono::NaiveDate;

/// An open long position. Quantity is fractional (e.g. 0.37 BTC).
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_index: usize,
    pub entry_commission: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub bars_held: usize,
    /// Price PnL before commissions.
    pub gross_pnl: f64,
    /// Price PnL net of entry and exit commissions.
    pub pnl: f64,
}
