//! Cash, position and history owned by one backtest run.

use chrono::NaiveDate;

use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// One executed fill. `size` is positive for buys and negative for sells.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub size: f64,
    pub price: f64,
    pub commission: f64,
}

impl Transaction {
    pub fn is_buy(&self) -> bool {
        self.size > 0.0
    }

    /// Signed cash flow of the fill, excluding commission.
    pub fn value(&self) -> f64 {
        -self.size * self.price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub closed_trades: Vec<ClosedTrade>,
    pub transactions: Vec<Transaction>,
    pub equity_curve: Vec<EquityPoint>,
    pub failed_orders: usize,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Ledger {
            cash: initial_capital,
            initial_capital,
            position: None,
            closed_trades: Vec::new(),
            transactions: Vec::new(),
            equity_curve: Vec::new(),
            failed_orders: 0,
        }
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn open_position(&mut self, position: Position) {
        debug_assert!(self.position.is_none(), "second open position");
        self.position = Some(position);
    }

    pub fn take_position(&mut self) -> Option<Position> {
        self.position.take()
    }

    pub fn record_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint { date, equity });
    }

    pub fn total_equity(&self, price: f64) -> f64 {
        let position_value = self
            .position
            .as_ref()
            .map(|pos| pos.market_value(price))
            .unwrap_or(0.0);
        self.cash + position_value
    }

    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}
