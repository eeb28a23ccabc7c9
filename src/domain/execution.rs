//! Order execution against the ledger.
//!
//! Orders fill at the signalling bar's close (cheat-on-close). Buys are sized
//! as a fraction of available cash and may be fractional; sells close the
//! whole position. An order that cannot be filled is reported with a failure
//! status and leaves the ledger untouched apart from `failed_orders`.

use chrono::NaiveDate;
use std::fmt;

use super::ledger::{Ledger, Transaction};
use super::position::{ClosedTrade, Position};
use super::strategy::StrategyParams;

/// Configuration for execution costs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionConfig {
    /// Commission as a percentage of traded value (0.1 = 0.1%).
    pub commission_pct: f64,
}

/// Calculate commission: trade_value * pct / 100.
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    trade_value * config.commission_pct / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Completed,
    /// The bar had no usable price.
    Canceled,
    /// Cost plus commission exceeded available cash.
    Margin,
    /// The computed size was zero, negative or not finite.
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Canceled => write!(f, "Canceled"),
            OrderStatus::Margin => write!(f, "Margin"),
            OrderStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Outcome of one order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReport {
    pub side: OrderSide,
    pub status: OrderStatus,
    pub date: NaiveDate,
    pub size: f64,
    pub price: f64,
    pub commission: f64,
}

impl OrderReport {
    fn failed(side: OrderSide, status: OrderStatus, date: NaiveDate, size: f64, price: f64) -> Self {
        OrderReport {
            side,
            status,
            date,
            size,
            price,
            commission: 0.0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

fn usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Open a long position at `price`.
///
/// 1. Cancel if the price is unusable
/// 2. Size = position_fraction * cash / price; reject if not positive
/// 3. Margin if cost + commission exceeds cash
/// 4. Deduct cost + commission, record the fill, open the position
pub fn enter_long(
    ledger: &mut Ledger,
    symbol: &str,
    price: f64,
    date: NaiveDate,
    bar_index: usize,
    params: &StrategyParams,
    config: &ExecutionConfig,
) -> OrderReport {
    if ledger.has_position() {
        ledger.failed_orders += 1;
        return OrderReport::failed(OrderSide::Buy, OrderStatus::Rejected, date, 0.0, price);
    }
    if !usable_price(price) {
        ledger.failed_orders += 1;
        return OrderReport::failed(OrderSide::Buy, OrderStatus::Canceled, date, 0.0, price);
    }

    let size = params.order_size(ledger.cash, price);
    if !size.is_finite() || size <= 0.0 {
        ledger.failed_orders += 1;
        return OrderReport::failed(OrderSide::Buy, OrderStatus::Rejected, date, size, price);
    }

    let cost = size * price;
    let commission = calculate_commission(cost, config);
    if cost + commission > ledger.cash {
        ledger.failed_orders += 1;
        return OrderReport::failed(OrderSide::Buy, OrderStatus::Margin, date, size, price);
    }

    ledger.cash -= cost + commission;
    ledger.record_transaction(Transaction {
        date,
        size,
        price,
        commission,
    });
    ledger.open_position(Position {
        symbol: symbol.to_string(),
        quantity: size,
        entry_price: price,
        entry_date: date,
        entry_index: bar_index,
        entry_commission: commission,
    });

    OrderReport {
        side: OrderSide::Buy,
        status: OrderStatus::Completed,
        date,
        size,
        price,
        commission,
    }
}

/// Close the open position at `price`, crediting proceeds net of commission
/// and recording the round trip as a closed trade.
pub fn exit_long(
    ledger: &mut Ledger,
    price: f64,
    date: NaiveDate,
    bar_index: usize,
    config: &ExecutionConfig,
) -> OrderReport {
    if !usable_price(price) {
        ledger.failed_orders += 1;
        return OrderReport::failed(OrderSide::Sell, OrderStatus::Canceled, date, 0.0, price);
    }
    let Some(position) = ledger.take_position() else {
        ledger.failed_orders += 1;
        return OrderReport::failed(OrderSide::Sell, OrderStatus::Rejected, date, 0.0, price);
    };

    let exit_value = position.quantity * price;
    let commission = calculate_commission(exit_value, config);
    let gross_pnl = position.unrealized_pnl(price);

    ledger.cash += exit_value - commission;
    ledger.record_transaction(Transaction {
        date,
        size: -position.quantity,
        price,
        commission,
    });
    ledger.record_trade(ClosedTrade {
        symbol: position.symbol.clone(),
        quantity: position.quantity,
        entry_price: position.entry_price,
        exit_price: price,
        entry_date: position.entry_date,
        exit_date: date,
        bars_held: bar_index.saturating_sub(position.entry_index),
        gross_pnl,
        pnl: gross_pnl - position.entry_commission - commission,
    });

    OrderReport {
        side: OrderSide::Sell,
        status: OrderStatus::Completed,
        date,
        size: position.quantity,
        price,
        commission,
    }
}
