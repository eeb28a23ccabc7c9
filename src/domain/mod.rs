//! Core domain types and logic.

pub mod address;
pub mod transaction;
pub mod summary;
pub mod ohlcv;
pub mod indicator;
pub mod position;
pub mod ledger;
pub mod execution;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
