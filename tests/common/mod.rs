#![allow(dead_code)]

use chrono::NaiveDate;
use coinlens::domain::address::Address;
use coinlens::domain::backtest::{BacktestConfig, BacktestResult};
use coinlens::domain::error::CoinlensError;
pub use coinlens::domain::ohlcv::PriceBar;
use coinlens::domain::strategy::StrategyParams;
pub use coinlens::domain::transaction::TransactionRecord;
use coinlens::ports::data_port::DataPort;
use coinlens::ports::explorer_port::TransactionSource;
use coinlens::ports::report_port::ReportPort;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const BTC_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
pub const ETH_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoinlensError> {
        if let Some(reason) = &self.error {
            return Err(CoinlensError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Canned explorer answers keyed by lowercase address.
pub struct MockTransactionSource {
    pub records: HashMap<String, Vec<TransactionRecord>>,
    pub calls: Cell<usize>,
}

impl MockTransactionSource {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_records(mut self, address: &str, records: Vec<TransactionRecord>) -> Self {
        self.records.insert(address.to_lowercase(), records);
        self
    }
}

impl TransactionSource for MockTransactionSource {
    fn fetch_transactions(&self, address: &Address) -> Result<Vec<TransactionRecord>, CoinlensError> {
        self.calls.set(self.calls.get() + 1);
        self.records
            .get(&address.as_str().to_lowercase())
            .cloned()
            .ok_or_else(|| CoinlensError::FetchFailed {
                reason: "HTTP 500".into(),
            })
    }
}

pub struct MockReportPort {
    pub calls: RefCell<Vec<(usize, BacktestResult, PathBuf)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(
        &self,
        bars: &[PriceBar],
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), CoinlensError> {
        self.calls
            .borrow_mut()
            .push((bars.len(), result.clone(), output_path.to_path_buf()));
        Ok(())
    }
}

pub fn tx(value: u128, from: &str, timestamp: i64) -> TransactionRecord {
    TransactionRecord {
        hash: None,
        value,
        from: from.to_string(),
        to: None,
        timestamp,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, day: NaiveDate, open: f64, close: f64, volume: f64) -> PriceBar {
    PriceBar {
        symbol: symbol.to_string(),
        date: day,
        open,
        high: open.max(close) + 1.0,
        low: open.min(close) - 1.0,
        close,
        volume,
    }
}

/// Bars from `(open, close, volume)` triples on consecutive days.
pub fn bars_from(symbol: &str, start: NaiveDate, ocv: &[(f64, f64, f64)]) -> Vec<PriceBar> {
    ocv.iter()
        .enumerate()
        .map(|(i, &(open, close, volume))| {
            make_bar(symbol, start + chrono::Duration::days(i as i64), open, close, volume)
        })
        .collect()
}

/// Five falling closes on rising bodies: RSI(4) is 0 and LSR(4) far above
/// 1.5 on the fifth bar, so the default parameters buy at 96.
pub fn entry_prefix() -> Vec<(f64, f64, f64)> {
    vec![
        (99.5, 100.0, 10.0),
        (99.5, 99.0, 1.0),
        (97.5, 98.0, 10.0),
        (96.5, 97.0, 10.0),
        (95.5, 96.0, 10.0),
    ]
}

pub fn sample_params() -> StrategyParams {
    StrategyParams {
        rsi_period: 4,
        lsr_period: 4,
        rsi_oversold: 30.0,
        rsi_overbought: 70.0,
        lsr_high: 1.5,
        lsr_low: 0.5,
        stop_loss: 0.05,
        take_profit: 0.10,
        position_fraction: 0.8,
        signal_exit: false,
    }
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        symbol: "BTC-USD".into(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        initial_capital: 10_000.0,
        commission_pct: 0.0,
        risk_free_rate: 0.01,
    }
}
