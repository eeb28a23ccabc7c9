//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::CoinlensError;
use crate::domain::ohlcv::PriceBar;

/// Port for writing a rendered backtest chart.
pub trait ReportPort {
    fn write(
        &self,
        bars: &[PriceBar],
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), CoinlensError>;
}
