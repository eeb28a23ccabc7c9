//! Candlestick chart report adapter implementing ReportPort.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::adapters::svg_chart;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::CoinlensError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct SvgReportAdapter;

impl SvgReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for SvgReportAdapter {
    fn write(
        &self,
        bars: &[PriceBar],
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), CoinlensError> {
        let title = bars
            .first()
            .map(|b| b.symbol.as_str())
            .unwrap_or("Backtest");
        let svg = svg_chart::render_candlestick_svg(title, bars, &result.ledger.transactions);

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, svg)?;
        info!(path = %output_path.display(), "wrote chart");
        Ok(())
    }
}
